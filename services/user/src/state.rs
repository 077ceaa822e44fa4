//! Application state shared across handlers

use std::sync::Arc;

use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
}
