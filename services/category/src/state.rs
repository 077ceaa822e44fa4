//! Application state shared across handlers

use std::sync::Arc;

use crate::service::CategoryService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<CategoryService>,
}
