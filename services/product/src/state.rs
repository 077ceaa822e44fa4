//! Application state shared across handlers

use std::sync::Arc;

use crate::service::ProductService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<ProductService>,
}
