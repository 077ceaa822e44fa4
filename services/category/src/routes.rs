//! Category service routes

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use chrono::Utc;
use common::{
    Error,
    response::success,
    validation::{decode_body, decode_image},
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    models::{CategoryAdded, CategoryAddRequest, CategoryDeleted, NewCategory, SelectedCategories},
    state::AppState,
};

/// Create the router for the category service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/categories", get(get_categories).post(add_category))
        .route("/categories/:uuid", delete(delete_category))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "category-service"
    }))
}

/// List every category
pub async fn get_categories(State(state): State<AppState>) -> Result<Response, Error> {
    let categories = state
        .category_service
        .list()
        .await
        .inspect_err(|e| error!("error getting categories: {:#}", e))?;

    Ok(success(StatusCode::OK, SelectedCategories { categories }))
}

/// Create a category and upload its image
pub async fn add_category(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let request: CategoryAddRequest =
        decode_body(&body).inspect_err(|e| error!("invalid category body: {:#}", e))?;

    request
        .validate()
        .inspect_err(|e| error!("invalid category params: {:#}", e))?;

    let image =
        decode_image(&request.image).inspect_err(|e| error!("error decoding image: {:#}", e))?;

    let now = Utc::now();
    let category = state
        .category_service
        .add(NewCategory {
            uuid: Uuid::new_v4().to_string(),
            name: request.name,
            image,
            created_at: now,
            updated_at: now,
        })
        .await
        .inspect_err(|e| error!("error adding category: {:#}", e))?;

    Ok(success(StatusCode::CREATED, CategoryAdded { category }))
}

/// Delete a category and its image
pub async fn delete_category(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Response, Error> {
    state
        .category_service
        .delete(&uuid)
        .await
        .inspect_err(|e| error!("error deleting category: {:#}", e))?;

    Ok(success(
        StatusCode::OK,
        CategoryDeleted {
            category: "deleted",
        },
    ))
}
