//! Product service routes

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
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
    models::{
        NewProduct, ProductAdded, ProductDeleted, ProductRequest, ProductUpdate, SearchParams,
        SelectedProducts,
    },
    state::AppState,
};

/// Create the router for the product service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/products", get(search_products).post(add_product))
        .route("/products/:uuid", put(update_product).delete(delete_product))
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "product-service"
    }))
}

/// Search products by category, QR code or name prefix; top products otherwise
pub async fn search_products(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(params) = params
        .map_err(Error::invalid_body)
        .inspect_err(|e| error!("invalid product query: {:#}", e))?;

    let products = state
        .product_service
        .search(params)
        .await
        .inspect_err(|e| error!("error getting products: {:#}", e))?;

    Ok(success(StatusCode::OK, SelectedProducts { products }))
}

pub async fn add_product(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let request: ProductRequest =
        decode_body(&body).inspect_err(|e| error!("invalid product body: {:#}", e))?;

    request
        .validate_add()
        .inspect_err(|e| error!("invalid product params: {:#}", e))?;

    let image = decode_image(request.image().unwrap_or_default())
        .inspect_err(|e| error!("error decoding image: {:#}", e))?;

    let now = Utc::now();
    let product = state
        .product_service
        .add(NewProduct {
            uuid: Uuid::new_v4().to_string(),
            qrcode: request.qrcode().map(str::to_string),
            category: request.category(),
            name: request.name,
            price: request.price.unwrap_or_default(),
            is_top: request.is_top,
            image,
            created_at: now,
            updated_at: now,
        })
        .await
        .inspect_err(|e| error!("error adding product: {:#}", e))?;

    Ok(success(StatusCode::CREATED, ProductAdded { product }))
}

/// Replace an existing product; the image is only replaced when supplied
pub async fn update_product(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    body: Bytes,
) -> Result<Response, Error> {
    let request: ProductRequest =
        decode_body(&body).inspect_err(|e| error!("invalid product body: {:#}", e))?;

    request
        .validate_update()
        .inspect_err(|e| error!("invalid product params: {:#}", e))?;

    let image = request
        .image()
        .map(decode_image)
        .transpose()
        .inspect_err(|e| error!("error decoding image: {:#}", e))?;

    let product = state
        .product_service
        .update(ProductUpdate {
            uuid,
            qrcode: request.qrcode().map(str::to_string),
            category: request.category(),
            name: request.name,
            price: request.price.unwrap_or_default(),
            is_top: request.is_top,
            image,
            updated_at: Utc::now(),
        })
        .await
        .inspect_err(|e| error!("error updating product: {:#}", e))?;

    Ok(success(StatusCode::OK, ProductAdded { product }))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Response, Error> {
    state
        .product_service
        .delete(&uuid)
        .await
        .inspect_err(|e| error!("error deleting product: {:#}", e))?;

    Ok(success(StatusCode::OK, ProductDeleted { product: "deleted" }))
}
