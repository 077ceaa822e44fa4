use std::{env, sync::Arc};

use anyhow::Result;
use aws_config::BehaviorVersion;
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    storage::{S3Storage, StorageConfig},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod models;
mod repository;
mod routes;
mod service;
mod state;

use crate::{repository::PgProductRepository, service::ProductService, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting product service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let repository = PgProductRepository::new(pool);
    repository.ensure_schema().await?;

    // Initialize AWS S3 client
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let storage = S3Storage::new(
        aws_sdk_s3::Client::new(&aws_config),
        StorageConfig::from_env()?,
        "product",
    );

    let app_state = AppState {
        product_service: Arc::new(ProductService::new(
            Arc::new(repository),
            Arc::new(storage),
        )),
    };

    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Product service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
