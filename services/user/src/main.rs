use std::{env, sync::Arc};

use anyhow::Result;
use common::database::{DatabaseConfig, health_check, init_pool};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod jwt;
mod models;
mod password;
mod repository;
mod routes;
mod service;
mod state;

use crate::{
    jwt::{TokenConfig, TokenIssuer},
    repository::PgUserRepository,
    service::UserService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting user service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let repository = PgUserRepository::new(pool);
    repository.ensure_schema().await?;

    let token_config = TokenConfig::from_env()?;
    info!("Issuing tokens valid for {} hour(s)", token_config.expiry_hours);

    let app_state = AppState {
        user_service: Arc::new(UserService::new(
            Arc::new(repository),
            TokenIssuer::new(&token_config),
        )),
    };

    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3002".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("User service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
