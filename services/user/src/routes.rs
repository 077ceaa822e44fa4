//! User service routes

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use common::{Error, response::success, validation::decode_body};
use serde_json::json;
use tracing::error;

use crate::{
    models::{NewUser, UserAdded, UserAuthorized, UserDeleted, UserRequest},
    state::AppState,
};

/// Create the router for the user service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(login).put(add_user))
        .route("/users/:email", delete(delete_user))
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "user-service"
    }))
}

/// Exchange email and password for a session token
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let request: UserRequest =
        decode_body(&body).inspect_err(|e| error!("invalid login body: {:#}", e))?;

    request
        .validate()
        .inspect_err(|e| error!("invalid login params: {:#}", e))?;

    let token = state
        .user_service
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| error!("error logging in: {:#}", e))?;

    Ok(success(StatusCode::OK, UserAuthorized { token }))
}

pub async fn add_user(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let request: UserRequest =
        decode_body(&body).inspect_err(|e| error!("invalid user body: {:#}", e))?;

    request
        .validate()
        .inspect_err(|e| error!("invalid user params: {:#}", e))?;

    let now = Utc::now();
    let user = state
        .user_service
        .add(NewUser {
            email: request.email,
            password: request.password,
            created_at: now,
            updated_at: now,
        })
        .await
        .inspect_err(|e| error!("error adding user: {:#}", e))?;

    Ok(success(StatusCode::CREATED, UserAdded { user }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Response, Error> {
    state
        .user_service
        .delete(&email)
        .await
        .inspect_err(|e| error!("error deleting user: {:#}", e))?;

    Ok(success(StatusCode::OK, UserDeleted { user: "deleted" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jwt::{TokenConfig, TokenIssuer},
        repository::memory::MemoryUserRepository,
        service::UserService,
    };
    use axum::{body::Body, http::Request};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<MemoryUserRepository>) {
        let repository = Arc::new(MemoryUserRepository::default());
        let tokens = TokenIssuer::new(&TokenConfig {
            secret: "test-secret".to_string(),
            expiry_hours: 1,
        });
        let state = AppState {
            user_service: Arc::new(UserService::new(repository.clone(), tokens)),
        };
        (create_router(state), repository)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(body) => Body::from(serde_json::to_vec(&body).unwrap()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn register(app: &Router) -> Value {
        let (status, body) = send(
            app,
            "PUT",
            "/users",
            Some(json!({"email": "jane@example.com", "password": "Secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn put_user_returns_user_without_password() {
        let (app, repository) = app();

        let body = register(&app).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["user"]["email"], "jane@example.com");
        assert!(body["user"].get("password").is_none());
        let stored = repository.stored("jane@example.com").unwrap();
        assert_ne!(stored.password, "Secret123");
    }

    #[tokio::test]
    async fn login_returns_token() {
        let (app, _) = app();
        register(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/users",
            Some(json!({"email": "jane@example.com", "password": "Secret123"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (app, _) = app();
        register(&app).await;

        let (wrong_status, wrong) = send(
            &app,
            "POST",
            "/users",
            Some(json!({"email": "jane@example.com", "password": "Wrong123"})),
        )
        .await;
        let (unknown_status, unknown) = send(
            &app,
            "POST",
            "/users",
            Some(json!({"email": "john@example.com", "password": "Secret123"})),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, wrong_status);
        for field in ["status", "code", "message", "errors"] {
            assert_eq!(wrong.get(field), unknown.get(field), "field {}", field);
        }
    }

    #[tokio::test]
    async fn invalid_credentials_shape_is_bad_request() {
        let (app, _) = app();

        let (status, body) = send(
            &app,
            "PUT",
            "/users",
            Some(json!({"email": "jane", "password": "no spaces allowed"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["email"].is_string());
        assert!(body["errors"]["password"].is_string());
    }

    #[tokio::test]
    async fn delete_user_removes_record() {
        let (app, repository) = app();
        register(&app).await;

        let (status, body) = send(&app, "DELETE", "/users/jane@example.com", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], "deleted");
        assert!(repository.stored("jane@example.com").is_none());
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let (app, _) = app();

        let (status, body) = send(&app, "DELETE", "/users/john@example.com", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
    }
}
