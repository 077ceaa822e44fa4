//! Uniform response envelope
//!
//! Every body leaving a shopy service is `{status, code, datetime, ...}`:
//! `status` is `success`, `fail` (classified error) or `error` (internal).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, FieldViolations};

/// Layout of every timestamp the services emit or store
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC instant the way records and envelopes store it
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

/// Fields shared by success and error bodies
#[derive(Debug, Clone, Serialize)]
pub struct BaseResponse {
    pub status: &'static str,
    pub code: u16,
    pub datetime: String,
}

impl BaseResponse {
    fn new(status: &'static str, code: StatusCode) -> Self {
        Self {
            status,
            code: code.as_u16(),
            datetime: format_datetime(Utc::now()),
        }
    }
}

/// Success body: the base fields flattened next to the payload's fields
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub payload: T,
}

/// Wrap `payload` in a success envelope answered with `code`
pub fn success<T: Serialize>(code: StatusCode, payload: T) -> Response {
    let body = Envelope {
        base: BaseResponse::new("success", code),
        payload,
    };

    (code, Json(body)).into_response()
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldViolations>,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        match err {
            Error::Classified(err) => ErrorResponse {
                base: BaseResponse::new("fail", err.code().status()),
                message: err.message().to_string(),
                errors: err.violations().cloned(),
            },
            Error::Unclassified(_) => ErrorResponse {
                base: BaseResponse::new("error", StatusCode::INTERNAL_SERVER_ERROR),
                message: "internal server error".to_string(),
                errors: None,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse::from(&self);
        let status =
            StatusCode::from_u16(body.base.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}
