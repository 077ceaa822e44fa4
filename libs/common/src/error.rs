//! Error taxonomy shared by every shopy service
//!
//! Failures are either *classified* (they carry an [`ErrorCode`] the HTTP
//! boundary knows how to render) or *unclassified* (anything else, rendered
//! as an opaque internal error). The wrapped cause of a classified error is
//! kept for logs only and never leaves the process.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

/// Field path (e.g. `category.uuid`) to violation message.
pub type FieldViolations = BTreeMap<String, String>;

/// Codes a caller can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed payload or failed field validation
    InvalidArgument,
    /// Reserved, no handler raises it today
    Precondition,
    /// A conditional store operation found no matching key
    NotFound,
    /// Login failure
    Unauthorized,
}

impl ErrorCode {
    /// HTTP status rendered for this code
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::Precondition => StatusCode::PRECONDITION_FAILED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

/// An error tagged with a caller-visible code
#[derive(Debug)]
pub struct ClassifiedError {
    code: ErrorCode,
    message: String,
    violations: Option<FieldViolations>,
    cause: Option<anyhow::Error>,
}

impl ClassifiedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violations: None,
            cause: None,
        }
    }

    /// Attach the lower-layer error that triggered this one
    pub fn wrap(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_violations(mut self, violations: FieldViolations) -> Self {
        self.violations = Some(violations);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> Option<&FieldViolations> {
        self.violations.as_ref()
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {:#}", self.message, cause),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Error type returned by adapters and services
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    /// Backend outages, marshaling failures and anything else nobody classified
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl Error {
    /// Undecodable request body or embedded payload
    pub fn invalid_body(cause: impl Into<anyhow::Error>) -> Self {
        ClassifiedError::new(ErrorCode::InvalidArgument, "invalid body request")
            .wrap(cause)
            .into()
    }

    pub fn invalid_params(violations: FieldViolations) -> Self {
        ClassifiedError::new(ErrorCode::InvalidArgument, "invalid params")
            .with_violations(violations)
            .into()
    }

    pub fn not_found() -> Self {
        ClassifiedError::new(ErrorCode::NotFound, "item not found").into()
    }

    pub fn unauthorized() -> Self {
        ClassifiedError::new(ErrorCode::Unauthorized, "invalid credentials").into()
    }

    /// `None` for unclassified errors
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Classified(err) => Some(err.code()),
            Error::Unclassified(_) => None,
        }
    }
}

/// Type alias for Result with the shopy Error
pub type Result<T, E = Error> = std::result::Result<T, E>;
