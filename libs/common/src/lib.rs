//! Common library for the shopy services
//!
//! This crate provides what the category, product and user services share:
//! the error taxonomy, the response envelope, request validation rules,
//! image object storage and PostgreSQL pooling.

pub mod database;
pub mod error;
pub mod response;
pub mod storage;
pub mod validation;

pub use error::{ClassifiedError, Error, ErrorCode, FieldViolations, Result};
