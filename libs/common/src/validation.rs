//! Input validation utilities
//!
//! Rules return `Result<(), String>` so they can be chained with
//! `and_then`; a [`Validator`] collects the outcome of every field so a
//! request reports all of its violations at once.

use std::sync::OnceLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{Error, FieldViolations};

/// Collects field violations for one request
#[derive(Debug, Default)]
pub struct Validator {
    violations: FieldViolations,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the rules applied to `field`
    pub fn field(&mut self, field: &str, outcome: Result<(), String>) -> &mut Self {
        if let Err(message) = outcome {
            self.violations.entry(field.to_string()).or_insert(message);
        }
        self
    }

    /// `InvalidArgument` carrying every violation, if there is any
    pub fn finish(self) -> Result<(), Error> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_params(self.violations))
        }
    }
}

/// Value must not be empty
pub fn required(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("cannot be blank".to_string());
    }

    Ok(())
}

/// Character count must fall within `min..=max`
pub fn length(value: &str, min: usize, max: usize) -> Result<(), String> {
    let count = value.chars().count();
    if count < min || count > max {
        return Err(format!("the length must be between {} and {}", min, max));
    }

    Ok(())
}

pub fn min(value: f64, min: f64) -> Result<(), String> {
    if value.is_nan() || value < min {
        return Err(format!("must be no less than {}", min));
    }

    Ok(())
}

/// Standard base64 with padding
pub fn base64(value: &str) -> Result<(), String> {
    STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|_| "must be encoded in Base64".to_string())
}

/// ASCII letters and digits only
pub fn alphanumeric(value: &str) -> Result<(), String> {
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("must contain English letters and digits only".to_string());
    }

    Ok(())
}

pub fn uuid(value: &str) -> Result<(), String> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| "must be a valid UUID".to_string())
}

pub fn email(value: &str) -> Result<(), String> {
    if value.len() > 254 {
        return Err("must be a valid email address".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(value) {
        return Err("must be a valid email address".to_string());
    }

    Ok(())
}

/// Parse a JSON request body; malformed payloads are `InvalidArgument`
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(Error::invalid_body)
}

/// Decode a text-encoded image; failures are `InvalidArgument`
pub fn decode_image(value: &str) -> Result<Vec<u8>, Error> {
    STANDARD.decode(value).map_err(Error::invalid_body)
}
