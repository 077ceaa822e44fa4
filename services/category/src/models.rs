//! Category models for records, requests and response payloads

use chrono::{DateTime, Utc};
use common::{
    Error,
    validation::{self, Validator},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub uuid: String,
    pub name: String,
    /// Location of the category image in object storage
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Everything needed to create a category, image still undecided on storage
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub uuid: String,
    pub name: String,
    pub image: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /categories`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryAddRequest {
    pub name: String,
    /// Base64 encoded image
    pub image: String,
}

impl CategoryAddRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator
            .field(
                "name",
                validation::required(&self.name).and_then(|_| validation::length(&self.name, 1, 50)),
            )
            .field(
                "image",
                validation::required(&self.image).and_then(|_| validation::base64(&self.image)),
            );
        validator.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct SelectedCategories {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryAdded {
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct CategoryDeleted {
    pub category: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorCode;

    #[test]
    fn add_request_reports_every_invalid_field() {
        let request = CategoryAddRequest {
            name: "x".repeat(51),
            image: "%%%".to_string(),
        };

        let Err(Error::Classified(err)) = request.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        let violations = err.violations().unwrap();
        assert!(violations.contains_key("name"));
        assert!(violations.contains_key("image"));
    }

    #[test]
    fn add_request_accepts_valid_payload() {
        let request = CategoryAddRequest {
            name: "Drinks".to_string(),
            image: "iVBORw0KGgo=".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
