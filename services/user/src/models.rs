//! User models for records, requests and response payloads

use chrono::{DateTime, Utc};
use common::{
    Error,
    validation::{self, Validator},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record.
///
/// `password` always holds the argon2 hash and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Registration carrying the plaintext credential
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /users` (login) and `PUT /users` (registration)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

impl UserRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();

        validator
            .field(
                "email",
                validation::required(&self.email).and_then(|_| validation::email(&self.email)),
            )
            .field(
                "password",
                validation::required(&self.password)
                    .and_then(|_| validation::alphanumeric(&self.password)),
            );

        validator.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct UserAuthorized {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserAdded {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserDeleted {
    pub user: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            email: "jane@example.com".to_string(),
            password: "$argon2id$v=19$...".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        };

        let value = serde_json::to_value(UserAdded { user }).unwrap();

        assert_eq!(value["user"]["email"], "jane@example.com");
        assert!(value["user"].get("password").is_none());
    }

    #[test]
    fn request_rules() {
        let valid = UserRequest {
            email: "jane@example.com".to_string(),
            password: "Secret123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = UserRequest {
            email: "jane".to_string(),
            password: "not secret!".to_string(),
        };
        match invalid.validate() {
            Err(Error::Classified(err)) => {
                let violations = err.violations().unwrap();
                assert!(violations.contains_key("email"));
                assert!(violations.contains_key("password"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_fields_are_blank() {
        let request: UserRequest = serde_json::from_str("{}").unwrap();

        match request.validate() {
            Err(Error::Classified(err)) => {
                let violations = err.violations().unwrap();
                assert_eq!(violations["email"], "cannot be blank");
                assert_eq!(violations["password"], "cannot be blank");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
