//! Session token issuance and verification
//!
//! Tokens are HS256 JWTs carrying the user email as subject.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use common::Error;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_EXPIRY_HOURS: u64 = 1;
const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 100;

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC signing key
    pub secret: String,
    /// Token lifetime in hours
    pub expiry_hours: u64,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_KEY`: Signing key
    /// - `TOKEN_EXP`: Token lifetime in hours (default: 1, at most a century)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("TOKEN_KEY")
            .map_err(|_| anyhow::anyhow!("TOKEN_KEY environment variable not set"))?;

        let expiry_hours = match std::env::var("TOKEN_EXP") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|hours| *hours <= MAX_EXPIRY_HOURS)
                .unwrap_or_else(|| {
                    warn!(
                        "Invalid TOKEN_EXP {:?}, defaulting to {} hour",
                        value, DEFAULT_EXPIRY_HOURS
                    );
                    DEFAULT_EXPIRY_HOURS
                }),
            Err(_) => DEFAULT_EXPIRY_HOURS,
        };

        Ok(TokenConfig {
            secret,
            expiry_hours,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        TokenIssuer {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry_secs: config.expiry_hours.saturating_mul(3600),
        }
    }

    /// Sign a token for `subject` expiring after the configured lifetime
    pub fn generate(&self, subject: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now
                .checked_add(self.expiry_secs)
                .ok_or_else(|| anyhow::anyhow!("Token expiry out of range"))?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature and expiry; any failure is `Unauthorized`
    pub fn validate(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                Error::unauthorized()
            })
    }

    /// Verify the token carried by an `Authorization: Bearer ...` header value
    pub fn validate_authorization(&self, header: &str) -> Result<Claims, Error> {
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(Error::unauthorized)?;

        self.validate(token.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorCode;
    use serial_test::serial;

    fn issuer(secret: &str, expiry_hours: u64) -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            secret: secret.to_string(),
            expiry_hours,
        })
    }

    #[test]
    fn generated_token_validates() {
        let issuer = issuer("test-secret", 1);

        let token = issuer.generate("jane@example.com").unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, "jane@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_key_is_unauthorized() {
        let token = issuer("other-secret", 1)
            .generate("jane@example.com")
            .unwrap();

        let err = issuer("test-secret", 1).validate(&token).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unauthorized));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let issuer = issuer("test-secret", 1);
        let claims = Claims {
            sub: "jane@example.com".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = issuer.validate(&token).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unauthorized));
    }

    #[test]
    fn oversized_expiry_fails_to_sign_instead_of_overflowing() {
        let issuer = issuer("test-secret", u64::MAX);

        assert!(issuer.generate("jane@example.com").is_err());
    }

    #[test]
    fn authorization_header_needs_bearer_scheme() {
        let issuer = issuer("test-secret", 1);
        let token = issuer.generate("jane@example.com").unwrap();

        let claims = issuer
            .validate_authorization(&format!("Bearer {}", token))
            .unwrap();
        assert_eq!(claims.sub, "jane@example.com");

        assert!(issuer.validate_authorization(&token).is_err());
        assert!(issuer.validate_authorization("Basic abc").is_err());
    }

    #[test]
    #[serial]
    fn config_from_env() {
        unsafe {
            std::env::set_var("TOKEN_KEY", "env-secret");
            std::env::set_var("TOKEN_EXP", "24");
        }
        let config = TokenConfig::from_env().unwrap();
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.expiry_hours, 24);

        unsafe {
            std::env::set_var("TOKEN_EXP", "soon");
        }
        assert_eq!(TokenConfig::from_env().unwrap().expiry_hours, 1);

        unsafe {
            std::env::set_var("TOKEN_EXP", u64::MAX.to_string());
        }
        assert_eq!(TokenConfig::from_env().unwrap().expiry_hours, 1);

        unsafe {
            std::env::remove_var("TOKEN_EXP");
        }
        assert_eq!(TokenConfig::from_env().unwrap().expiry_hours, 1);

        unsafe {
            std::env::remove_var("TOKEN_KEY");
        }
        assert!(TokenConfig::from_env().is_err());
    }
}
