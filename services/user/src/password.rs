//! Argon2 password hashing

use std::sync::OnceLock;

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::warn;

/// Hash a plaintext credential with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Check a plaintext credential against a stored hash.
///
/// An unparseable hash never verifies.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => parsed_hash,
        Err(e) => {
            warn!("Failed to parse password hash: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash of a throwaway credential, computed once
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("dummy-credential").ok())
        .as_deref()
}

/// Run one argon2 verification against a dummy hash.
///
/// Login calls this when the account lookup fails.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        verify_password(hash, password);
    }
}
