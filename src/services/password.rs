//! bcrypt helpers. Hashing is CPU-bound, so it runs on the blocking pool.

use rand::distr::{Alphanumeric, SampleString};

use crate::error::AppError;

pub async fn hash_password(plain: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AppError::server("Failed to process password", e))?
        .map_err(|e| AppError::server("Failed to process password", e))
}

/// A malformed hash counts as a mismatch.
pub async fn verify_password(plain: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Random secret nobody knows, for accounts created without a password.
pub fn placeholder_secret() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 48)
}

/// Stored in place of a hash; bcrypt rejects it, so no password can match.
pub fn unusable_password_hash() -> String {
    format!("!{}", placeholder_secret())
}
