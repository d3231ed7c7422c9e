//! Password hashing (bcrypt).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a plain-text password with the given bcrypt cost.
///
/// Production uses [`DEFAULT_COST`]; tests pass `4` to stay fast.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a password against a stored hash.
///
/// A malformed stored hash is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("stored password hash could not be verified: {e}");
            false
        }
    }
}
