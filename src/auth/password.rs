use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes `password` with bcrypt (random salt, `cost` work factor).
///
/// Any backend failure is returned as an error; there is no fallback to a
/// weaker scheme.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Constant-time comparison of `password` against a stored bcrypt hash.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
