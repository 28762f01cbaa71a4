use thiserror::Error;

/// Error type for password operations.
///
/// These are library-level failures (bad salt material, hashing backend
/// errors) and are treated as internal errors by callers. A non-matching
/// password is not an error: `verify` returns `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid salt material: {0}")]
    InvalidSalt(String),
}
