use thiserror::Error;

use auth::PasswordError;
use auth::TokenError;

/// Coarse classification of a rejection, stable across error variants.
///
/// Lets a caller branch ("try again" vs "contact support" vs "re-consent")
/// without parsing free-text messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    Internal,
}

/// Top-level error for authentication operations.
///
/// Domain failures (wrong password, inactive account, stale policy) are
/// expected outcomes and surface as typed variants with stable codes.
/// Library failures (hashing, crypto) surface as `Internal` and are logged
/// with context at the service boundary.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Password does not match")]
    PasswordMismatch,

    #[error("Maximum password attempts exceeded")]
    AttemptsExceeded,

    #[error("User is inactive")]
    UserInactive,

    #[error("User is blocked")]
    UserBlocked,

    #[error("Role is inactive")]
    RoleInactive,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("New password must differ from the current password")]
    PasswordNewMustDiffer,

    // Infrastructure errors
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code for API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound(_) => "AUTH_USER_NOT_FOUND",
            AuthError::RoleNotFound(_) => "AUTH_ROLE_NOT_FOUND",
            AuthError::PasswordMismatch => "AUTH_PASSWORD_MISMATCH",
            AuthError::AttemptsExceeded => "AUTH_ATTEMPTS_EXCEEDED",
            AuthError::UserInactive => "AUTH_USER_INACTIVE",
            AuthError::UserBlocked => "AUTH_USER_BLOCKED",
            AuthError::RoleInactive => "AUTH_ROLE_INACTIVE",
            AuthError::InvalidToken => "AUTH_INVALID_TOKEN",
            AuthError::PasswordNewMustDiffer => "AUTH_PASSWORD_MUST_DIFFER",
            AuthError::Repository(_) => "AUTH_REPOSITORY_ERROR",
            AuthError::Internal(_) => "AUTH_INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound(_) | AuthError::RoleNotFound(_) => ErrorKind::NotFound,
            AuthError::PasswordMismatch | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::AttemptsExceeded
            | AuthError::UserInactive
            | AuthError::UserBlocked
            | AuthError::RoleInactive => ErrorKind::Forbidden,
            AuthError::PasswordNewMustDiffer => ErrorKind::Conflict,
            AuthError::Repository(_) | AuthError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(format!("Password hashing failed: {}", err))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        // Issuance-side failures; verification failures are mapped to
        // InvalidToken where the token is checked.
        AuthError::Internal(format!("Token issuance failed: {}", err))
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Internal(err.to_string())
    }
}
