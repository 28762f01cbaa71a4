use thiserror::Error;

use crate::codec::CodecError;

/// Error type for token operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Token kind does not match the expected kind")]
    KindMismatch,

    #[error("Claims payload has an unexpected shape: {0}")]
    MalformedClaims(String),

    #[error("Claims codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Token service misconfigured: {0}")]
    Configuration(String),
}
