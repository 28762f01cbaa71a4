use thiserror::Error;

/// Error type for claim payload encryption.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Ciphertext is not valid base64.
    #[error("Ciphertext encoding is invalid: {0}")]
    Encoding(String),

    /// Padding is malformed or the key/IV pair does not match. Partial
    /// plaintext is never returned.
    #[error("Claims payload decryption failed")]
    Decryption,
}
