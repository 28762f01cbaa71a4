use aes::cipher::block_padding::Pkcs7;
use aes::cipher::BlockDecryptMut;
use aes::cipher::BlockEncryptMut;
use aes::cipher::KeyIvInit;
use aes::Aes256;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::errors::CodecError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Key material for one token kind. Access and refresh tokens use distinct
/// pairs so a ciphertext from one kind never decrypts under the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherKeys {
    pub key: [u8; 32],
    pub iv: [u8; 16],
}

/// Symmetric codec for claim payloads (AES-256-CBC with PKCS7 padding).
///
/// This wraps claims a second time beneath the JWT signature so a leaked
/// but unverified token body does not expose role or permission names in
/// cleartext. It is a confidentiality layer only, never a substitute for
/// signature verification.
pub struct TokenCodec {
    keys: CipherKeys,
}

impl TokenCodec {
    pub fn new(keys: CipherKeys) -> Self {
        Self { keys }
    }

    /// Encrypt a serialized claims payload into a base64 ciphertext.
    pub fn encrypt_claims(&self, plaintext: &[u8]) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.keys.key.into(), &self.keys.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        BASE64.encode(ciphertext)
    }

    /// Decrypt a base64 ciphertext back into the serialized claims payload.
    ///
    /// # Errors
    /// * `Encoding` - Ciphertext is not valid base64
    /// * `Decryption` - Padding is malformed or the key/IV pair does not match
    pub fn decrypt_claims(&self, ciphertext: &str) -> Result<Vec<u8>, CodecError> {
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|e| CodecError::Encoding(e.to_string()))?;

        Aes256CbcDec::new(&self.keys.key.into(), &self.keys.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&raw)
            .map_err(|_| CodecError::Decryption)
    }
}
