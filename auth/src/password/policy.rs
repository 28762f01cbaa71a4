use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::errors::PasswordError;

/// Password hashing and expiry policy.
///
/// Hashes with Argon2id over an explicit salt, so the salt can be stored
/// alongside the hash in the credential record. Expiry dates are computed
/// from a fixed period configured at startup.
pub struct PasswordPolicy {
    salt_length: usize,
    expiry_period: Duration,
}

/// Output of [`PasswordPolicy::create_password`]. The caller persists it;
/// nothing is written here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialMaterial {
    pub hash: String,
    pub salt: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordPolicy {
    /// Create a policy with a salt length in bytes and a password expiry
    /// period. Salt length must stay within the PHC salt limit (48 bytes);
    /// 16 is the usual choice.
    pub fn new(salt_length: usize, expiry_period: Duration) -> Self {
        Self {
            salt_length,
            expiry_period,
        }
    }

    /// Generate a random salt of the configured length, B64-encoded in PHC
    /// format.
    pub fn generate_salt(&self) -> Result<String, PasswordError> {
        let mut bytes = vec![0u8; self.salt_length];
        OsRng.fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes)
            .map(|salt| salt.to_string())
            .map_err(|e| PasswordError::InvalidSalt(e.to_string()))
    }

    /// Hash a plaintext password with an explicit salt.
    ///
    /// # Errors
    /// * `InvalidSalt` - Salt is not valid PHC B64
    /// * `HashingFailed` - Hashing backend failed
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, PasswordError> {
        let salt =
            SaltString::from_b64(salt).map_err(|e| PasswordError::InvalidSalt(e.to_string()))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Generate salt, hash, and compute the expiry date for a new password.
    /// Pure computation: the caller persists the returned material.
    pub fn create_password(&self, plaintext: &str) -> Result<CredentialMaterial, PasswordError> {
        let salt = self.generate_salt()?;
        let hash = self.hash(plaintext, &salt)?;

        Ok(CredentialMaterial {
            hash,
            salt,
            expires_at: Utc::now() + self.expiry_period,
        })
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails on malformed input: an unparseable hash verifies as
    /// `false`, same as a wrong password. Comparison is done by the
    /// algorithm's own verifier.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Whether a password is past its expiry date. The expiry instant
    /// itself is still valid (strict greater-than).
    pub fn is_expired(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > expires_at
    }

    pub fn expiry_period(&self) -> Duration {
        self.expiry_period
    }
}
