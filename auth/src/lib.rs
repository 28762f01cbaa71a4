//! Authentication infrastructure library
//!
//! Provides the token and password building blocks for the admin backend:
//! - Password hashing with explicit salts and expiry dates (Argon2id)
//! - Optional claim payload encryption (AES-256-CBC, PKCS7)
//! - Access/refresh token issuance and validation (HS256, dual secrets)
//!
//! The service layer defines its own domain ports and orchestrates these
//! primitives; nothing here touches persistence or HTTP.
//!
//! # Examples
//!
//! ## Password lifecycle
//! ```
//! use auth::PasswordPolicy;
//! use chrono::Duration;
//!
//! let policy = PasswordPolicy::new(16, Duration::days(90));
//! let material = policy.create_password("my_password").unwrap();
//! assert!(policy.verify("my_password", &material.hash));
//! assert!(!policy.verify("guess", &material.hash));
//! ```
//!
//! ## Token lifecycle
//! ```
//! use auth::{RoleClaims, TokenClaims, TokenConfig, TokenKind, TokenKindConfig, TokenService};
//! use chrono::{Duration, Utc};
//!
//! let service = TokenService::new(TokenConfig {
//!     access: TokenKindConfig {
//!         secret: b"access_secret_at_least_32_bytes_long!".to_vec(),
//!         ttl: Duration::minutes(15),
//!         not_before: Duration::zero(),
//!         cipher: None,
//!     },
//!     refresh: TokenKindConfig {
//!         secret: b"refresh_secret_at_least_32_bytes_long!".to_vec(),
//!         ttl: Duration::days(7),
//!         not_before: Duration::zero(),
//!         cipher: None,
//!     },
//!     remember_me_ttl: Duration::days(30),
//!     audience: "admin-portal".to_string(),
//!     issuer: "admin-backend".to_string(),
//!     subject: "admin-session".to_string(),
//!     payload_encryption: false,
//! })
//! .unwrap();
//!
//! let now = Utc::now();
//! let role = RoleClaims {
//!     name: "admin".to_string(),
//!     permission_codes: vec!["user.read".to_string()],
//!     access_scope: "all".to_string(),
//! };
//! let claims = TokenClaims::for_login("user123", role, false, now, now + Duration::days(7));
//!
//! let token = service.issue_access_token(&claims).unwrap();
//! assert!(service.verify(&token, TokenKind::Access));
//! ```

pub mod codec;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use codec::CipherKeys;
pub use codec::CodecError;
pub use codec::TokenCodec;
pub use password::CredentialMaterial;
pub use password::PasswordError;
pub use password::PasswordPolicy;
pub use token::IssuedContext;
pub use token::RoleClaims;
pub use token::TokenClaims;
pub use token::TokenConfig;
pub use token::TokenError;
pub use token::TokenKind;
pub use token::TokenKindConfig;
pub use token::TokenService;
