use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::errors::TokenError;
use crate::codec::CipherKeys;
use crate::codec::TokenCodec;

/// Per-kind signing configuration.
#[derive(Debug, Clone)]
pub struct TokenKindConfig {
    /// HS256 signing secret (at least 32 bytes).
    pub secret: Vec<u8>,
    pub ttl: Duration,
    pub not_before: Duration,
    /// AES key/IV pair for claim payload encryption. Required when
    /// `payload_encryption` is on.
    pub cipher: Option<CipherKeys>,
}

/// Immutable token service configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access: TokenKindConfig,
    pub refresh: TokenKindConfig,
    /// Refresh TTL used instead of `refresh.ttl` when the login asked to
    /// be remembered. Access TTL is never affected.
    pub remember_me_ttl: Duration,
    pub audience: String,
    pub issuer: String,
    pub subject: String,
    pub payload_encryption: bool,
}

/// Signed wire shape: the claims payload (plain object or encrypted
/// string) under `data`, plus the registered claims the verifier pins.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: Value,
    exp: i64,
    nbf: i64,
    iat: i64,
    aud: String,
    iss: String,
    sub: String,
}

struct KindState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    not_before: Duration,
    codec: Option<TokenCodec>,
}

/// Issues and validates signed access and refresh tokens.
///
/// Access and refresh tokens are signed with distinct secrets and carry an
/// explicit `kind` discriminant in their claims, so a stolen token of one
/// kind can never be replayed as the other. Verification fails closed:
/// any anomaly in signature, timing, registered claims, or claim shape is
/// a rejection, never a crash.
pub struct TokenService {
    access: KindState,
    refresh: KindState,
    remember_me_ttl: Duration,
    audience: String,
    issuer: String,
    subject: String,
}

impl TokenService {
    /// Build the service from an immutable configuration.
    ///
    /// # Errors
    /// * `Configuration` - Access and refresh secrets are identical, or
    ///   payload encryption is on without cipher keys for both kinds
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.access.secret == config.refresh.secret {
            return Err(TokenError::Configuration(
                "access and refresh tokens must use distinct secrets".to_string(),
            ));
        }

        Ok(Self {
            access: Self::kind_state(&config.access, config.payload_encryption, "access")?,
            refresh: Self::kind_state(&config.refresh, config.payload_encryption, "refresh")?,
            remember_me_ttl: config.remember_me_ttl,
            audience: config.audience,
            issuer: config.issuer,
            subject: config.subject,
        })
    }

    fn kind_state(
        config: &TokenKindConfig,
        payload_encryption: bool,
        label: &str,
    ) -> Result<KindState, TokenError> {
        let codec = match (payload_encryption, config.cipher) {
            (true, Some(keys)) => Some(TokenCodec::new(keys)),
            (true, None) => {
                return Err(TokenError::Configuration(format!(
                    "payload encryption is enabled but no cipher keys are configured for {} tokens",
                    label
                )));
            }
            (false, _) => None,
        };

        Ok(KindState {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            ttl: config.ttl,
            not_before: config.not_before,
            codec,
        })
    }

    fn state(&self, kind: TokenKind) -> &KindState {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Issue a signed access token for the given claims.
    pub fn issue_access_token(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, claims)
    }

    /// Issue a signed refresh token for the given claims. The expiry
    /// window is the remember-me TTL when `claims.remember_me` is set.
    pub fn issue_refresh_token(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, claims)
    }

    fn issue(&self, kind: TokenKind, claims: &TokenClaims) -> Result<String, TokenError> {
        let state = self.state(kind);

        // Stamp the discriminant here so callers cannot issue a token whose
        // claimed kind disagrees with its signing secret.
        let mut claims = claims.clone();
        claims.kind = kind;

        let ttl = match kind {
            TokenKind::Access => state.ttl,
            TokenKind::Refresh if claims.remember_me => self.remember_me_ttl,
            TokenKind::Refresh => state.ttl,
        };

        let data = match &state.codec {
            Some(codec) => {
                let plaintext = serde_json::to_vec(&claims)
                    .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
                Value::String(codec.encrypt_claims(&plaintext))
            }
            None => serde_json::to_value(&claims)
                .map_err(|e| TokenError::EncodingFailed(e.to_string()))?,
        };

        let now = Utc::now();
        let envelope = Envelope {
            data,
            exp: (now + ttl).timestamp(),
            nbf: (now + state.not_before).timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &envelope, &state.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token of the expected kind. Fails closed: any error is
    /// reported as `false`, never propagated.
    pub fn verify(&self, token: &str, kind: TokenKind) -> bool {
        self.authenticate(token, kind).is_ok()
    }

    /// Verify a token and return its claims.
    ///
    /// Checks signature, `exp`, `nbf`, `aud`, `iss`, `sub`, the structural
    /// shape of the (decrypted) claims, and the `kind` discriminant.
    ///
    /// # Errors
    /// * `Expired` - Token is past its expiry
    /// * `Invalid` - Signature, timing, or registered claims rejected
    /// * `KindMismatch` - Claims carry a different kind than expected
    /// * `MalformedClaims` / `Codec` - Claims payload cannot be read
    pub fn authenticate(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let state = self.state(kind);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.sub = Some(self.subject.clone());
        validation.validate_nbf = true;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Envelope>(token, &state.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        let claims = self.unwrap_claims(state, data.claims.data)?;
        if claims.kind != kind {
            return Err(TokenError::KindMismatch);
        }

        Ok(claims)
    }

    /// Decode a token without verifying its signature or timing.
    ///
    /// Introspection only: never an authorization decision by itself. Use
    /// [`TokenService::authenticate`] for anything security relevant.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<Envelope>(token, &self.access.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        // Without a verified signature the kind is unknown, so try the
        // access codec first and fall back to the refresh codec.
        self.unwrap_claims(&self.access, data.claims.data.clone())
            .or_else(|_| self.unwrap_claims(&self.refresh, data.claims.data))
    }

    fn unwrap_claims(&self, state: &KindState, data: Value) -> Result<TokenClaims, TokenError> {
        match &state.codec {
            Some(codec) => {
                let ciphertext = data.as_str().ok_or_else(|| {
                    TokenError::MalformedClaims("expected an encrypted claims string".to_string())
                })?;
                let plaintext = codec.decrypt_claims(ciphertext)?;
                serde_json::from_slice(&plaintext)
                    .map_err(|e| TokenError::MalformedClaims(e.to_string()))
            }
            None => serde_json::from_value(data)
                .map_err(|e| TokenError::MalformedClaims(e.to_string())),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access.ttl
    }

    pub fn refresh_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.remember_me_ttl
        } else {
            self.refresh.ttl
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;
    use crate::token::claims::RoleClaims;

    fn test_config() -> TokenConfig {
        TokenConfig {
            access: TokenKindConfig {
                secret: b"access_secret_at_least_32_bytes_long!".to_vec(),
                ttl: Duration::minutes(15),
                not_before: Duration::zero(),
                cipher: None,
            },
            refresh: TokenKindConfig {
                secret: b"refresh_secret_at_least_32_bytes_long!".to_vec(),
                ttl: Duration::days(7),
                not_before: Duration::zero(),
                cipher: None,
            },
            remember_me_ttl: Duration::days(30),
            audience: "admin-portal".to_string(),
            issuer: "admin-backend".to_string(),
            subject: "admin-session".to_string(),
            payload_encryption: false,
        }
    }

    fn encrypted_config() -> TokenConfig {
        let mut config = test_config();
        config.payload_encryption = true;
        config.access.cipher = Some(CipherKeys {
            key: [0xA1; 32],
            iv: [0xA2; 16],
        });
        config.refresh.cipher = Some(CipherKeys {
            key: [0xB1; 32],
            iv: [0xB2; 16],
        });
        config
    }

    fn test_claims(remember_me: bool) -> TokenClaims {
        let now = Utc::now();
        TokenClaims::for_login(
            "user123",
            RoleClaims {
                name: "admin".to_string(),
                permission_codes: vec!["user.read".to_string()],
                access_scope: "all".to_string(),
            },
            remember_me,
            now,
            now + Duration::days(7),
        )
    }

    fn payload_json(token: &str) -> Value {
        let payload = token.split('.').nth(1).expect("token has no payload");
        let raw = URL_SAFE_NO_PAD.decode(payload).expect("payload not base64");
        serde_json::from_slice(&raw).expect("payload not JSON")
    }

    #[test]
    fn test_issue_and_authenticate_access_token() {
        let service = TokenService::new(test_config()).unwrap();
        let claims = test_claims(false);

        let token = service.issue_access_token(&claims).unwrap();
        assert!(service.verify(&token, TokenKind::Access));

        let decoded = service.authenticate(&token, TokenKind::Access).unwrap();
        assert_eq!(decoded.kind, TokenKind::Access);
        assert_eq!(decoded.subject_id, "user123");
        assert_eq!(decoded.role.name, "admin");
    }

    #[test]
    fn test_refresh_token_rejected_as_access_and_vice_versa() {
        let service = TokenService::new(test_config()).unwrap();
        let claims = test_claims(false);

        let access = service.issue_access_token(&claims).unwrap();
        let refresh = service.issue_refresh_token(&claims).unwrap();

        assert!(!service.verify(&refresh, TokenKind::Access));
        assert!(!service.verify(&access, TokenKind::Refresh));
        assert!(service.verify(&refresh, TokenKind::Refresh));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let service = TokenService::new(test_config()).unwrap();
        let token = service.issue_access_token(&test_claims(false)).unwrap();

        let mut other_config = test_config();
        other_config.access.secret = b"another_secret_at_least_32_bytes!".to_vec();
        let other = TokenService::new(other_config).unwrap();

        assert!(!other.verify(&token, TokenKind::Access));
    }

    #[test]
    fn test_expired_token_fails_regardless_of_signature() {
        let mut config = test_config();
        config.access.ttl = Duration::seconds(-60);
        let service = TokenService::new(config).unwrap();

        let token = service.issue_access_token(&test_claims(false)).unwrap();
        assert!(!service.verify(&token, TokenKind::Access));
        assert!(matches!(
            service.authenticate(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_not_before_window_rejects_early_use() {
        let mut config = test_config();
        config.access.not_before = Duration::minutes(5);
        let service = TokenService::new(config).unwrap();

        let token = service.issue_access_token(&test_claims(false)).unwrap();
        assert!(!service.verify(&token, TokenKind::Access));
    }

    #[test]
    fn test_remember_me_extends_refresh_expiry_only() {
        let service = TokenService::new(test_config()).unwrap();

        let plain = service.issue_refresh_token(&test_claims(false)).unwrap();
        let remembered = service.issue_refresh_token(&test_claims(true)).unwrap();
        let plain_exp = payload_json(&plain)["exp"].as_i64().unwrap();
        let remembered_exp = payload_json(&remembered)["exp"].as_i64().unwrap();
        assert!(remembered_exp > plain_exp);

        // Access token expiry is unaffected by remember-me
        let access_plain = service.issue_access_token(&test_claims(false)).unwrap();
        let access_remembered = service.issue_access_token(&test_claims(true)).unwrap();
        let delta = payload_json(&access_remembered)["exp"].as_i64().unwrap()
            - payload_json(&access_plain)["exp"].as_i64().unwrap();
        assert!(delta.abs() <= 1);
    }

    #[test]
    fn test_malformed_token_fails_closed() {
        let service = TokenService::new(test_config()).unwrap();
        assert!(!service.verify("not.a.token", TokenKind::Access));
        assert!(!service.verify("", TokenKind::Access));
    }

    #[test]
    fn test_payload_encryption_round_trip_and_opacity() {
        let service = TokenService::new(encrypted_config()).unwrap();
        let claims = test_claims(false);

        let token = service.issue_access_token(&claims).unwrap();
        let payload = payload_json(&token);

        // Claims are a ciphertext string, not a readable object
        assert!(payload["data"].is_string());
        assert!(!payload["data"].as_str().unwrap().contains("permission"));

        let decoded = service.authenticate(&token, TokenKind::Access).unwrap();
        assert_eq!(decoded.subject_id, claims.subject_id);
        assert_eq!(decoded.role, claims.role);
    }

    #[test]
    fn test_decode_without_verification() {
        let mut config = test_config();
        config.access.ttl = Duration::seconds(-60);
        let service = TokenService::new(config).unwrap();

        // Expired token can still be introspected
        let token = service.issue_access_token(&test_claims(false)).unwrap();
        let decoded = service.decode(&token).unwrap();
        assert_eq!(decoded.subject_id, "user123");
    }

    #[test]
    fn test_decode_encrypted_refresh_token() {
        let service = TokenService::new(encrypted_config()).unwrap();
        let token = service.issue_refresh_token(&test_claims(true)).unwrap();

        let decoded = service.decode(&token).unwrap();
        assert_eq!(decoded.kind, TokenKind::Refresh);
        assert!(decoded.remember_me);
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut config = test_config();
        config.refresh.secret = config.access.secret.clone();
        assert!(matches!(
            TokenService::new(config),
            Err(TokenError::Configuration(_))
        ));
    }

    #[test]
    fn test_payload_encryption_requires_cipher_keys() {
        let mut config = test_config();
        config.payload_encryption = true;
        assert!(matches!(
            TokenService::new(config),
            Err(TokenError::Configuration(_))
        ));
    }
}
