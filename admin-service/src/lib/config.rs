use std::env;

use auth::CipherKeys;
use auth::PasswordPolicy;
use auth::TokenConfig;
use auth::TokenKindConfig;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub token: TokenSettings,
    pub password: PasswordSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub remember_me_ttl_secs: i64,
    #[serde(default)]
    pub access_not_before_secs: i64,
    #[serde(default)]
    pub refresh_not_before_secs: i64,
    pub audience: String,
    pub issuer: String,
    pub subject: String,
    /// Encrypt claim payloads beneath the signature. Requires the per-kind
    /// key/IV pairs below.
    #[serde(default)]
    pub payload_encryption: bool,
    /// 64 hex characters (AES-256 key)
    pub access_key: Option<String>,
    /// 32 hex characters (CBC IV)
    pub access_iv: Option<String>,
    pub refresh_key: Option<String>,
    pub refresh_iv: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordSettings {
    /// Salt length in bytes
    pub salt_length: usize,
    /// Days until a password expires and the client is pushed into the
    /// change-password flow
    pub expiry_days: i64,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (TOKEN__ACCESS_SECRET, PASSWORD__SALT_LENGTH, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

impl TokenSettings {
    /// Convert into the immutable token service configuration, decoding
    /// the hex key material.
    pub fn to_token_config(&self) -> Result<TokenConfig, ConfigError> {
        Ok(TokenConfig {
            access: TokenKindConfig {
                secret: self.access_secret.clone().into_bytes(),
                ttl: Duration::seconds(self.access_ttl_secs),
                not_before: Duration::seconds(self.access_not_before_secs),
                cipher: cipher_keys(&self.access_key, &self.access_iv, "token.access")?,
            },
            refresh: TokenKindConfig {
                secret: self.refresh_secret.clone().into_bytes(),
                ttl: Duration::seconds(self.refresh_ttl_secs),
                not_before: Duration::seconds(self.refresh_not_before_secs),
                cipher: cipher_keys(&self.refresh_key, &self.refresh_iv, "token.refresh")?,
            },
            remember_me_ttl: Duration::seconds(self.remember_me_ttl_secs),
            audience: self.audience.clone(),
            issuer: self.issuer.clone(),
            subject: self.subject.clone(),
            payload_encryption: self.payload_encryption,
        })
    }
}

impl PasswordSettings {
    pub fn to_password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.salt_length, Duration::days(self.expiry_days))
    }
}

fn cipher_keys(
    key: &Option<String>,
    iv: &Option<String>,
    label: &str,
) -> Result<Option<CipherKeys>, ConfigError> {
    match (key, iv) {
        (Some(key), Some(iv)) => Ok(Some(CipherKeys {
            key: decode_hex(key, label, "key")?,
            iv: decode_hex(iv, label, "iv")?,
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::Message(format!(
            "{}: key and iv must be configured together",
            label
        ))),
    }
}

fn decode_hex<const N: usize>(value: &str, label: &str, field: &str) -> Result<[u8; N], ConfigError> {
    let bytes = hex::decode(value)
        .map_err(|e| ConfigError::Message(format!("{}.{} is not valid hex: {}", label, field, e)))?;

    bytes.try_into().map_err(|_| {
        ConfigError::Message(format!(
            "{}.{} must be {} hex characters",
            label,
            field,
            N * 2
        ))
    })
}
