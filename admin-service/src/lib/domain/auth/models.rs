use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(UserId)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How far a role's permissions reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    Own,
    Group,
    All,
}

impl AccessScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessScope::Own => "own",
            AccessScope::Group => "group",
            AccessScope::All => "all",
        }
    }
}

/// Password material owned by a user record.
///
/// Mutated only through the auth service: the failed-attempt counter
/// resets on successful login and increments (atomically, at the storage
/// layer) on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub password_hash: String,
    pub salt: String,
    pub password_expires_at: DateTime<Utc>,
    pub failed_attempts: u32,
}

/// User projection consumed by the auth flows. The full admin user entity
/// lives behind the repository port.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub identifier: String,
    pub role_id: RoleId,
    pub is_active: bool,
    pub is_blocked: bool,
    pub credential: Credential,
}

/// Role projection with the permission set embedded in tokens.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub is_active: bool,
    pub permission_codes: Vec<String>,
    pub access_scope: AccessScope,
}

/// Outcome flag on a successful login or refresh.
///
/// `PasswordExpired` is a soft fail: tokens are still returned so the
/// client can run a forced change-password flow without being locked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    Success,
    PasswordExpired,
}

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub status: LoginStatus,
}

/// Successful refresh result. The refresh token is not rotated.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub status: LoginStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new();
        let parsed = UserId::from_string(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_user_id_invalid_format() {
        assert!(UserId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_access_scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AccessScope::All).unwrap(), r#""all""#);
        assert_eq!(AccessScope::Group.as_str(), "group");
    }
}
