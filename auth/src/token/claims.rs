use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Token kind discriminant.
///
/// Carried explicitly inside the claims so a refresh token can never pass
/// for an access token even if the claim shapes overlap. The signing
/// secrets differ per kind as well; this field removes the ambiguity of
/// relying on the secret alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Role projection embedded in a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleClaims {
    pub name: String,
    pub permission_codes: Vec<String>,
    pub access_scope: String,
}

/// When the login happened and when the login session (refresh window)
/// ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuedContext {
    pub login_date: DateTime<Utc>,
    pub login_expires_at: DateTime<Utc>,
}

/// Claims embedded in access and refresh tokens.
///
/// Ephemeral: constructed fresh per issuance, never persisted, and
/// discarded on verification failure. `kind` is stamped by the token
/// service at issue time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub kind: TokenKind,
    pub subject_id: String,
    pub role: RoleClaims,
    pub remember_me: bool,
    pub issued_context: IssuedContext,
}

impl TokenClaims {
    /// Build claims for a fresh login.
    pub fn for_login(
        subject_id: impl ToString,
        role: RoleClaims,
        remember_me: bool,
        login_date: DateTime<Utc>,
        login_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: TokenKind::Access,
            subject_id: subject_id.to_string(),
            role,
            remember_me,
            issued_context: IssuedContext {
                login_date,
                login_expires_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Access).unwrap(),
            r#""access""#
        );
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            r#""refresh""#
        );
    }

    #[test]
    fn test_claims_round_trip() {
        let now = Utc::now();
        let claims = TokenClaims::for_login(
            "user123",
            RoleClaims {
                name: "admin".to_string(),
                permission_codes: vec!["user.read".to_string(), "user.write".to_string()],
                access_scope: "all".to_string(),
            },
            true,
            now,
            now + chrono::Duration::days(30),
        );

        let json = serde_json::to_string(&claims).unwrap();
        let decoded: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, claims);
    }
}
