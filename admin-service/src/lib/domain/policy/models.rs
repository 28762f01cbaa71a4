use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::auth::models::UserId;

/// Kind of policy document a route may require consent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    Terms,
    Privacy,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Terms => "terms",
            PolicyType::Privacy => "privacy",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy document unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PolicyId(pub Uuid);

impl PolicyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PolicyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A published policy document version.
///
/// The publish workflow keeps at most one record with `latest = true` per
/// (type, country, language); the guard relies on that invariant.
#[derive(Debug, Clone)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub policy_type: PolicyType,
    pub country: String,
    pub language: String,
    pub version: u32,
    pub published: bool,
    pub latest: bool,
}

/// A recorded user consent to one policy version in one locale.
///
/// Append-only: re-accepting writes a new record instead of updating, so
/// the consent history stays auditable.
#[derive(Debug, Clone)]
pub struct AcceptanceRecord {
    pub user_id: UserId,
    pub policy_type: PolicyType,
    pub country: String,
    pub language: String,
    pub version: u32,
    pub accepted_at: DateTime<Utc>,
}

/// Request-scoped input for the guard pipeline.
#[derive(Debug, Clone)]
pub struct GuardContext {
    pub user_id: UserId,
    pub language: String,
    pub country: String,
    /// Policy type the route requires, if any. `None` means the route is
    /// not consent-gated and the policy guard allows it.
    pub required_policy: Option<PolicyType>,
}

/// Details attached to a stale-consent rejection so a client can redirect
/// straight into a re-consent flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StalePolicyDetails {
    pub policy_id: PolicyId,
    pub policy_type: PolicyType,
    pub version: u32,
    pub current_accepted_version: u32,
}
