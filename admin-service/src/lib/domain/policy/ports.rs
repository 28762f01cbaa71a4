use async_trait::async_trait;

use crate::domain::auth::models::UserId;
use crate::domain::policy::errors::GuardError;
use crate::domain::policy::models::AcceptanceRecord;
use crate::domain::policy::models::PolicyRecord;
use crate::domain::policy::models::PolicyType;

/// Persistence operations for published policy documents.
#[async_trait]
pub trait PolicyRepository: Send + Sync + 'static {
    /// Retrieve the published policy marked `latest` for the given
    /// (type, language, country) tuple.
    ///
    /// # Returns
    /// Optional policy record (None if nothing is published for the locale)
    ///
    /// # Errors
    /// * `Repository` - Storage operation failed
    async fn find_latest_published(
        &self,
        policy_type: PolicyType,
        language: &str,
        country: &str,
    ) -> Result<Option<PolicyRecord>, GuardError>;
}

/// Persistence operations for policy acceptances.
#[async_trait]
pub trait PolicyAcceptanceRepository: Send + Sync + 'static {
    /// Retrieve the user's most recent acceptance for the exact
    /// (type, country, language) tuple. Locale matters: an acceptance in
    /// one locale never satisfies another.
    async fn find_acceptance(
        &self,
        user_id: &UserId,
        policy_type: PolicyType,
        country: &str,
        language: &str,
    ) -> Result<Option<AcceptanceRecord>, GuardError>;

    /// Append a new acceptance record. Existing records are never
    /// updated; re-accepting writes a new row to preserve the audit trail.
    async fn record_acceptance(&self, acceptance: AcceptanceRecord) -> Result<(), GuardError>;
}
