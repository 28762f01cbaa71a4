use std::sync::Arc;

use chrono::Utc;

use crate::domain::auth::models::UserId;
use crate::domain::policy::errors::GuardError;
use crate::domain::policy::models::AcceptanceRecord;
use crate::domain::policy::models::PolicyType;
use crate::domain::policy::ports::PolicyAcceptanceRepository;
use crate::domain::policy::ports::PolicyRepository;

/// Records user consent to the latest published policy version.
///
/// Used by the signup and re-consent flows. Every accept appends a new
/// record; earlier acceptances are never touched.
pub struct PolicyConsentService<PR, AR>
where
    PR: PolicyRepository,
    AR: PolicyAcceptanceRepository,
{
    policies: Arc<PR>,
    acceptances: Arc<AR>,
}

impl<PR, AR> PolicyConsentService<PR, AR>
where
    PR: PolicyRepository,
    AR: PolicyAcceptanceRepository,
{
    pub fn new(policies: Arc<PR>, acceptances: Arc<AR>) -> Self {
        Self {
            policies,
            acceptances,
        }
    }

    /// Accept the latest published version of a policy for the user's
    /// locale and return the accepted version.
    ///
    /// # Errors
    /// * `PolicyNotFound` - Nothing is published for the locale
    /// * `Repository` - Storage operation failed
    pub async fn accept_latest(
        &self,
        user_id: &UserId,
        policy_type: PolicyType,
        language: &str,
        country: &str,
    ) -> Result<u32, GuardError> {
        let latest = self
            .policies
            .find_latest_published(policy_type, language, country)
            .await?
            .ok_or_else(|| GuardError::PolicyNotFound {
                policy_type,
                language: language.to_string(),
                country: country.to_string(),
            })?;

        self.acceptances
            .record_acceptance(AcceptanceRecord {
                user_id: *user_id,
                policy_type,
                country: country.to_string(),
                language: language.to_string(),
                version: latest.version,
                accepted_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            policy_type = %policy_type,
            version = latest.version,
            "Policy accepted"
        );
        Ok(latest.version)
    }
}
