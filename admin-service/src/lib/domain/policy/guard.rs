use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::policy::errors::GuardError;
use crate::domain::policy::models::GuardContext;
use crate::domain::policy::models::StalePolicyDetails;
use crate::domain::policy::ports::PolicyAcceptanceRepository;
use crate::domain::policy::ports::PolicyRepository;

/// A single request-time authorization check.
///
/// Guards are composed into an explicit ordered pipeline per endpoint
/// instead of being stacked through decorator metadata; each returns an
/// allow/deny result and the first deny short-circuits the request.
#[async_trait]
pub trait RequestGuard: Send + Sync + 'static {
    async fn check(&self, ctx: &GuardContext) -> Result<(), GuardError>;
}

/// Ordered list of guards evaluated per request, first deny wins.
#[derive(Default)]
pub struct GuardPipeline {
    guards: Vec<Arc<dyn RequestGuard>>,
}

impl GuardPipeline {
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    pub fn with_guard(mut self, guard: Arc<dyn RequestGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Run every guard in registration order.
    pub async fn check(&self, ctx: &GuardContext) -> Result<(), GuardError> {
        for guard in &self.guards {
            guard.check(ctx).await?;
        }
        Ok(())
    }
}

/// Blocks authenticated requests until the user has accepted the required
/// policy version for their locale.
///
/// Compliance is scoped by (type, country, language) jointly: accepting
/// version 3 of a policy in one locale says nothing about another locale,
/// even if the version numbers line up.
pub struct PolicyAcceptanceGuard<PR, AR>
where
    PR: PolicyRepository,
    AR: PolicyAcceptanceRepository,
{
    policies: Arc<PR>,
    acceptances: Arc<AR>,
    require_latest_version: bool,
    respond_with_policy_details: bool,
}

impl<PR, AR> PolicyAcceptanceGuard<PR, AR>
where
    PR: PolicyRepository,
    AR: PolicyAcceptanceRepository,
{
    /// Defaults: the latest version is required and stale rejections carry
    /// the policy details for the re-consent redirect.
    pub fn new(policies: Arc<PR>, acceptances: Arc<AR>) -> Self {
        Self {
            policies,
            acceptances,
            require_latest_version: true,
            respond_with_policy_details: true,
        }
    }

    /// When off, any recorded acceptance satisfies the guard regardless of
    /// the published version.
    pub fn require_latest_version(mut self, require: bool) -> Self {
        self.require_latest_version = require;
        self
    }

    pub fn respond_with_policy_details(mut self, respond: bool) -> Self {
        self.respond_with_policy_details = respond;
        self
    }
}

#[async_trait]
impl<PR, AR> RequestGuard for PolicyAcceptanceGuard<PR, AR>
where
    PR: PolicyRepository,
    AR: PolicyAcceptanceRepository,
{
    async fn check(&self, ctx: &GuardContext) -> Result<(), GuardError> {
        // Route declares no required policy: not consent-gated
        let Some(policy_type) = ctx.required_policy else {
            return Ok(());
        };

        let latest = self
            .policies
            .find_latest_published(policy_type, &ctx.language, &ctx.country)
            .await?
            .ok_or_else(|| GuardError::PolicyNotFound {
                policy_type,
                language: ctx.language.clone(),
                country: ctx.country.clone(),
            })?;

        let acceptance = self
            .acceptances
            .find_acceptance(&ctx.user_id, policy_type, &ctx.country, &ctx.language)
            .await?
            .ok_or(GuardError::PolicyNotAccepted { policy_type })?;

        if self.require_latest_version && acceptance.version != latest.version {
            tracing::warn!(
                user_id = %ctx.user_id,
                policy_type = %policy_type,
                accepted = acceptance.version,
                latest = latest.version,
                "Request blocked: policy acceptance is stale"
            );
            let details = self
                .respond_with_policy_details
                .then_some(StalePolicyDetails {
                    policy_id: latest.id,
                    policy_type,
                    version: latest.version,
                    current_accepted_version: acceptance.version,
                });
            return Err(GuardError::PolicyVersionStale { details });
        }

        tracing::debug!(user_id = %ctx.user_id, policy_type = %policy_type, "Policy guard passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::auth::models::UserId;
    use crate::domain::policy::models::AcceptanceRecord;
    use crate::domain::policy::models::PolicyId;
    use crate::domain::policy::models::PolicyRecord;
    use crate::domain::policy::models::PolicyType;

    mock! {
        pub TestPolicyRepository {}

        #[async_trait]
        impl PolicyRepository for TestPolicyRepository {
            async fn find_latest_published(
                &self,
                policy_type: PolicyType,
                language: &str,
                country: &str,
            ) -> Result<Option<PolicyRecord>, GuardError>;
        }
    }

    mock! {
        pub TestAcceptanceRepository {}

        #[async_trait]
        impl PolicyAcceptanceRepository for TestAcceptanceRepository {
            async fn find_acceptance(
                &self,
                user_id: &UserId,
                policy_type: PolicyType,
                country: &str,
                language: &str,
            ) -> Result<Option<AcceptanceRecord>, GuardError>;
            async fn record_acceptance(&self, acceptance: AcceptanceRecord) -> Result<(), GuardError>;
        }
    }

    fn published(policy_type: PolicyType, version: u32) -> PolicyRecord {
        PolicyRecord {
            id: PolicyId::new(),
            policy_type,
            country: "de".to_string(),
            language: "de-DE".to_string(),
            version,
            published: true,
            latest: true,
        }
    }

    fn acceptance(user_id: UserId, policy_type: PolicyType, version: u32) -> AcceptanceRecord {
        AcceptanceRecord {
            user_id,
            policy_type,
            country: "de".to_string(),
            language: "de-DE".to_string(),
            version,
            accepted_at: Utc::now(),
        }
    }

    fn ctx(user_id: UserId, required: Option<PolicyType>) -> GuardContext {
        GuardContext {
            user_id,
            language: "de-DE".to_string(),
            country: "de".to_string(),
            required_policy: required,
        }
    }

    #[tokio::test]
    async fn test_route_without_required_policy_is_allowed() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();
        policies.expect_find_latest_published().times(0);
        acceptances.expect_find_acceptance().times(0);

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard.check(&ctx(UserId::new(), None)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_published_policy() {
        let mut policies = MockTestPolicyRepository::new();
        let acceptances = MockTestAcceptanceRepository::new();

        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Privacy)))
            .await;
        assert!(matches!(
            result.unwrap_err(),
            GuardError::PolicyNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_acceptance() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|policy_type, _, _| Ok(Some(published(policy_type, 3))));
        acceptances
            .expect_find_acceptance()
            .times(1)
            .returning(|_, _, _, _| Ok(None));

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Terms)))
            .await;
        assert!(matches!(
            result.unwrap_err(),
            GuardError::PolicyNotAccepted {
                policy_type: PolicyType::Terms
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_acceptance_with_details() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        // Latest published is version 3; the user accepted version 2
        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|policy_type, _, _| Ok(Some(published(policy_type, 3))));
        acceptances
            .expect_find_acceptance()
            .times(1)
            .returning(|user_id, policy_type, _, _| {
                Ok(Some(acceptance(*user_id, policy_type, 2)))
            });

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Privacy)))
            .await;

        match result.unwrap_err() {
            GuardError::PolicyVersionStale { details } => {
                let details = details.expect("details must be attached by default");
                assert_eq!(details.policy_type, PolicyType::Privacy);
                assert_eq!(details.version, 3);
                assert_eq!(details.current_accepted_version, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_acceptance_without_details() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|policy_type, _, _| Ok(Some(published(policy_type, 3))));
        acceptances
            .expect_find_acceptance()
            .times(1)
            .returning(|user_id, policy_type, _, _| {
                Ok(Some(acceptance(*user_id, policy_type, 2)))
            });

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances))
            .respond_with_policy_details(false);
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Privacy)))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            GuardError::PolicyVersionStale { details: None }
        ));
    }

    #[tokio::test]
    async fn test_stale_acceptance_allowed_when_latest_not_required() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|policy_type, _, _| Ok(Some(published(policy_type, 3))));
        acceptances
            .expect_find_acceptance()
            .times(1)
            .returning(|user_id, policy_type, _, _| {
                Ok(Some(acceptance(*user_id, policy_type, 2)))
            });

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances))
            .require_latest_version(false);
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Privacy)))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_matching_acceptance_is_allowed() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        policies
            .expect_find_latest_published()
            .times(1)
            .returning(|policy_type, _, _| Ok(Some(published(policy_type, 3))));
        acceptances
            .expect_find_acceptance()
            .times(1)
            .returning(|user_id, policy_type, _, _| {
                Ok(Some(acceptance(*user_id, policy_type, 3)))
            });

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard
            .check(&ctx(UserId::new(), Some(PolicyType::Terms)))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_lookup_is_scoped_by_locale() {
        let mut policies = MockTestPolicyRepository::new();
        let mut acceptances = MockTestAcceptanceRepository::new();

        let user_id = UserId::new();

        // Both lookups must use the request's exact locale pairing
        policies
            .expect_find_latest_published()
            .withf(|_, language, country| language == "fr-FR" && country == "fr")
            .times(1)
            .returning(|policy_type, _, _| {
                Ok(Some(PolicyRecord {
                    country: "fr".to_string(),
                    language: "fr-FR".to_string(),
                    ..published(policy_type, 3)
                }))
            });
        acceptances
            .expect_find_acceptance()
            .withf(move |id, _, country, language| {
                *id == user_id && country == "fr" && language == "fr-FR"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(None));

        let guard = PolicyAcceptanceGuard::new(Arc::new(policies), Arc::new(acceptances));
        let result = guard
            .check(&GuardContext {
                user_id,
                language: "fr-FR".to_string(),
                country: "fr".to_string(),
                required_policy: Some(PolicyType::Privacy),
            })
            .await;

        // The user accepted nothing under fr/fr-FR, whatever they did elsewhere
        assert!(matches!(
            result.unwrap_err(),
            GuardError::PolicyNotAccepted { .. }
        ));
    }

    #[tokio::test]
    async fn test_pipeline_first_deny_wins() {
        struct Allow;
        struct Deny;

        #[async_trait]
        impl RequestGuard for Allow {
            async fn check(&self, _ctx: &GuardContext) -> Result<(), GuardError> {
                Ok(())
            }
        }

        #[async_trait]
        impl RequestGuard for Deny {
            async fn check(&self, _ctx: &GuardContext) -> Result<(), GuardError> {
                Err(GuardError::PolicyNotAccepted {
                    policy_type: PolicyType::Terms,
                })
            }
        }

        // A guard after the denying one must never run
        struct Unreachable;
        #[async_trait]
        impl RequestGuard for Unreachable {
            async fn check(&self, _ctx: &GuardContext) -> Result<(), GuardError> {
                panic!("guard after a deny must not run");
            }
        }

        let pipeline = GuardPipeline::new()
            .with_guard(Arc::new(Allow))
            .with_guard(Arc::new(Deny))
            .with_guard(Arc::new(Unreachable));

        let result = pipeline.check(&ctx(UserId::new(), None)).await;
        assert!(matches!(
            result.unwrap_err(),
            GuardError::PolicyNotAccepted { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_pipeline_allows() {
        let pipeline = GuardPipeline::new();
        assert!(pipeline.check(&ctx(UserId::new(), None)).await.is_ok());
    }
}
