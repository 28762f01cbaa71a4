use thiserror::Error;

use crate::domain::auth::errors::ErrorKind;
use crate::domain::policy::models::PolicyType;
use crate::domain::policy::models::StalePolicyDetails;

/// Error type for guard evaluation.
///
/// Guard denials are expected outcomes with stable codes: the client
/// distinguishes "no such policy" from "must consent" from "must
/// re-consent" without parsing messages.
#[derive(Debug, Clone, Error)]
pub enum GuardError {
    #[error("No published policy found for {policy_type} ({language}/{country})")]
    PolicyNotFound {
        policy_type: PolicyType,
        language: String,
        country: String,
    },

    #[error("Policy {policy_type} has not been accepted")]
    PolicyNotAccepted { policy_type: PolicyType },

    #[error("Accepted policy version is no longer the latest")]
    PolicyVersionStale {
        /// Present when the guard is configured to respond with policy
        /// details for the re-consent redirect.
        details: Option<StalePolicyDetails>,
    },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl GuardError {
    /// Stable machine-readable code for API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::PolicyNotFound { .. } => "POLICY_NOT_FOUND",
            GuardError::PolicyNotAccepted { .. } => "POLICY_NOT_ACCEPTED",
            GuardError::PolicyVersionStale { .. } => "POLICY_VERSION_STALE",
            GuardError::Repository(_) => "POLICY_REPOSITORY_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GuardError::PolicyNotFound { .. } => ErrorKind::NotFound,
            GuardError::PolicyNotAccepted { .. } | GuardError::PolicyVersionStale { .. } => {
                ErrorKind::Forbidden
            }
            GuardError::Repository(_) => ErrorKind::Internal,
        }
    }
}
