use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Credential;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::RoleId;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;

/// Persistence operations for users consumed by the auth flows.
///
/// The admin CRUD surface lives elsewhere; this port only covers what
/// login, refresh, and change-password need.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by login identifier (email or username).
    ///
    /// # Returns
    /// Optional user (None if not found)
    ///
    /// # Errors
    /// * `Repository` - Storage operation failed
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AuthError>;

    /// Retrieve user by unique identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;

    /// Replace the user's credential material (hash, salt, expiry,
    /// attempt counter).
    async fn update_credential(&self, id: &UserId, credential: Credential)
        -> Result<(), AuthError>;

    /// Increment the failed-attempt counter with an atomic storage-level
    /// operation and return the new count. Read-modify-write would lose
    /// updates under concurrent failed logins against one account.
    async fn record_failed_attempt(&self, id: &UserId) -> Result<u32, AuthError>;

    /// Reset the failed-attempt counter to zero.
    async fn reset_attempts(&self, id: &UserId) -> Result<(), AuthError>;

    /// Flip the user's active flag.
    async fn set_active(&self, id: &UserId, active: bool) -> Result<(), AuthError>;
}

/// Persistence operations for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    /// Retrieve role by unique identifier, including `is_active` and the
    /// permission codes projected into tokens.
    ///
    /// # Errors
    /// * `Repository` - Storage operation failed
    async fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, AuthError>;
}

/// Runtime settings consulted per login attempt.
///
/// Attempt limiting is an operator-tunable setting, not static config,
/// which is why it sits behind a port.
#[async_trait]
pub trait SettingService: Send + Sync + 'static {
    async fn max_password_attempts(&self) -> Result<u32, AuthError>;

    async fn password_attempt_enabled(&self) -> Result<bool, AuthError>;
}
