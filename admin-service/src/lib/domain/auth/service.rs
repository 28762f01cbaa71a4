use std::sync::Arc;

use auth::PasswordPolicy;
use auth::RoleClaims;
use auth::TokenClaims;
use auth::TokenKind;
use auth::TokenService;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Credential;
use crate::domain::auth::models::LoginResponse;
use crate::domain::auth::models::LoginStatus;
use crate::domain::auth::models::RefreshResponse;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::models::TOKEN_TYPE_BEARER;
use crate::domain::auth::ports::RoleRepository;
use crate::domain::auth::ports::SettingService;
use crate::domain::auth::ports::UserRepository;

/// Authentication orchestration service.
///
/// Coordinates the password policy and token service against the user,
/// role, and settings ports. Holds no mutable state of its own; the only
/// cross-request state is the per-user attempt counter behind the
/// repository.
pub struct AuthService<UR, RR, SS>
where
    UR: UserRepository,
    RR: RoleRepository,
    SS: SettingService,
{
    users: Arc<UR>,
    roles: Arc<RR>,
    settings: Arc<SS>,
    passwords: PasswordPolicy,
    tokens: TokenService,
}

impl<UR, RR, SS> AuthService<UR, RR, SS>
where
    UR: UserRepository,
    RR: RoleRepository,
    SS: SettingService,
{
    pub fn new(
        users: Arc<UR>,
        roles: Arc<RR>,
        settings: Arc<SS>,
        passwords: PasswordPolicy,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            roles,
            settings,
            passwords,
            tokens,
        }
    }

    /// Authenticate a user and issue an access/refresh token pair.
    ///
    /// The checks run in a fixed order: lookup, attempt lockout, password,
    /// account status, role status. A correct password against a blocked
    /// account reports `UserBlocked`, never `UserNotFound`.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this identifier
    /// * `AttemptsExceeded` - Attempt limit reached (terminal; does not
    ///   increment further)
    /// * `PasswordMismatch` - Wrong password (increments the counter)
    /// * `UserInactive` / `UserBlocked` / `RoleInactive` - Account state
    ///   forbids login
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(identifier.to_string()))?;

        if self.settings.password_attempt_enabled().await? {
            let max = self.settings.max_password_attempts().await?;
            if user.credential.failed_attempts >= max {
                tracing::warn!(user_id = %user.id, "Login rejected: attempt limit reached");
                return Err(AuthError::AttemptsExceeded);
            }
        }

        if !self
            .passwords
            .verify(password, &user.credential.password_hash)
        {
            let attempts = self.users.record_failed_attempt(&user.id).await?;
            tracing::warn!(user_id = %user.id, attempts, "Login rejected: password mismatch");
            return Err(AuthError::PasswordMismatch);
        }

        self.check_account_status(&user)?;
        let role = self.active_role(&user).await?;

        self.users.reset_attempts(&user.id).await?;

        let now = Utc::now();
        let claims = TokenClaims::for_login(
            user.id,
            role_claims(&role),
            remember_me,
            now,
            now + self.tokens.refresh_ttl(remember_me),
        );
        let access_token = self.tokens.issue_access_token(&claims)?;
        let refresh_token = self.tokens.issue_refresh_token(&claims)?;

        // An expired password still gets tokens; the status flag tells the
        // client to force a change-password flow.
        let status = if self
            .passwords
            .is_expired(user.credential.password_expires_at, now)
        {
            LoginStatus::PasswordExpired
        } else {
            LoginStatus::Success
        };

        tracing::info!(user_id = %user.id, ?status, "Login succeeded");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER,
            expires_in: self.tokens.access_ttl().num_seconds(),
            status,
        })
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// Account and role status are re-checked against current repository
    /// state; the claims inside the token are stale by definition. The
    /// refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let claims = self
            .tokens
            .authenticate(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!("Refresh token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        let user_id =
            UserId::from_string(&claims.subject_id).map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(claims.subject_id.clone()))?;

        self.check_account_status(&user)?;
        let role = self.active_role(&user).await?;

        let fresh_claims = TokenClaims {
            kind: TokenKind::Access,
            subject_id: user.id.to_string(),
            role: role_claims(&role),
            remember_me: claims.remember_me,
            // The login session window stays the one established at login
            issued_context: claims.issued_context,
        };
        let access_token = self.tokens.issue_access_token(&fresh_claims)?;

        let status = if self
            .passwords
            .is_expired(user.credential.password_expires_at, Utc::now())
        {
            LoginStatus::PasswordExpired
        } else {
            LoginStatus::Success
        };

        Ok(RefreshResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
            expires_in: self.tokens.access_ttl().num_seconds(),
            status,
        })
    }

    /// Replace a user's password.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `PasswordMismatch` - Old password does not verify
    /// * `PasswordNewMustDiffer` - New password equals the current one;
    ///   the credential is left unchanged
    pub async fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;

        if !self
            .passwords
            .verify(old_password, &user.credential.password_hash)
        {
            return Err(AuthError::PasswordMismatch);
        }

        if self
            .passwords
            .verify(new_password, &user.credential.password_hash)
        {
            return Err(AuthError::PasswordNewMustDiffer);
        }

        let material = self.passwords.create_password(new_password)?;
        self.users
            .update_credential(
                &user.id,
                Credential {
                    password_hash: material.hash,
                    salt: material.salt,
                    password_expires_at: material.expires_at,
                    failed_attempts: 0,
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Flip a user's active flag.
    pub async fn set_user_active(&self, user_id: &UserId, active: bool) -> Result<(), AuthError> {
        self.users.set_active(user_id, active).await
    }

    /// Reset a user's failed-attempt counter (support/unlock flow).
    pub async fn reset_attempts(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.users.reset_attempts(user_id).await
    }

    /// Record a failed attempt against a user and return the new count.
    pub async fn increase_attempts(&self, user_id: &UserId) -> Result<u32, AuthError> {
        self.users.record_failed_attempt(user_id).await
    }

    fn check_account_status(&self, user: &User) -> Result<(), AuthError> {
        if !user.is_active {
            return Err(AuthError::UserInactive);
        }
        if user.is_blocked {
            return Err(AuthError::UserBlocked);
        }
        Ok(())
    }

    async fn active_role(&self, user: &User) -> Result<Role, AuthError> {
        let role = self
            .roles
            .find_by_id(&user.role_id)
            .await?
            .ok_or_else(|| AuthError::RoleNotFound(user.role_id.to_string()))?;

        if !role.is_active {
            return Err(AuthError::RoleInactive);
        }
        Ok(role)
    }
}

fn role_claims(role: &Role) -> RoleClaims {
    RoleClaims {
        name: role.name.clone(),
        permission_codes: role.permission_codes.clone(),
        access_scope: role.access_scope.as_str().to_string(),
    }
}
