//! Credential and token lifecycle flows.
//!
//! One orchestrator for register, login, refresh, and logout. Handlers pass
//! the tenant the resolution middleware produced; flows build the scope,
//! drive the identity store, and return a session or a `DomainError` the
//! transport maps to a status code.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use stockroom_auth::{
    IssuedAccess, MIN_PASSWORD_LENGTH, OWNER, RefreshToken, RoleAssignment, TokenError,
    TokenService, User, UserId, hash_password, normalize_email, verify_password,
};
use stockroom_core::{DomainError, DomainResult, Scope, TenantId};

use crate::seed::ensure_builtin_roles;
use crate::traits::IdentityStore;

/// Outcome of a successful register, login, or refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub roles: Vec<String>,
    pub access: IssuedAccess,
    pub refresh: RefreshToken,
}

pub struct AuthFlows {
    identity: Arc<dyn IdentityStore>,
    tokens: TokenService,
}

impl AuthFlows {
    pub fn new(identity: Arc<dyn IdentityStore>, tokens: TokenService) -> Self {
        Self { identity, tokens }
    }

    /// First-user registration. The tenant must have no users yet; the new
    /// account becomes its Owner and receives a token pair immediately.
    #[instrument(skip(self, password, full_name), fields(tenant = %tenant), err)]
    pub async fn register(
        &self,
        tenant: TenantId,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> DomainResult<AuthSession> {
        let scope = Scope::tenant(tenant);

        if self.identity.tenant_has_users(&scope).await? {
            return Err(DomainError::TenantAlreadyInitialized);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        ensure_builtin_roles(self.identity.as_ref()).await?;

        let hash = hash_password(password).map_err(|e| DomainError::internal(e.to_string()))?;
        let user = User::new(tenant, email, hash, full_name)?;
        let user = self.identity.insert_user(&scope, user).await?;

        let owner = self.identity.ensure_role(OWNER).await?;
        self.identity
            .insert_assignment(&scope, RoleAssignment::new(tenant, user.id, owner.id))
            .await?;

        let roles = vec![OWNER.to_string()];
        let now = Utc::now();
        let refresh = RefreshToken::issue(
            tenant,
            user.id,
            TokenService::new_refresh_value(),
            now,
            self.tokens.refresh_lifetime(),
        );
        let refresh = self.identity.insert_refresh_token(&scope, refresh).await?;
        let access = self.issue_access(&user, tenant, &roles)?;

        debug!(user = %user.id, "registered tenant owner");
        Ok(AuthSession {
            user,
            roles,
            access,
            refresh,
        })
    }

    /// Password login. Unknown email, inactive account, and wrong password
    /// all fail identically. A successful login revokes the user's active
    /// refresh tokens and issues a fresh pair in one commit.
    #[instrument(skip(self, password), fields(tenant = %tenant), err)]
    pub async fn login(
        &self,
        tenant: TenantId,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthSession> {
        let scope = Scope::tenant(tenant);
        let email = normalize_email(email);

        let user = match self.identity.find_user_by_email(&scope, &email).await? {
            Some(u) if u.active => u,
            _ => return Err(DomainError::InvalidCredentials),
        };
        let verified = verify_password(&user.password_hash, password)
            .map_err(|e| DomainError::internal(e.to_string()))?;
        if !verified {
            return Err(DomainError::InvalidCredentials);
        }

        let roles = self.identity.role_names_for_user(&scope, user.id).await?;
        let now = Utc::now();
        let refresh = RefreshToken::issue(
            tenant,
            user.id,
            TokenService::new_refresh_value(),
            now,
            self.tokens.refresh_lifetime(),
        );
        let refresh = self
            .identity
            .insert_refresh_token_replacing_active(&scope, user.id, refresh, now)
            .await?;
        let access = self.issue_access(&user, tenant, &roles)?;

        debug!(user = %user.id, "login succeeded");
        Ok(AuthSession {
            user,
            roles,
            access,
            refresh,
        })
    }

    /// Refresh rotation. The presented value must resolve, within the
    /// scope's tenant, to an unrevoked and unexpired token; rotation then
    /// revokes it and inserts the successor atomically, so of two
    /// concurrent presentations of the same value exactly one succeeds.
    ///
    /// The user's `active` flag is not re-checked here: revocation is the
    /// session kill switch.
    #[instrument(skip_all, fields(tenant = %tenant), err)]
    pub async fn refresh(&self, tenant: TenantId, presented: &str) -> DomainResult<AuthSession> {
        let scope = Scope::tenant(tenant);

        let current = self
            .identity
            .find_refresh_token(&scope, presented)
            .await?
            .ok_or(DomainError::InvalidRefreshToken)?;
        let now = Utc::now();
        if !current.is_active(now) {
            return Err(DomainError::InvalidRefreshToken);
        }

        let user = self
            .identity
            .get_user(&scope, current.user_id)
            .await?
            .ok_or(DomainError::InvalidRefreshToken)?;
        let roles = self.identity.role_names_for_user(&scope, user.id).await?;

        let replacement = RefreshToken::issue(
            tenant,
            user.id,
            TokenService::new_refresh_value(),
            now,
            self.tokens.refresh_lifetime(),
        );
        let refresh = self
            .identity
            .rotate_refresh_token(&scope, current.id, replacement, now)
            .await?
            .ok_or(DomainError::InvalidRefreshToken)?;
        let access = self.issue_access(&user, tenant, &roles)?;

        debug!(user = %user.id, "refresh token rotated");
        Ok(AuthSession {
            user,
            roles,
            access,
            refresh,
        })
    }

    /// Revoke every unrevoked refresh token of the user. Idempotent; a
    /// second logout revokes nothing and still succeeds.
    #[instrument(skip(self), fields(tenant = %tenant, user = %user_id), err)]
    pub async fn logout(&self, tenant: TenantId, user_id: UserId) -> DomainResult<()> {
        let scope = Scope::tenant(tenant);
        let revoked = self
            .identity
            .revoke_refresh_tokens_for_user(&scope, user_id, Utc::now())
            .await?;
        debug!(revoked, "logout revoked refresh tokens");
        Ok(())
    }

    fn issue_access(
        &self,
        user: &User,
        tenant: TenantId,
        roles: &[String],
    ) -> DomainResult<IssuedAccess> {
        self.tokens
            .issue_access(user.id, &user.email, tenant, roles)
            .map_err(|e: TokenError| DomainError::internal(format!("token issuance failed: {e}")))
    }
}
