//! Refresh token record and its rotation state machine.

use chrono::{DateTime, Duration, Utc};

use stockroom_core::{
    AuditStamp, Entity, FilterSet, Record, TenantId, UniqueKey, define_id,
};

use crate::user::UserId;

define_id!(
    /// Identifier of a refresh token row.
    RefreshTokenId
);

/// Lifecycle state, derived lazily from the row at the moment of use.
///
/// Active → Revoked (rotation or logout) or Expired (clock passes
/// `expires_at`). Both end states are terminal; nothing restores Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    Revoked,
    Expired,
}

/// Opaque credential record, one per issued refresh token.
///
/// Created on every successful registration, login, and refresh. Mutated
/// exactly once, when `revoked_at` is set; never updated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub audit: AuditStamp,
}

impl RefreshToken {
    pub fn issue(
        tenant_id: TenantId,
        user_id: UserId,
        token: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: RefreshTokenId::new(),
            tenant_id,
            user_id,
            token: token.into(),
            expires_at: now + lifetime,
            revoked_at: None,
            audit: AuditStamp::now(),
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked_at.is_some() {
            TokenState::Revoked
        } else if self.expires_at <= now {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == TokenState::Active
    }

    /// The single permitted mutation. First revocation wins; repeats keep
    /// the original timestamp.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
        }
    }
}

impl Entity for RefreshToken {
    type Id = RefreshTokenId;

    fn id(&self) -> &RefreshTokenId {
        &self.id
    }
}

impl Record for RefreshToken {
    const KIND: &'static str = "identity.refresh_token";
    const FILTERS: FilterSet = FilterSet::TENANT;

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn tenant_id(&self) -> Option<TenantId> {
        Some(self.tenant_id)
    }

    fn assign_tenant(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        // Token values are globally unique, not per tenant.
        vec![UniqueKey::new("refresh_tokens_token_key", &self.token)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> RefreshToken {
        RefreshToken::issue(
            TenantId::new(),
            UserId::new(),
            "opaque-value",
            now,
            Duration::days(7),
        )
    }

    #[test]
    fn fresh_token_is_active() {
        let now = Utc::now();
        let t = sample(now);
        assert_eq!(t.state(now), TokenState::Active);
        assert!(t.is_active(now));
    }

    #[test]
    fn expiry_is_detected_lazily_at_the_boundary() {
        let now = Utc::now();
        let t = sample(now);
        let at_expiry = t.expires_at;
        assert_eq!(t.state(at_expiry), TokenState::Expired);
        assert_eq!(t.state(at_expiry - Duration::seconds(1)), TokenState::Active);
    }

    #[test]
    fn revocation_is_terminal_and_wins_over_expiry() {
        let now = Utc::now();
        let mut t = sample(now);
        t.revoke(now);
        assert_eq!(t.state(now), TokenState::Revoked);
        // Even past expiry the row reads as revoked.
        assert_eq!(t.state(now + Duration::days(30)), TokenState::Revoked);
    }

    #[test]
    fn second_revocation_keeps_the_first_timestamp() {
        let now = Utc::now();
        let mut t = sample(now);
        t.revoke(now);
        t.revoke(now + Duration::hours(1));
        assert_eq!(t.revoked_at, Some(now));
    }
}
