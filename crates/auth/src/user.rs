//! User identity within a tenant.

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey,
    define_id,
};

define_id!(
    /// Identifier of a user (actor identity).
    UserId
);

/// Canonical form used for storage, lookup, and the per-tenant unique key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Identity within a tenant.
///
/// Created by registration (first account) or, later, invitation. Users are
/// deactivated, never hard-deleted. Email is unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub active: bool,
    pub audit: AuditStamp,
}

impl User {
    pub fn new(
        tenant_id: TenantId,
        email: &str,
        password_hash: impl Into<String>,
        full_name: Option<String>,
    ) -> DomainResult<Self> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("a valid email is required"));
        }
        Ok(Self {
            id: UserId::new(),
            tenant_id,
            email,
            password_hash: password_hash.into(),
            full_name: full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            active: true,
            audit: AuditStamp::now(),
        })
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Record for User {
    const KIND: &'static str = "identity.user";
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
        vec![UniqueKey::per_tenant(
            "users_tenant_email_key",
            Some(self.tenant_id),
            &self.email,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_on_construction() {
        let u = User::new(TenantId::new(), "  Owner@Acme.COM ", "hash", None).unwrap();
        assert_eq!(u.email, "owner@acme.com");
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let err = User::new(TenantId::new(), "not-an-email", "hash", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_full_name_collapses_to_none() {
        let u = User::new(TenantId::new(), "o@x.com", "hash", Some("  ".into())).unwrap();
        assert_eq!(u.full_name, None);
    }

    #[test]
    fn unique_key_is_qualified_by_tenant() {
        let tenant = TenantId::new();
        let u = User::new(tenant, "o@x.com", "hash", None).unwrap();
        let keys = u.unique_keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].constraint, "users_tenant_email_key");
        assert_eq!(keys[0].value, format!("{tenant}:o@x.com"));
    }

    #[test]
    fn new_users_are_active_until_deactivated() {
        let mut u = User::new(TenantId::new(), "o@x.com", "hash", None).unwrap();
        assert!(u.active);
        u.deactivate();
        assert!(!u.active);
    }
}
