//! The tenant boundary entity.

use crate::entity::{AuditStamp, Entity};
use crate::error::{DomainError, DomainResult};
use crate::id::TenantId;
use crate::record::{FilterSet, Record};

/// A tenant: the isolation boundary all business data belongs to.
///
/// Tenants are created by an explicit provisioning operation and are never
/// deleted, only deactivated. The tenant row itself is not tenant-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub domain: Option<String>,
    pub active: bool,
    pub audit: AuditStamp,
}

impl Tenant {
    pub fn new(name: impl Into<String>, domain: Option<String>) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("tenant name is required"));
        }
        Ok(Self {
            id: TenantId::new(),
            name,
            domain: domain.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            active: true,
            audit: AuditStamp::now(),
        })
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn reactivate(&mut self) {
        self.active = true;
    }
}

impl Entity for Tenant {
    type Id = TenantId;

    fn id(&self) -> &TenantId {
        &self.id
    }
}

impl Record for Tenant {
    const KIND: &'static str = "core.tenant";
    const FILTERS: FilterSet = FilterSet::NONE;

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_is_active_and_trims_inputs() {
        let t = Tenant::new("  Acme  ", Some(" acme.local ".to_string())).unwrap();
        assert_eq!(t.name, "Acme");
        assert_eq!(t.domain.as_deref(), Some("acme.local"));
        assert!(t.active);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Tenant::new("   ", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_domain_collapses_to_none() {
        let t = Tenant::new("Acme", Some("  ".to_string())).unwrap();
        assert_eq!(t.domain, None);
    }

    #[test]
    fn deactivate_then_reactivate_round_trips() {
        let mut t = Tenant::new("Acme", None).unwrap();
        t.deactivate();
        assert!(!t.active);
        t.reactivate();
        assert!(t.active);
    }
}
