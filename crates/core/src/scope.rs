//! Data-access scope, threaded explicitly through every store signature.

use crate::id::TenantId;

/// The tenant narrowing applied to a unit of data access.
///
/// There is no unset or default state: callers either act for one resolved
/// tenant or explicitly request filter-free access. Request handling code
/// never constructs the unrestricted form — it derives scopes from the
/// resolved tenant on the request, so "forgot to filter" is not expressible
/// there. Unrestricted access exists for provisioning and seeding paths
/// that legitimately operate across tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    kind: ScopeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Tenant(TenantId),
    Unrestricted,
}

impl Scope {
    /// Scope for work performed on behalf of one resolved tenant.
    pub fn tenant(id: TenantId) -> Self {
        Self {
            kind: ScopeKind::Tenant(id),
        }
    }

    /// Filter-free scope. Provisioning and seeding only; never constructed
    /// while serving a tenant request.
    pub fn unrestricted() -> Self {
        Self {
            kind: ScopeKind::Unrestricted,
        }
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        match self.kind {
            ScopeKind::Tenant(id) => Some(id),
            ScopeKind::Unrestricted => None,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self.kind, ScopeKind::Unrestricted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_scope_exposes_its_tenant() {
        let id = TenantId::new();
        let scope = Scope::tenant(id);
        assert_eq!(scope.tenant_id(), Some(id));
        assert!(!scope.is_unrestricted());
    }

    #[test]
    fn unrestricted_scope_has_no_tenant() {
        let scope = Scope::unrestricted();
        assert_eq!(scope.tenant_id(), None);
        assert!(scope.is_unrestricted());
    }
}
