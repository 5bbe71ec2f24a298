//! Roles and tenant-scoped role assignments.
//!
//! Roles are global rows (not tenant-scoped); the association of a user to a
//! role happens within a tenant through [`RoleAssignment`], which carries the
//! tenant id redundantly so authorization lookups stay tenant-filtered
//! without joining through the user row. Associations are id-based only.

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey,
    define_id,
};

use crate::user::UserId;

define_id!(
    /// Identifier of a global role row.
    RoleId
);

define_id!(
    /// Identifier of a role assignment row.
    AssignmentId
);

pub const OWNER: &str = "Owner";
pub const ADMIN: &str = "Admin";
pub const MANAGER: &str = "Manager";
pub const CLERK: &str = "Clerk";
pub const VIEWER: &str = "Viewer";

/// The role set every deployment carries. The first registered account of a
/// tenant always receives [`OWNER`].
pub const BUILT_IN_ROLES: [&str; 5] = [OWNER, ADMIN, MANAGER, CLERK, VIEWER];

/// Named permission bucket, globally defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub audit: AuditStamp,
}

impl Role {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("role name is required"));
        }
        Ok(Self {
            id: RoleId::new(),
            name,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &RoleId {
        &self.id
    }
}

impl Record for Role {
    const KIND: &'static str = "identity.role";
    const FILTERS: FilterSet = FilterSet::NONE;

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("roles_name_key", &self.name)]
    }
}

/// Association of a user to a role within one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub tenant_id: TenantId,
    pub audit: AuditStamp,
}

impl RoleAssignment {
    pub fn new(tenant_id: TenantId, user_id: UserId, role_id: RoleId) -> Self {
        Self {
            id: AssignmentId::new(),
            user_id,
            role_id,
            tenant_id,
            audit: AuditStamp::now(),
        }
    }
}

impl Entity for RoleAssignment {
    type Id = AssignmentId;

    fn id(&self) -> &AssignmentId {
        &self.id
    }
}

impl Record for RoleAssignment {
    const KIND: &'static str = "identity.role_assignment";
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
        vec![UniqueKey::new(
            "role_assignments_user_role_tenant_key",
            format!("{}:{}:{}", self.user_id, self.role_id, self.tenant_id),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_set_contains_owner_first() {
        assert_eq!(BUILT_IN_ROLES[0], OWNER);
        assert_eq!(BUILT_IN_ROLES.len(), 5);
    }

    #[test]
    fn role_name_is_trimmed_and_required() {
        assert_eq!(Role::new(" Owner ").unwrap().name, "Owner");
        assert!(Role::new("  ").is_err());
    }

    #[test]
    fn assignment_unique_key_covers_the_triple() {
        let (t, u, r) = (TenantId::new(), UserId::new(), RoleId::new());
        let a = RoleAssignment::new(t, u, r);
        assert_eq!(a.unique_keys()[0].value, format!("{u}:{r}:{t}"));
    }
}
