//! Product grouping hierarchy.

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey,
    define_id,
};

define_id!(
    /// Identifier of a catalog category.
    CategoryId
);

/// Grouping node for products. Name is unique within a tenant; nesting via
/// `parent_id` is free-form and not cycle-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub tenant_id: TenantId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub audit: AuditStamp,
}

impl Category {
    pub fn new(
        tenant_id: TenantId,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        Ok(Self {
            id: CategoryId::new(),
            tenant_id,
            name: name.to_string(),
            parent_id,
            audit: AuditStamp::now(),
        })
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        self.name = name.to_string();
        Ok(())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

impl Record for Category {
    const KIND: &'static str = "catalog.category";
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
            "categories_tenant_name_key",
            Some(self.tenant_id),
            &self.name,
        )]
    }
}
