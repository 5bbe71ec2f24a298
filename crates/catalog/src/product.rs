//! Sellable products.

use chrono::{DateTime, Utc};

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey,
    define_id,
};

use crate::category::CategoryId;
use crate::unit::UnitId;

define_id!(
    /// Identifier of a product.
    ProductId
);

/// Catalog product. SKU is unique within a tenant. Deletion is soft: the row
/// stays, keeps claiming its SKU, and drops out of filtered reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub tenant_id: TenantId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub unit_id: UnitId,
    pub active: bool,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub audit: AuditStamp,
}

impl Product {
    pub fn new(
        tenant_id: TenantId,
        sku: &str,
        name: &str,
        description: Option<String>,
        category_id: Option<CategoryId>,
        unit_id: UnitId,
    ) -> DomainResult<Self> {
        let sku = sku.trim();
        let name = name.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("product SKU is required"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        Ok(Self {
            id: ProductId::new(),
            tenant_id,
            sku: sku.to_string(),
            name: name.to_string(),
            description: description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            category_id,
            unit_id,
            active: true,
            deleted: false,
            deleted_at: None,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

impl Record for Product {
    const KIND: &'static str = "catalog.product";
    const FILTERS: FilterSet = FilterSet::TENANT_AND_SOFT_DELETE;

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

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(at);
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::per_tenant(
            "products_tenant_sku_key",
            Some(self.tenant_id),
            &self.sku,
        )]
    }
}
