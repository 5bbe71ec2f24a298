//! Product variants (size/colour/packaging splits of a product).

use chrono::{DateTime, Utc};

use stockroom_core::{
    AuditStamp, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey, define_id,
};

use crate::product::ProductId;

define_id!(
    /// Identifier of a product variant.
    VariantId
);

/// Variant of a product. SKU and barcode are each unique within a tenant
/// when present; a variant may carry neither. `attributes` is free-form
/// JSON, e.g. `{"size":"M","color":"red"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVariant {
    pub id: VariantId,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub active: bool,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub audit: AuditStamp,
}

impl ProductVariant {
    pub fn new(
        tenant_id: TenantId,
        product_id: ProductId,
        sku: Option<String>,
        barcode: Option<String>,
        attributes: Option<serde_json::Value>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: VariantId::new(),
            tenant_id,
            product_id,
            sku: sku.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            barcode: barcode.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            attributes,
            active: true,
            deleted: false,
            deleted_at: None,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for ProductVariant {
    type Id = VariantId;

    fn id(&self) -> &VariantId {
        &self.id
    }
}

impl Record for ProductVariant {
    const KIND: &'static str = "catalog.variant";
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

    // SKU and barcode keys are claimed only when the field is set, matching
    // partial unique indexes on the Postgres side.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        let mut keys = Vec::new();
        if let Some(sku) = &self.sku {
            keys.push(UniqueKey::per_tenant(
                "product_variants_tenant_sku_key",
                Some(self.tenant_id),
                sku,
            ));
        }
        if let Some(barcode) = &self.barcode {
            keys.push(UniqueKey::per_tenant(
                "product_variants_tenant_barcode_key",
                Some(self.tenant_id),
                barcode,
            ));
        }
        keys
    }
}
