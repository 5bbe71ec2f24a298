use stockroom_catalog::ProductId;
use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, define_id,
};

/// Longest accepted movement note.
pub const MAX_NOTE_LENGTH: usize = 256;

define_id!(
    /// Identifier of a stock movement.
    MovementId
);

/// One quantity change against a product. The sign of `quantity_delta`
/// carries direction: positive receives stock, negative issues it. Journal
/// rows are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub id: MovementId,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub quantity_delta: i64,
    pub note: Option<String>,
    pub audit: AuditStamp,
}

impl StockMovement {
    pub fn new(
        tenant_id: TenantId,
        product_id: ProductId,
        quantity_delta: i64,
        note: Option<String>,
    ) -> DomainResult<Self> {
        if quantity_delta == 0 {
            return Err(DomainError::validation("quantity delta cannot be zero"));
        }
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if let Some(n) = &note {
            if n.chars().count() > MAX_NOTE_LENGTH {
                return Err(DomainError::validation(format!(
                    "note cannot exceed {MAX_NOTE_LENGTH} characters"
                )));
            }
        }
        Ok(Self {
            id: MovementId::new(),
            tenant_id,
            product_id,
            quantity_delta,
            note,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for StockMovement {
    type Id = MovementId;

    fn id(&self) -> &MovementId {
        &self.id
    }
}

impl Record for StockMovement {
    const KIND: &'static str = "inventory.movement";
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
}
