//! Units of measure ("EA", "KG", "L").

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, UniqueKey,
    define_id,
};

define_id!(
    /// Identifier of a unit of measure.
    UnitId
);

/// Unit a product quantity is expressed in. Code is unique within a tenant;
/// `precision` is the number of decimal places quantities in this unit use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfMeasure {
    pub id: UnitId,
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub precision: i16,
    pub audit: AuditStamp,
}

impl UnitOfMeasure {
    pub fn new(tenant_id: TenantId, code: &str, name: &str, precision: i16) -> DomainResult<Self> {
        let code = code.trim();
        let name = name.trim();
        if code.is_empty() {
            return Err(DomainError::validation("unit code is required"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("unit name is required"));
        }
        if precision < 0 {
            return Err(DomainError::validation("precision cannot be negative"));
        }
        Ok(Self {
            id: UnitId::new(),
            tenant_id,
            code: code.to_string(),
            name: name.to_string(),
            precision,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for UnitOfMeasure {
    type Id = UnitId;

    fn id(&self) -> &UnitId {
        &self.id
    }
}

impl Record for UnitOfMeasure {
    const KIND: &'static str = "catalog.unit";
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
            "uoms_tenant_code_key",
            Some(self.tenant_id),
            &self.code,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_name_are_required() {
        assert!(UnitOfMeasure::new(TenantId::new(), "", "Each", 0).is_err());
        assert!(UnitOfMeasure::new(TenantId::new(), "EA", " ", 0).is_err());
    }

    #[test]
    fn negative_precision_is_rejected() {
        let err = UnitOfMeasure::new(TenantId::new(), "KG", "Kilogram", -1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn code_key_is_scoped_to_the_tenant() {
        let tenant = TenantId::new();
        let u = UnitOfMeasure::new(tenant, " EA ", "Each", 0).unwrap();
        assert_eq!(u.code, "EA");
        assert_eq!(u.unique_keys()[0].constraint, "uoms_tenant_code_key");
        assert_eq!(u.unique_keys()[0].value, format!("{tenant}:EA"));
    }
}
