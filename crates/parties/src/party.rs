//! Customers and suppliers share one record shape; `kind` tells them apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{
    AuditStamp, DomainError, DomainResult, Entity, FilterSet, Record, TenantId, define_id,
};

define_id!(
    /// Identifier of a party (customer or supplier).
    PartyId
);

/// Which side of a trade the party sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Supplier,
}

impl core::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PartyKind::Customer => f.write_str("customer"),
            PartyKind::Supplier => f.write_str("supplier"),
        }
    }
}

/// External party a tenant trades with. No uniqueness constraints; two
/// customers may share a name. Deletion is soft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: PartyId,
    pub tenant_id: TenantId,
    pub kind: PartyKind,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub audit: AuditStamp,
}

impl Party {
    pub fn new(
        tenant_id: TenantId,
        kind: PartyKind,
        name: &str,
        email: Option<String>,
        phone: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("party name is required"));
        }
        Ok(Self {
            id: PartyId::new(),
            tenant_id,
            kind,
            name: name.to_string(),
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            phone: phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            deleted: false,
            deleted_at: None,
            audit: AuditStamp::now(),
        })
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &PartyId {
        &self.id
    }
}

impl Record for Party {
    const KIND: &'static str = "parties.party";
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required_and_trimmed() {
        assert!(Party::new(TenantId::new(), PartyKind::Customer, " ", None, None).is_err());
        let p =
            Party::new(TenantId::new(), PartyKind::Supplier, " Acme Ltd ", None, None).unwrap();
        assert_eq!(p.name, "Acme Ltd");
    }

    #[test]
    fn blank_contact_fields_collapse_to_none() {
        let p = Party::new(
            TenantId::new(),
            PartyKind::Customer,
            "Acme",
            Some("  ".into()),
            Some("".into()),
        )
        .unwrap();
        assert_eq!(p.email, None);
        assert_eq!(p.phone, None);
    }

    #[test]
    fn parties_claim_no_unique_keys() {
        let p = Party::new(TenantId::new(), PartyKind::Customer, "Acme", None, None).unwrap();
        assert!(p.unique_keys().is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PartyKind::Supplier).unwrap(),
            "\"supplier\""
        );
    }
}
