//! Record capability registry.
//!
//! Every stored entity declares, at compile time, which read filters apply
//! to it ([`FilterSet`]) and which uniqueness constraints protect it
//! ([`UniqueKey`]). The store consults nothing else when narrowing reads or
//! admitting writes, so an entity type cannot silently opt out of tenant
//! isolation: the declaration is part of its [`Record`] impl and the whole
//! registry is auditable with one grep for `FILTERS`.

use chrono::{DateTime, Utc};

use crate::entity::{AuditStamp, Entity};
use crate::id::TenantId;

/// Read filters that apply to a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSet {
    /// Reads under a tenant scope only see rows of that tenant.
    pub tenant: bool,
    /// Reads exclude rows whose deleted flag is set.
    pub soft_delete: bool,
}

impl FilterSet {
    /// Global records: no narrowing at all (e.g. roles).
    pub const NONE: FilterSet = FilterSet {
        tenant: false,
        soft_delete: false,
    };

    /// Tenant narrowing only.
    pub const TENANT: FilterSet = FilterSet {
        tenant: true,
        soft_delete: false,
    };

    /// Tenant narrowing AND soft-delete exclusion (predicates compose).
    pub const TENANT_AND_SOFT_DELETE: FilterSet = FilterSet {
        tenant: true,
        soft_delete: true,
    };
}

/// One uniqueness constraint instance, as derived from a concrete record.
///
/// `constraint` names the index (stable across backends; the Postgres DDL
/// uses the same names) and `value` is the canonical key this record claims
/// under it. Tenant-qualified keys embed the tenant id in the value, which
/// is only correct after the write interceptor has stamped the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub constraint: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }

    /// Key qualified by tenant, for per-tenant uniqueness.
    pub fn per_tenant(
        constraint: &'static str,
        tenant_id: Option<TenantId>,
        value: impl AsRef<str>,
    ) -> Self {
        let tenant = tenant_id.map(|t| t.to_string()).unwrap_or_default();
        Self {
            constraint,
            value: format!("{tenant}:{}", value.as_ref()),
        }
    }
}

/// A storable record: identity, audit fields, and the filter declaration.
///
/// `tenant_id`/`assign_tenant` are meaningful only when `FILTERS.tenant` is
/// set; `is_deleted`/`mark_deleted` only when `FILTERS.soft_delete` is. The
/// defaults make the remaining combinations no-ops so the store can stay
/// generic, and the store never calls past what `FILTERS` declares.
pub trait Record: Entity + Clone + Send + Sync + 'static
where
    Self::Id: Copy + core::fmt::Display + Send + Sync,
{
    /// Stable record kind, e.g. `"identity.user"`. Used in spans and errors.
    const KIND: &'static str;

    /// Filter declaration for this record type.
    const FILTERS: FilterSet;

    fn audit(&self) -> &AuditStamp;

    fn audit_mut(&mut self) -> &mut AuditStamp;

    /// Tenant owning this row. `None` only for records without the tenant
    /// filter; a tenant-filtered record always carries its tenant.
    fn tenant_id(&self) -> Option<TenantId> {
        None
    }

    /// Stores the authoritative tenant id. Called by the write interceptor
    /// on insert when the record is tenant-filtered.
    fn assign_tenant(&mut self, _tenant_id: TenantId) {}

    fn is_deleted(&self) -> bool {
        false
    }

    /// Flags the row deleted. Called by the store's soft-delete path only.
    fn mark_deleted(&mut self, _at: DateTime<Utc>) {}

    /// Uniqueness constraints this record claims, computed post-stamping.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}
