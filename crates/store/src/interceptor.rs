//! Write stamping, defined once for all backends.
//!
//! Before a record reaches storage it passes through exactly one of these
//! two functions. They own the audit timestamps and the tenant assignment;
//! whatever the caller put in those fields is provisional and gets
//! overwritten here. Backends additionally refuse to move a stored row
//! between tenants on update.

use chrono::{DateTime, Utc};

use stockroom_core::{Record, Scope};

/// Stamp a record about to be inserted.
///
/// Under a tenant scope, tenant-filtered records are stamped with the
/// scope's tenant, overriding whatever the constructor carried. Under an
/// unrestricted scope (seeding, provisioning) the record keeps the tenant
/// it was constructed with.
pub fn stamp_insert<E>(scope: &Scope, record: &mut E, now: DateTime<Utc>)
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    if E::FILTERS.tenant {
        if let Some(tenant) = scope.tenant_id() {
            record.assign_tenant(tenant);
        }
    }
    let audit = record.audit_mut();
    audit.created_at = now;
    audit.updated_at = None;
}

/// Stamp a record about to replace a stored row.
///
/// Sets `updated_at` only. `created_at` and the tenant are restored from
/// the stored row by the backend, so neither can drift through an update.
pub fn stamp_update<E>(record: &mut E, now: DateTime<Utc>)
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    record.audit_mut().updated_at = Some(now);
}
