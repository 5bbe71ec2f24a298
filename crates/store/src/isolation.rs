//! The read-narrowing predicate, defined once for all backends.
//!
//! Whether a row is visible under a scope is decided here and nowhere else.
//! The in-memory backend filters rows through [`visible`] directly; the
//! Postgres backend compiles the same decision into WHERE clauses through
//! one shared builder (`postgres::push_visibility`), keyed off the identical
//! `FILTERS` declaration. A record type that wants tenant narrowing or
//! soft-delete exclusion declares it on its `Record` impl and every query
//! path picks it up; there is no per-call opt out.

use stockroom_core::{Record, Scope};

/// Does `record` belong to the scope's tenant?
///
/// Tenant-filtered records match a tenant scope only when their tenant id
/// equals the scope's; an unrestricted scope matches every tenant. Records
/// without the tenant filter always match. This is the narrowing that no
/// read may escape; the deletion filter below is the separately liftable
/// half (see `get_product_any_state` on the catalog store).
pub fn in_tenant<E>(scope: &Scope, record: &E) -> bool
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    if E::FILTERS.tenant {
        if let Some(tenant) = scope.tenant_id() {
            return record.tenant_id() == Some(tenant);
        }
    }
    true
}

/// Is `record` visible under `scope`?
///
/// Composing rules, applied in order:
/// - tenant-filtered records are visible under a tenant scope only when
///   their tenant matches; an unrestricted scope sees every tenant.
/// - soft-deletable records are never visible once deleted, under any
///   scope. Readers that legitimately need deleted rows go through a
///   dedicated any-state accessor, which lifts only this half and stays
///   tenant-narrowed.
pub fn visible<E>(scope: &Scope, record: &E) -> bool
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    if !in_tenant(scope, record) {
        return false;
    }
    if E::FILTERS.soft_delete && record.is_deleted() {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use stockroom_catalog::{Product, UnitId};
    use stockroom_core::{Scope, Tenant, TenantId};

    use super::*;

    fn product_for(tenant: TenantId, sku: &str) -> Product {
        Product::new(tenant, sku, "Anything", None, None, UnitId::new()).unwrap()
    }

    #[test]
    fn tenant_scope_hides_other_tenants() {
        let mine = TenantId::new();
        let theirs = TenantId::new();
        let scope = Scope::tenant(mine);

        assert!(visible(&scope, &product_for(mine, "A")));
        assert!(!visible(&scope, &product_for(theirs, "A")));
    }

    #[test]
    fn unrestricted_scope_sees_every_tenant() {
        let scope = Scope::unrestricted();
        assert!(visible(&scope, &product_for(TenantId::new(), "A")));
        assert!(visible(&scope, &product_for(TenantId::new(), "B")));
    }

    #[test]
    fn soft_deleted_rows_are_hidden_even_unrestricted() {
        let tenant = TenantId::new();
        let mut p = product_for(tenant, "A");
        stockroom_core::Record::mark_deleted(&mut p, Utc::now());

        assert!(!visible(&Scope::tenant(tenant), &p));
        assert!(!visible(&Scope::unrestricted(), &p));
    }

    #[test]
    fn deleted_rows_still_match_their_tenant() {
        let tenant = TenantId::new();
        let mut p = product_for(tenant, "A");
        stockroom_core::Record::mark_deleted(&mut p, Utc::now());

        assert!(in_tenant(&Scope::tenant(tenant), &p));
        assert!(!in_tenant(&Scope::tenant(TenantId::new()), &p));
    }

    #[test]
    fn unfiltered_records_ignore_the_scope() {
        // Tenants themselves are global records.
        let t = Tenant::new("Acme", None).unwrap();
        assert!(visible(&Scope::tenant(TenantId::new()), &t));
        assert!(visible(&Scope::unrestricted(), &t));
    }

    proptest! {
        /// Under a tenant scope, a visible tenant-filtered record always
        /// belongs to that tenant, regardless of how rows are distributed.
        #[test]
        fn visibility_never_crosses_tenants(
            owners in prop::collection::vec(0usize..4, 1..40),
            viewer in 0usize..4,
        ) {
            let tenants: Vec<TenantId> = (0..4).map(|_| TenantId::new()).collect();
            let rows: Vec<Product> = owners
                .iter()
                .enumerate()
                .map(|(i, &o)| product_for(tenants[o], &format!("SKU-{i}")))
                .collect();

            let scope = Scope::tenant(tenants[viewer]);
            for row in rows.iter().filter(|r| visible(&scope, *r)) {
                prop_assert_eq!(row.tenant_id, tenants[viewer]);
            }
            // And everything belonging to the viewer is visible.
            let mine = owners.iter().filter(|&&o| o == viewer).count();
            prop_assert_eq!(rows.iter().filter(|r| visible(&scope, *r)).count(), mine);
        }
    }
}
