//! In-memory backend: `RwLock`-guarded tables per record type.
//!
//! Default backend for tests and local development. Every operation routes
//! through the generic helpers below, which are the only code paths touching
//! the tables; the helpers in turn delegate narrowing to
//! [`visible`](crate::isolation::visible) and stamping to the interceptor,
//! so isolation behaves identically to the Postgres backend.

mod table;

use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_auth::{RefreshToken, RefreshTokenId, Role, RoleAssignment, User, UserId};
use stockroom_catalog::{
    Category, CategoryId, Product, ProductId, ProductVariant, UnitId, UnitOfMeasure, VariantId,
};
use stockroom_core::{Record, Scope, Tenant, TenantId};
use stockroom_inventory::StockMovement;
use stockroom_parties::{Party, PartyId, PartyKind};

use crate::error::{StoreError, StoreResult};
use crate::interceptor::{stamp_insert, stamp_update};
use crate::isolation::{in_tenant, visible};
use crate::traits::{CatalogStore, IdentityStore, MovementStore, PartyStore, TenantDirectory};

use table::MemTable;

/// In-memory store over all record types.
#[derive(Default)]
pub struct MemoryStore {
    tenants: RwLock<MemTable<Tenant>>,
    users: RwLock<MemTable<User>>,
    roles: RwLock<MemTable<Role>>,
    assignments: RwLock<MemTable<RoleAssignment>>,
    refresh_tokens: RwLock<MemTable<RefreshToken>>,
    categories: RwLock<MemTable<Category>>,
    units: RwLock<MemTable<UnitOfMeasure>>,
    products: RwLock<MemTable<Product>>,
    variants: RwLock<MemTable<ProductVariant>>,
    parties: RwLock<MemTable<Party>>,
    movements: RwLock<MemTable<StockMovement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_lock<E>(table: &RwLock<MemTable<E>>) -> StoreResult<RwLockReadGuard<'_, MemTable<E>>>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    table
        .read()
        .map_err(|_| StoreError::backend("lock poisoned"))
}

fn write_lock<E>(table: &RwLock<MemTable<E>>) -> StoreResult<RwLockWriteGuard<'_, MemTable<E>>>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    table
        .write()
        .map_err(|_| StoreError::backend("lock poisoned"))
}

fn insert_scoped<E>(table: &RwLock<MemTable<E>>, scope: &Scope, mut record: E) -> StoreResult<E>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    stamp_insert(scope, &mut record, Utc::now());
    write_lock(table)?.insert(record.clone())?;
    Ok(record)
}

fn get_scoped<E>(table: &RwLock<MemTable<E>>, scope: &Scope, id: E::Id) -> StoreResult<Option<E>>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    Ok(read_lock(table)?
        .get(&id)
        .filter(|r| visible(scope, *r))
        .cloned())
}

/// Like [`get_scoped`] but without the deletion filter; tenant narrowing
/// still applies.
fn get_scoped_any_state<E>(
    table: &RwLock<MemTable<E>>,
    scope: &Scope,
    id: E::Id,
) -> StoreResult<Option<E>>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    Ok(read_lock(table)?
        .get(&id)
        .filter(|r| in_tenant(scope, *r))
        .cloned())
}

/// Visible rows matching `pred`, in insertion order (v7 ids sort by time).
fn list_scoped<E, F>(table: &RwLock<MemTable<E>>, scope: &Scope, pred: F) -> StoreResult<Vec<E>>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
    F: Fn(&E) -> bool,
{
    let guard = read_lock(table)?;
    let mut rows: Vec<E> = guard
        .values()
        .filter(|r| visible(scope, *r) && pred(r))
        .cloned()
        .collect();
    rows.sort_by_key(|r| r.id().to_string());
    Ok(rows)
}

/// Replace a visible row, restoring the fields an update may never change:
/// `created_at` and the owning tenant.
fn update_scoped<E>(table: &RwLock<MemTable<E>>, scope: &Scope, mut record: E) -> StoreResult<E>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    let mut guard = write_lock(table)?;
    let existing = guard
        .get(record.id())
        .filter(|r| visible(scope, *r))
        .cloned()
        .ok_or(StoreError::NotFound)?;

    record.audit_mut().created_at = existing.audit().created_at;
    if let Some(tenant) = existing.tenant_id() {
        record.assign_tenant(tenant);
    }
    stamp_update(&mut record, Utc::now());
    guard.replace(record.clone())?;
    Ok(record)
}

/// Flag a visible row deleted. `false` when nothing visible matched, which
/// makes repeated deletes no-ops.
fn soft_delete_scoped<E>(
    table: &RwLock<MemTable<E>>,
    scope: &Scope,
    id: E::Id,
) -> StoreResult<bool>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    let mut guard = write_lock(table)?;
    let Some(mut row) = guard.get(&id).filter(|r| visible(scope, *r)).cloned() else {
        return Ok(false);
    };
    let now = Utc::now();
    row.mark_deleted(now);
    row.audit_mut().updated_at = Some(now);
    guard.replace(row)?;
    Ok(true)
}

fn hard_delete_scoped<E>(
    table: &RwLock<MemTable<E>>,
    scope: &Scope,
    id: E::Id,
) -> StoreResult<bool>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    let mut guard = write_lock(table)?;
    let matched = guard.get(&id).map(|r| visible(scope, r)).unwrap_or(false);
    if !matched {
        return Ok(false);
    }
    guard.remove(&id);
    Ok(true)
}

#[async_trait]
impl TenantDirectory for MemoryStore {
    async fn create_tenant(&self, tenant: Tenant) -> StoreResult<Tenant> {
        insert_scoped(&self.tenants, &Scope::unrestricted(), tenant)
    }

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        get_scoped(&self.tenants, &Scope::unrestricted(), id)
    }

    async fn get_active_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        Ok(self.get_tenant(id).await?.filter(|t| t.active))
    }

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>> {
        Ok(list_scoped(&self.tenants, &Scope::unrestricted(), |t| t.name == name)?
            .into_iter()
            .next())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        list_scoped(&self.tenants, &Scope::unrestricted(), |_| true)
    }

    async fn update_tenant(&self, tenant: Tenant) -> StoreResult<Tenant> {
        update_scoped(&self.tenants, &Scope::unrestricted(), tenant)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, scope: &Scope, user: User) -> StoreResult<User> {
        insert_scoped(&self.users, scope, user)
    }

    async fn get_user(&self, scope: &Scope, id: UserId) -> StoreResult<Option<User>> {
        get_scoped(&self.users, scope, id)
    }

    async fn find_user_by_email(&self, scope: &Scope, email: &str) -> StoreResult<Option<User>> {
        Ok(list_scoped(&self.users, scope, |u| u.email == email)?
            .into_iter()
            .next())
    }

    async fn tenant_has_users(&self, scope: &Scope) -> StoreResult<bool> {
        Ok(read_lock(&self.users)?.values().any(|u| visible(scope, u)))
    }

    async fn ensure_role(&self, name: &str) -> StoreResult<Role> {
        // Find-or-create under one write lock so concurrent callers cannot
        // both miss and insert.
        let mut guard = write_lock(&self.roles)?;
        if let Some(existing) = guard
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned()
        {
            return Ok(existing);
        }
        let mut role = Role::new(name).map_err(|e| StoreError::backend(e.to_string()))?;
        stamp_insert(&Scope::unrestricted(), &mut role, Utc::now());
        guard.insert(role.clone())?;
        Ok(role)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        list_scoped(&self.roles, &Scope::unrestricted(), |_| true)
    }

    async fn insert_assignment(
        &self,
        scope: &Scope,
        assignment: RoleAssignment,
    ) -> StoreResult<RoleAssignment> {
        insert_scoped(&self.assignments, scope, assignment)
    }

    async fn role_names_for_user(
        &self,
        scope: &Scope,
        user_id: UserId,
    ) -> StoreResult<Vec<String>> {
        let role_ids: Vec<_> = list_scoped(&self.assignments, scope, |a| a.user_id == user_id)?
            .into_iter()
            .map(|a| a.role_id)
            .collect();

        let guard = read_lock(&self.roles)?;
        let mut names: Vec<String> = role_ids
            .into_iter()
            .filter_map(|id| guard.get(&id).map(|r| r.name.clone()))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn insert_refresh_token(
        &self,
        scope: &Scope,
        token: RefreshToken,
    ) -> StoreResult<RefreshToken> {
        insert_scoped(&self.refresh_tokens, scope, token)
    }

    async fn insert_refresh_token_replacing_active(
        &self,
        scope: &Scope,
        user_id: UserId,
        mut token: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<RefreshToken> {
        // One write lock covers the revocations and the insert; a reader
        // never observes the user with zero active tokens mid-login.
        let mut guard = write_lock(&self.refresh_tokens)?;
        let active: Vec<RefreshTokenId> = guard
            .values()
            .filter(|t| {
                visible(scope, *t)
                    && t.user_id == user_id
                    && t.revoked_at.is_none()
                    && t.expires_at > now
            })
            .map(|t| t.id)
            .collect();
        for id in active {
            if let Some(mut row) = guard.get(&id).cloned() {
                row.revoke(now);
                row.audit_mut().updated_at = Some(now);
                guard.replace(row)?;
            }
        }
        stamp_insert(scope, &mut token, now);
        guard.insert(token.clone())?;
        Ok(token)
    }

    async fn find_refresh_token(
        &self,
        scope: &Scope,
        value: &str,
    ) -> StoreResult<Option<RefreshToken>> {
        Ok(list_scoped(&self.refresh_tokens, scope, |t| t.token == value)?
            .into_iter()
            .next())
    }

    async fn rotate_refresh_token(
        &self,
        scope: &Scope,
        presented: RefreshTokenId,
        mut replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut guard = write_lock(&self.refresh_tokens)?;
        let Some(current) = guard.get(&presented).filter(|t| visible(scope, *t)).cloned()
        else {
            return Ok(None);
        };
        if current.revoked_at.is_some() {
            // A concurrent rotation won; this caller loses.
            return Ok(None);
        }
        let mut revoked = current;
        revoked.revoke(now);
        revoked.audit_mut().updated_at = Some(now);
        guard.replace(revoked)?;

        stamp_insert(scope, &mut replacement, now);
        guard.insert(replacement.clone())?;
        Ok(Some(replacement))
    }

    async fn revoke_refresh_tokens_for_user(
        &self,
        scope: &Scope,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut guard = write_lock(&self.refresh_tokens)?;
        let unrevoked: Vec<RefreshTokenId> = guard
            .values()
            .filter(|t| visible(scope, *t) && t.user_id == user_id && t.revoked_at.is_none())
            .map(|t| t.id)
            .collect();
        let count = unrevoked.len() as u64;
        for id in unrevoked {
            if let Some(mut row) = guard.get(&id).cloned() {
                row.revoke(now);
                row.audit_mut().updated_at = Some(now);
                guard.replace(row)?;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_category(&self, scope: &Scope, category: Category) -> StoreResult<Category> {
        insert_scoped(&self.categories, scope, category)
    }

    async fn get_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<Option<Category>> {
        get_scoped(&self.categories, scope, id)
    }

    async fn list_categories(&self, scope: &Scope) -> StoreResult<Vec<Category>> {
        list_scoped(&self.categories, scope, |_| true)
    }

    async fn update_category(&self, scope: &Scope, category: Category) -> StoreResult<Category> {
        update_scoped(&self.categories, scope, category)
    }

    async fn delete_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<bool> {
        hard_delete_scoped(&self.categories, scope, id)
    }

    async fn insert_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure> {
        insert_scoped(&self.units, scope, unit)
    }

    async fn get_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<Option<UnitOfMeasure>> {
        get_scoped(&self.units, scope, id)
    }

    async fn list_units(&self, scope: &Scope) -> StoreResult<Vec<UnitOfMeasure>> {
        list_scoped(&self.units, scope, |_| true)
    }

    async fn update_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure> {
        update_scoped(&self.units, scope, unit)
    }

    async fn delete_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<bool> {
        hard_delete_scoped(&self.units, scope, id)
    }

    async fn insert_product(&self, scope: &Scope, product: Product) -> StoreResult<Product> {
        insert_scoped(&self.products, scope, product)
    }

    async fn get_product(&self, scope: &Scope, id: ProductId) -> StoreResult<Option<Product>> {
        get_scoped(&self.products, scope, id)
    }

    async fn list_products(&self, scope: &Scope) -> StoreResult<Vec<Product>> {
        list_scoped(&self.products, scope, |_| true)
    }

    async fn update_product(&self, scope: &Scope, product: Product) -> StoreResult<Product> {
        update_scoped(&self.products, scope, product)
    }

    async fn soft_delete_product(&self, scope: &Scope, id: ProductId) -> StoreResult<bool> {
        soft_delete_scoped(&self.products, scope, id)
    }

    async fn get_product_any_state(
        &self,
        scope: &Scope,
        id: ProductId,
    ) -> StoreResult<Option<Product>> {
        get_scoped_any_state(&self.products, scope, id)
    }

    async fn insert_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant> {
        insert_scoped(&self.variants, scope, variant)
    }

    async fn get_variant(
        &self,
        scope: &Scope,
        id: VariantId,
    ) -> StoreResult<Option<ProductVariant>> {
        get_scoped(&self.variants, scope, id)
    }

    async fn list_variants_of(
        &self,
        scope: &Scope,
        product_id: ProductId,
    ) -> StoreResult<Vec<ProductVariant>> {
        list_scoped(&self.variants, scope, |v| v.product_id == product_id)
    }

    async fn update_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant> {
        update_scoped(&self.variants, scope, variant)
    }

    async fn soft_delete_variant(&self, scope: &Scope, id: VariantId) -> StoreResult<bool> {
        soft_delete_scoped(&self.variants, scope, id)
    }
}

#[async_trait]
impl PartyStore for MemoryStore {
    async fn insert_party(&self, scope: &Scope, party: Party) -> StoreResult<Party> {
        insert_scoped(&self.parties, scope, party)
    }

    async fn get_party(&self, scope: &Scope, id: PartyId) -> StoreResult<Option<Party>> {
        get_scoped(&self.parties, scope, id)
    }

    async fn list_parties(&self, scope: &Scope, kind: PartyKind) -> StoreResult<Vec<Party>> {
        list_scoped(&self.parties, scope, |p| p.kind == kind)
    }

    async fn update_party(&self, scope: &Scope, party: Party) -> StoreResult<Party> {
        update_scoped(&self.parties, scope, party)
    }

    async fn soft_delete_party(&self, scope: &Scope, id: PartyId) -> StoreResult<bool> {
        soft_delete_scoped(&self.parties, scope, id)
    }
}

#[async_trait]
impl MovementStore for MemoryStore {
    async fn append_movement(
        &self,
        scope: &Scope,
        movement: StockMovement,
    ) -> StoreResult<StockMovement> {
        insert_scoped(&self.movements, scope, movement)
    }

    async fn list_movements(
        &self,
        scope: &Scope,
        product_id: Option<ProductId>,
    ) -> StoreResult<Vec<StockMovement>> {
        let mut rows = list_scoped(&self.movements, scope, |m| {
            product_id.map(|p| m.product_id == p).unwrap_or(true)
        })?;
        rows.reverse();
        Ok(rows)
    }
}
