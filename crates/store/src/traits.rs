//! Store traits implemented by every backend.
//!
//! All tenant-filtered operations take an explicit [`Scope`]; there is no
//! ambient tenant. Named finders exist only where a flow needs them, and
//! each is implemented through the central narrowing predicate, never with
//! ad hoc tenant comparisons.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_auth::{
    RefreshToken, RefreshTokenId, Role, RoleAssignment, User, UserId,
};
use stockroom_catalog::{
    Category, CategoryId, Product, ProductId, ProductVariant, UnitId, UnitOfMeasure, VariantId,
};
use stockroom_core::{Scope, Tenant, TenantId};
use stockroom_inventory::StockMovement;
use stockroom_parties::{Party, PartyId, PartyKind};

use crate::error::StoreResult;

/// Global tenant registry. Tenants are unfiltered records; resolution and
/// provisioning are the only consumers.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn create_tenant(&self, tenant: Tenant) -> StoreResult<Tenant>;

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>>;

    /// The resolution lookup: `Some` only for an existing, active tenant.
    async fn get_active_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>>;

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>>;

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;

    async fn update_tenant(&self, tenant: Tenant) -> StoreResult<Tenant>;
}

/// Users, roles, role assignments, and refresh tokens.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn insert_user(&self, scope: &Scope, user: User) -> StoreResult<User>;

    async fn get_user(&self, scope: &Scope, id: UserId) -> StoreResult<Option<User>>;

    /// Lookup by normalized email within the scope's tenant.
    async fn find_user_by_email(&self, scope: &Scope, email: &str) -> StoreResult<Option<User>>;

    /// Does the scope's tenant have any users yet? Gates first registration.
    async fn tenant_has_users(&self, scope: &Scope) -> StoreResult<bool>;

    /// Case-insensitive find-or-create of a global role.
    async fn ensure_role(&self, name: &str) -> StoreResult<Role>;

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn insert_assignment(
        &self,
        scope: &Scope,
        assignment: RoleAssignment,
    ) -> StoreResult<RoleAssignment>;

    /// Names of the roles assigned to a user within the scope's tenant.
    async fn role_names_for_user(&self, scope: &Scope, user_id: UserId)
        -> StoreResult<Vec<String>>;

    async fn insert_refresh_token(
        &self,
        scope: &Scope,
        token: RefreshToken,
    ) -> StoreResult<RefreshToken>;

    /// Login path: revoke the user's active, unexpired tokens and insert
    /// the replacement in one atomic commit.
    async fn insert_refresh_token_replacing_active(
        &self,
        scope: &Scope,
        user_id: UserId,
        token: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<RefreshToken>;

    /// Exact-value lookup within the scope's tenant.
    async fn find_refresh_token(
        &self,
        scope: &Scope,
        value: &str,
    ) -> StoreResult<Option<RefreshToken>>;

    /// Refresh rotation: atomically revoke `presented` (only if still
    /// unrevoked) and insert `replacement`. Returns `None` when a
    /// concurrent rotation already consumed the presented token; exactly
    /// one caller wins.
    async fn rotate_refresh_token(
        &self,
        scope: &Scope,
        presented: RefreshTokenId,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>>;

    /// Logout path: revoke every unrevoked token of the user, expired ones
    /// included. Returns how many were revoked; zero is fine.
    async fn revoke_refresh_tokens_for_user(
        &self,
        scope: &Scope,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;
}

/// Categories, units of measure, products, and variants.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, scope: &Scope, category: Category) -> StoreResult<Category>;
    async fn get_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn list_categories(&self, scope: &Scope) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, scope: &Scope, category: Category) -> StoreResult<Category>;
    /// Hard delete. `false` when nothing visible matched; idempotent.
    async fn delete_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<bool>;

    async fn insert_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure>;
    async fn get_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<Option<UnitOfMeasure>>;
    async fn list_units(&self, scope: &Scope) -> StoreResult<Vec<UnitOfMeasure>>;
    async fn update_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure>;
    async fn delete_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<bool>;

    async fn insert_product(&self, scope: &Scope, product: Product) -> StoreResult<Product>;
    async fn get_product(&self, scope: &Scope, id: ProductId) -> StoreResult<Option<Product>>;
    async fn list_products(&self, scope: &Scope) -> StoreResult<Vec<Product>>;
    async fn update_product(&self, scope: &Scope, product: Product) -> StoreResult<Product>;
    /// Soft delete. `false` when nothing visible matched; idempotent.
    async fn soft_delete_product(&self, scope: &Scope, id: ProductId) -> StoreResult<bool>;
    /// Deletion-filter bypass: returns the row whether or not it is soft
    /// deleted. Tenant narrowing still applies in full.
    async fn get_product_any_state(
        &self,
        scope: &Scope,
        id: ProductId,
    ) -> StoreResult<Option<Product>>;

    async fn insert_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant>;
    async fn get_variant(
        &self,
        scope: &Scope,
        id: VariantId,
    ) -> StoreResult<Option<ProductVariant>>;
    async fn list_variants_of(
        &self,
        scope: &Scope,
        product_id: ProductId,
    ) -> StoreResult<Vec<ProductVariant>>;
    async fn update_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant>;
    async fn soft_delete_variant(&self, scope: &Scope, id: VariantId) -> StoreResult<bool>;
}

/// Customer and supplier directory.
#[async_trait]
pub trait PartyStore: Send + Sync {
    async fn insert_party(&self, scope: &Scope, party: Party) -> StoreResult<Party>;
    async fn get_party(&self, scope: &Scope, id: PartyId) -> StoreResult<Option<Party>>;
    async fn list_parties(&self, scope: &Scope, kind: PartyKind) -> StoreResult<Vec<Party>>;
    async fn update_party(&self, scope: &Scope, party: Party) -> StoreResult<Party>;
    async fn soft_delete_party(&self, scope: &Scope, id: PartyId) -> StoreResult<bool>;
}

/// Append-only movement journal.
#[async_trait]
pub trait MovementStore: Send + Sync {
    async fn append_movement(
        &self,
        scope: &Scope,
        movement: StockMovement,
    ) -> StoreResult<StockMovement>;

    /// Movements of the scope's tenant, newest first, optionally narrowed
    /// to one product.
    async fn list_movements(
        &self,
        scope: &Scope,
        product_id: Option<ProductId>,
    ) -> StoreResult<Vec<StockMovement>>;
}
