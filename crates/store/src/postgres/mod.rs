//! Postgres backend (feature `postgres`).
//!
//! Same contracts as the in-memory backend, with the narrowing predicate
//! compiled into WHERE clauses by [`push_visibility`] — the one place scope
//! handling exists on this side. Uniqueness is enforced by the named
//! constraints in [`SCHEMA`]; a `23505` comes back as
//! [`StoreError::UniqueViolation`] carrying that constraint name, so both
//! backends report conflicts identically.
//!
//! Updates never include `tenant_id`, `created_at`, or the deletion flags
//! in their SET lists; a stored row cannot change owner or resurrect
//! through the update path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use stockroom_auth::{
    RefreshToken, RefreshTokenId, Role, RoleAssignment, RoleId, User, UserId,
};
use stockroom_catalog::{
    Category, CategoryId, Product, ProductId, ProductVariant, UnitId, UnitOfMeasure, VariantId,
};
use stockroom_core::{AuditStamp, Record, Scope, Tenant, TenantId};
use stockroom_inventory::{MovementId, StockMovement};
use stockroom_parties::{Party, PartyId, PartyKind};

use crate::error::{StoreError, StoreResult};
use crate::interceptor::{stamp_insert, stamp_update};
use crate::traits::{CatalogStore, IdentityStore, MovementStore, PartyStore, TenantDirectory};

/// Schema statements, run in order; every one is idempotent. Constraint
/// names here are the ones `UniqueKey` claims and clients see mapped in
/// error messages, so they must not drift.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tenants (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        domain TEXT,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        full_name TEXT,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT users_tenant_email_key UNIQUE (tenant_id, email)
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT roles_name_key UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS role_assignments (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        role_id UUID NOT NULL,
        tenant_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT role_assignments_user_role_tenant_key UNIQUE (user_id, role_id, tenant_id)
    )",
    "CREATE TABLE IF NOT EXISTS refresh_tokens (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        user_id UUID NOT NULL,
        token TEXT NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL,
        revoked_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT refresh_tokens_token_key UNIQUE (token)
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        name TEXT NOT NULL,
        parent_id UUID,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT categories_tenant_name_key UNIQUE (tenant_id, name)
    )",
    "CREATE TABLE IF NOT EXISTS uoms (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        code TEXT NOT NULL,
        name TEXT NOT NULL,
        precision SMALLINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT uoms_tenant_code_key UNIQUE (tenant_id, code)
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        sku TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        category_id UUID,
        unit_id UUID NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CONSTRAINT products_tenant_sku_key UNIQUE (tenant_id, sku)
    )",
    "CREATE TABLE IF NOT EXISTS product_variants (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        product_id UUID NOT NULL,
        sku TEXT,
        barcode TEXT,
        attributes JSONB,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS product_variants_tenant_sku_key
        ON product_variants (tenant_id, sku) WHERE sku IS NOT NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS product_variants_tenant_barcode_key
        ON product_variants (tenant_id, barcode) WHERE barcode IS NOT NULL",
    "CREATE TABLE IF NOT EXISTS parties (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        kind TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS stock_movements (
        id UUID PRIMARY KEY,
        tenant_id UUID NOT NULL,
        product_id UUID NOT NULL,
        quantity_delta BIGINT NOT NULL,
        note TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )",
];

/// Postgres-backed store over all record types.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StoreError::backend(format!("connect: {e}")))?;
        Ok(Self { pool })
    }

    /// Create any missing tables and indexes.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                StoreError::UniqueViolation { constraint }
            } else {
                StoreError::backend(format!(
                    "database error in {operation}: {}",
                    db_err.message()
                ))
            }
        }
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

/// Tenant half of the scope narrowing; the counterpart of the in-memory
/// `in_tenant`. Appended on its own only by the any-state accessors.
fn push_tenant_filter<E>(qb: &mut QueryBuilder<'_, Postgres>, scope: &Scope)
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    if E::FILTERS.tenant {
        if let Some(tenant) = scope.tenant_id() {
            qb.push(" AND tenant_id = ");
            qb.push_bind(*tenant.as_uuid());
        }
    }
}

/// Append the scope's narrowing to a WHERE clause already containing at
/// least one predicate. The counterpart of the in-memory `visible`; keyed
/// off the same `FILTERS` declaration.
fn push_visibility<E>(qb: &mut QueryBuilder<'_, Postgres>, scope: &Scope)
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    push_tenant_filter::<E>(qb, scope);
    if E::FILTERS.soft_delete {
        qb.push(" AND is_deleted = FALSE");
    }
}

const TENANT_COLS: &str = "id, name, domain, active, created_at, updated_at";
const USER_COLS: &str = "id, tenant_id, email, password_hash, full_name, active, created_at, updated_at";
const ROLE_COLS: &str = "id, name, created_at, updated_at";
const ASSIGNMENT_COLS: &str = "id, user_id, role_id, tenant_id, created_at, updated_at";
const REFRESH_COLS: &str =
    "id, tenant_id, user_id, token, expires_at, revoked_at, created_at, updated_at";
const CATEGORY_COLS: &str = "id, tenant_id, name, parent_id, created_at, updated_at";
const UOM_COLS: &str = "id, tenant_id, code, name, precision, created_at, updated_at";
const PRODUCT_COLS: &str = "id, tenant_id, sku, name, description, category_id, unit_id, active, is_deleted, deleted_at, created_at, updated_at";
const VARIANT_COLS: &str = "id, tenant_id, product_id, sku, barcode, attributes, active, is_deleted, deleted_at, created_at, updated_at";
const PARTY_COLS: &str =
    "id, tenant_id, kind, name, email, phone, is_deleted, deleted_at, created_at, updated_at";
const MOVEMENT_COLS: &str = "id, tenant_id, product_id, quantity_delta, note, created_at, updated_at";

#[derive(FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    domain: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(r: TenantRow) -> Self {
        Tenant {
            id: TenantId::from_uuid(r.id),
            name: r.name,
            domain: r.domain,
            active: r.active,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: UserId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            email: r.email,
            password_hash: r.password_hash,
            full_name: r.full_name,
            active: r.active,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RoleRow> for Role {
    fn from(r: RoleRow) -> Self {
        Role {
            id: RoleId::from_uuid(r.id),
            name: r.name,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct RefreshRow {
    id: Uuid,
    tenant_id: Uuid,
    user_id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RefreshRow> for RefreshToken {
    fn from(r: RefreshRow) -> Self {
        RefreshToken {
            id: RefreshTokenId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            user_id: UserId::from_uuid(r.user_id),
            token: r.token,
            expires_at: r.expires_at,
            revoked_at: r.revoked_at,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: CategoryId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            name: r.name,
            parent_id: r.parent_id.map(CategoryId::from_uuid),
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct UomRow {
    id: Uuid,
    tenant_id: Uuid,
    code: String,
    name: String,
    precision: i16,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UomRow> for UnitOfMeasure {
    fn from(r: UomRow) -> Self {
        UnitOfMeasure {
            id: UnitId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            code: r.code,
            name: r.name,
            precision: r.precision,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    tenant_id: Uuid,
    sku: String,
    name: String,
    description: Option<String>,
    category_id: Option<Uuid>,
    unit_id: Uuid,
    active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            sku: r.sku,
            name: r.name,
            description: r.description,
            category_id: r.category_id.map(CategoryId::from_uuid),
            unit_id: UnitId::from_uuid(r.unit_id),
            active: r.active,
            deleted: r.is_deleted,
            deleted_at: r.deleted_at,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct VariantRow {
    id: Uuid,
    tenant_id: Uuid,
    product_id: Uuid,
    sku: Option<String>,
    barcode: Option<String>,
    attributes: Option<serde_json::Value>,
    active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<VariantRow> for ProductVariant {
    fn from(r: VariantRow) -> Self {
        ProductVariant {
            id: VariantId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            product_id: ProductId::from_uuid(r.product_id),
            sku: r.sku,
            barcode: r.barcode,
            attributes: r.attributes,
            active: r.active,
            deleted: r.is_deleted,
            deleted_at: r.deleted_at,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[derive(FromRow)]
struct PartyRow {
    id: Uuid,
    tenant_id: Uuid,
    kind: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl PartyRow {
    fn into_party(self) -> StoreResult<Party> {
        let kind = match self.kind.as_str() {
            "customer" => PartyKind::Customer,
            "supplier" => PartyKind::Supplier,
            other => {
                return Err(StoreError::backend(format!("unknown party kind: {other}")));
            }
        };
        Ok(Party {
            id: PartyId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            kind,
            name: self.name,
            email: self.email,
            phone: self.phone,
            deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            audit: AuditStamp {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        })
    }
}

#[derive(FromRow)]
struct MovementRow {
    id: Uuid,
    tenant_id: Uuid,
    product_id: Uuid,
    quantity_delta: i64,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<MovementRow> for StockMovement {
    fn from(r: MovementRow) -> Self {
        StockMovement {
            id: MovementId::from_uuid(r.id),
            tenant_id: TenantId::from_uuid(r.tenant_id),
            product_id: ProductId::from_uuid(r.product_id),
            quantity_delta: r.quantity_delta,
            note: r.note,
            audit: AuditStamp {
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

#[async_trait]
impl TenantDirectory for PostgresStore {
    async fn create_tenant(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut tenant = tenant;
        stamp_insert(&Scope::unrestricted(), &mut tenant, Utc::now());
        sqlx::query(
            "INSERT INTO tenants (id, name, domain, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*tenant.id.as_uuid())
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(tenant.active)
        .bind(tenant.audit.created_at)
        .bind(tenant.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tenant", e))?;
        Ok(tenant)
    }

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLS} FROM tenants WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_tenant", e))?;
        Ok(row.map(Into::into))
    }

    async fn get_active_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLS} FROM tenants WHERE id = $1 AND active = TRUE"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_active_tenant", e))?;
        Ok(row.map(Into::into))
    }

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLS} FROM tenants WHERE name = $1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_tenant_by_name", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLS} FROM tenants ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tenants", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_tenant(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut tenant = tenant;
        stamp_update(&mut tenant, Utc::now());
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "UPDATE tenants SET name = $2, domain = $3, active = $4, updated_at = $5
             WHERE id = $1 RETURNING {TENANT_COLS}"
        ))
        .bind(*tenant.id.as_uuid())
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(tenant.active)
        .bind(tenant.audit.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_tenant", e))?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl IdentityStore for PostgresStore {
    async fn insert_user(&self, scope: &Scope, user: User) -> StoreResult<User> {
        let mut user = user;
        stamp_insert(scope, &mut user, Utc::now());
        sqlx::query(
            "INSERT INTO users (id, tenant_id, email, password_hash, full_name, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*user.id.as_uuid())
        .bind(*user.tenant_id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.active)
        .bind(user.audit.created_at)
        .bind(user.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(user)
    }

    async fn get_user(&self, scope: &Scope, id: UserId) -> StoreResult<Option<User>> {
        let mut qb = QueryBuilder::new(format!("SELECT {USER_COLS} FROM users WHERE id = "));
        qb.push_bind(*id.as_uuid());
        push_visibility::<User>(&mut qb, scope);
        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_email(&self, scope: &Scope, email: &str) -> StoreResult<Option<User>> {
        let mut qb = QueryBuilder::new(format!("SELECT {USER_COLS} FROM users WHERE email = "));
        qb.push_bind(email.to_string());
        push_visibility::<User>(&mut qb, scope);
        qb.push(" ORDER BY id LIMIT 1");
        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        Ok(row.map(Into::into))
    }

    async fn tenant_has_users(&self, scope: &Scope) -> StoreResult<bool> {
        let mut qb = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM users WHERE 1 = 1");
        push_visibility::<User>(&mut qb, scope);
        qb.push(")");
        let exists: bool = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("tenant_has_users", e))?;
        Ok(exists)
    }

    async fn ensure_role(&self, name: &str) -> StoreResult<Role> {
        if let Some(existing) = find_role_ci(&self.pool, name).await? {
            return Ok(existing);
        }
        let mut role = Role::new(name).map_err(|e| StoreError::backend(e.to_string()))?;
        stamp_insert(&Scope::unrestricted(), &mut role, Utc::now());
        let inserted = sqlx::query(
            "INSERT INTO roles (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(*role.id.as_uuid())
        .bind(&role.name)
        .bind(role.audit.created_at)
        .bind(role.audit.updated_at)
        .execute(&self.pool)
        .await;
        match inserted {
            Ok(_) => Ok(role),
            // Concurrent creator won; use theirs.
            Err(e) => match map_sqlx_error("ensure_role", e) {
                StoreError::UniqueViolation { .. } => find_role_ci(&self.pool, name)
                    .await?
                    .ok_or(StoreError::NotFound),
                other => Err(other),
            },
        }
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows =
            sqlx::query_as::<_, RoleRow>(&format!("SELECT {ROLE_COLS} FROM roles ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_roles", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_assignment(
        &self,
        scope: &Scope,
        assignment: RoleAssignment,
    ) -> StoreResult<RoleAssignment> {
        let mut assignment = assignment;
        stamp_insert(scope, &mut assignment, Utc::now());
        sqlx::query(
            "INSERT INTO role_assignments (id, user_id, role_id, tenant_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*assignment.id.as_uuid())
        .bind(*assignment.user_id.as_uuid())
        .bind(*assignment.role_id.as_uuid())
        .bind(*assignment.tenant_id.as_uuid())
        .bind(assignment.audit.created_at)
        .bind(assignment.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_assignment", e))?;
        Ok(assignment)
    }

    async fn role_names_for_user(
        &self,
        scope: &Scope,
        user_id: UserId,
    ) -> StoreResult<Vec<String>> {
        let mut qb = QueryBuilder::new(
            "SELECT role_id FROM role_assignments WHERE user_id = ",
        );
        qb.push_bind(*user_id.as_uuid());
        push_visibility::<RoleAssignment>(&mut qb, scope);
        let role_ids: Vec<Uuid> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_names_for_user", e))?;
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM roles WHERE id = ANY($1) ORDER BY name")
                .bind(&role_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("role_names_for_user", e))?;
        Ok(names)
    }

    async fn insert_refresh_token(
        &self,
        scope: &Scope,
        token: RefreshToken,
    ) -> StoreResult<RefreshToken> {
        let mut token = token;
        stamp_insert(scope, &mut token, Utc::now());
        insert_refresh_row(&self.pool, &token).await?;
        Ok(token)
    }

    async fn insert_refresh_token_replacing_active(
        &self,
        scope: &Scope,
        user_id: UserId,
        token: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<RefreshToken> {
        let mut token = token;
        stamp_insert(scope, &mut token, now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("replace_active_begin", e))?;

        let mut qb = QueryBuilder::new("UPDATE refresh_tokens SET revoked_at = ");
        qb.push_bind(now);
        qb.push(", updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE user_id = ");
        qb.push_bind(*user_id.as_uuid());
        qb.push(" AND revoked_at IS NULL AND expires_at > ");
        qb.push_bind(now);
        push_visibility::<RefreshToken>(&mut qb, scope);
        qb.build()
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_active_revoke", e))?;

        insert_refresh_row(&mut *tx, &token).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("replace_active_commit", e))?;
        Ok(token)
    }

    async fn find_refresh_token(
        &self,
        scope: &Scope,
        value: &str,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {REFRESH_COLS} FROM refresh_tokens WHERE token = "
        ));
        qb.push_bind(value.to_string());
        push_visibility::<RefreshToken>(&mut qb, scope);
        let row = qb
            .build_query_as::<RefreshRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_refresh_token", e))?;
        Ok(row.map(Into::into))
    }

    async fn rotate_refresh_token(
        &self,
        scope: &Scope,
        presented: RefreshTokenId,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut replacement = replacement;
        stamp_insert(scope, &mut replacement, now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("rotate_begin", e))?;

        // The conditional revoke is the race arbiter: of two concurrent
        // rotations of one token, only one UPDATE matches a row.
        let mut qb = QueryBuilder::new("UPDATE refresh_tokens SET revoked_at = ");
        qb.push_bind(now);
        qb.push(", updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE id = ");
        qb.push_bind(*presented.as_uuid());
        qb.push(" AND revoked_at IS NULL");
        push_visibility::<RefreshToken>(&mut qb, scope);
        let revoked = qb
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("rotate_revoke", e))?;
        if revoked.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rotate_rollback", e))?;
            return Ok(None);
        }

        insert_refresh_row(&mut *tx, &replacement).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("rotate_commit", e))?;
        Ok(Some(replacement))
    }

    async fn revoke_refresh_tokens_for_user(
        &self,
        scope: &Scope,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("UPDATE refresh_tokens SET revoked_at = ");
        qb.push_bind(now);
        qb.push(", updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE user_id = ");
        qb.push_bind(*user_id.as_uuid());
        qb.push(" AND revoked_at IS NULL");
        push_visibility::<RefreshToken>(&mut qb, scope);
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke_refresh_tokens_for_user", e))?;
        Ok(result.rows_affected())
    }
}

async fn find_role_ci(pool: &PgPool, name: &str) -> StoreResult<Option<Role>> {
    let row = sqlx::query_as::<_, RoleRow>(&format!(
        "SELECT {ROLE_COLS} FROM roles WHERE lower(name) = lower($1)"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_sqlx_error("ensure_role", e))?;
    Ok(row.map(Into::into))
}

async fn insert_refresh_row<'e, E>(executor: E, token: &RefreshToken) -> StoreResult<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO refresh_tokens (id, tenant_id, user_id, token, expires_at, revoked_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(*token.id.as_uuid())
    .bind(*token.tenant_id.as_uuid())
    .bind(*token.user_id.as_uuid())
    .bind(&token.token)
    .bind(token.expires_at)
    .bind(token.revoked_at)
    .bind(token.audit.created_at)
    .bind(token.audit.updated_at)
    .execute(executor)
    .await
    .map_err(|e| map_sqlx_error("insert_refresh_token", e))?;
    Ok(())
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_category(&self, scope: &Scope, category: Category) -> StoreResult<Category> {
        let mut category = category;
        stamp_insert(scope, &mut category, Utc::now());
        sqlx::query(
            "INSERT INTO categories (id, tenant_id, name, parent_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*category.id.as_uuid())
        .bind(*category.tenant_id.as_uuid())
        .bind(&category.name)
        .bind(category.parent_id.map(|p| *p.as_uuid()))
        .bind(category.audit.created_at)
        .bind(category.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(category)
    }

    async fn get_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<Option<Category>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CATEGORY_COLS} FROM categories WHERE id = "
        ));
        qb.push_bind(*id.as_uuid());
        push_visibility::<Category>(&mut qb, scope);
        let row = qb
            .build_query_as::<CategoryRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_categories(&self, scope: &Scope) -> StoreResult<Vec<Category>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CATEGORY_COLS} FROM categories WHERE 1 = 1"
        ));
        push_visibility::<Category>(&mut qb, scope);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<CategoryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_category(&self, scope: &Scope, category: Category) -> StoreResult<Category> {
        let mut category = category;
        stamp_update(&mut category, Utc::now());
        let mut qb = QueryBuilder::new("UPDATE categories SET name = ");
        qb.push_bind(category.name.clone());
        qb.push(", parent_id = ");
        qb.push_bind(category.parent_id.map(|p| *p.as_uuid()));
        qb.push(", updated_at = ");
        qb.push_bind(category.audit.updated_at);
        qb.push(" WHERE id = ");
        qb.push_bind(*category.id.as_uuid());
        push_visibility::<Category>(&mut qb, scope);
        qb.push(format!(" RETURNING {CATEGORY_COLS}"));
        let row = qb
            .build_query_as::<CategoryRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_category", e))?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn delete_category(&self, scope: &Scope, id: CategoryId) -> StoreResult<bool> {
        let mut qb = QueryBuilder::new("DELETE FROM categories WHERE id = ");
        qb.push_bind(*id.as_uuid());
        push_visibility::<Category>(&mut qb, scope);
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure> {
        let mut unit = unit;
        stamp_insert(scope, &mut unit, Utc::now());
        sqlx::query(
            "INSERT INTO uoms (id, tenant_id, code, name, precision, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*unit.id.as_uuid())
        .bind(*unit.tenant_id.as_uuid())
        .bind(&unit.code)
        .bind(&unit.name)
        .bind(unit.precision)
        .bind(unit.audit.created_at)
        .bind(unit.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_unit", e))?;
        Ok(unit)
    }

    async fn get_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<Option<UnitOfMeasure>> {
        let mut qb = QueryBuilder::new(format!("SELECT {UOM_COLS} FROM uoms WHERE id = "));
        qb.push_bind(*id.as_uuid());
        push_visibility::<UnitOfMeasure>(&mut qb, scope);
        let row = qb
            .build_query_as::<UomRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_unit", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_units(&self, scope: &Scope) -> StoreResult<Vec<UnitOfMeasure>> {
        let mut qb = QueryBuilder::new(format!("SELECT {UOM_COLS} FROM uoms WHERE 1 = 1"));
        push_visibility::<UnitOfMeasure>(&mut qb, scope);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<UomRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_units", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_unit(&self, scope: &Scope, unit: UnitOfMeasure) -> StoreResult<UnitOfMeasure> {
        let mut unit = unit;
        stamp_update(&mut unit, Utc::now());
        let mut qb = QueryBuilder::new("UPDATE uoms SET code = ");
        qb.push_bind(unit.code.clone());
        qb.push(", name = ");
        qb.push_bind(unit.name.clone());
        qb.push(", precision = ");
        qb.push_bind(unit.precision);
        qb.push(", updated_at = ");
        qb.push_bind(unit.audit.updated_at);
        qb.push(" WHERE id = ");
        qb.push_bind(*unit.id.as_uuid());
        push_visibility::<UnitOfMeasure>(&mut qb, scope);
        qb.push(format!(" RETURNING {UOM_COLS}"));
        let row = qb
            .build_query_as::<UomRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_unit", e))?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn delete_unit(&self, scope: &Scope, id: UnitId) -> StoreResult<bool> {
        let mut qb = QueryBuilder::new("DELETE FROM uoms WHERE id = ");
        qb.push_bind(*id.as_uuid());
        push_visibility::<UnitOfMeasure>(&mut qb, scope);
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_unit", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_product(&self, scope: &Scope, product: Product) -> StoreResult<Product> {
        let mut product = product;
        stamp_insert(scope, &mut product, Utc::now());
        sqlx::query(
            "INSERT INTO products (id, tenant_id, sku, name, description, category_id, unit_id, active, is_deleted, deleted_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(*product.id.as_uuid())
        .bind(*product.tenant_id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id.map(|c| *c.as_uuid()))
        .bind(*product.unit_id.as_uuid())
        .bind(product.active)
        .bind(product.deleted)
        .bind(product.deleted_at)
        .bind(product.audit.created_at)
        .bind(product.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(product)
    }

    async fn get_product(&self, scope: &Scope, id: ProductId) -> StoreResult<Option<Product>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLS} FROM products WHERE id = "
        ));
        qb.push_bind(*id.as_uuid());
        push_visibility::<Product>(&mut qb, scope);
        let row = qb
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_products(&self, scope: &Scope) -> StoreResult<Vec<Product>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLS} FROM products WHERE 1 = 1"
        ));
        push_visibility::<Product>(&mut qb, scope);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_product(&self, scope: &Scope, product: Product) -> StoreResult<Product> {
        let mut product = product;
        stamp_update(&mut product, Utc::now());
        let mut qb = QueryBuilder::new("UPDATE products SET sku = ");
        qb.push_bind(product.sku.clone());
        qb.push(", name = ");
        qb.push_bind(product.name.clone());
        qb.push(", description = ");
        qb.push_bind(product.description.clone());
        qb.push(", category_id = ");
        qb.push_bind(product.category_id.map(|c| *c.as_uuid()));
        qb.push(", unit_id = ");
        qb.push_bind(*product.unit_id.as_uuid());
        qb.push(", active = ");
        qb.push_bind(product.active);
        qb.push(", updated_at = ");
        qb.push_bind(product.audit.updated_at);
        qb.push(" WHERE id = ");
        qb.push_bind(*product.id.as_uuid());
        push_visibility::<Product>(&mut qb, scope);
        qb.push(format!(" RETURNING {PRODUCT_COLS}"));
        let row = qb
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn soft_delete_product(&self, scope: &Scope, id: ProductId) -> StoreResult<bool> {
        soft_delete_row::<Product>(&self.pool, "products", scope, *id.as_uuid()).await
    }

    async fn get_product_any_state(
        &self,
        scope: &Scope,
        id: ProductId,
    ) -> StoreResult<Option<Product>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLS} FROM products WHERE id = "
        ));
        qb.push_bind(*id.as_uuid());
        push_tenant_filter::<Product>(&mut qb, scope);
        let row = qb
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product_any_state", e))?;
        Ok(row.map(Into::into))
    }

    async fn insert_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant> {
        let mut variant = variant;
        stamp_insert(scope, &mut variant, Utc::now());
        sqlx::query(
            "INSERT INTO product_variants (id, tenant_id, product_id, sku, barcode, attributes, active, is_deleted, deleted_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(*variant.id.as_uuid())
        .bind(*variant.tenant_id.as_uuid())
        .bind(*variant.product_id.as_uuid())
        .bind(&variant.sku)
        .bind(&variant.barcode)
        .bind(&variant.attributes)
        .bind(variant.active)
        .bind(variant.deleted)
        .bind(variant.deleted_at)
        .bind(variant.audit.created_at)
        .bind(variant.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_variant", e))?;
        Ok(variant)
    }

    async fn get_variant(
        &self,
        scope: &Scope,
        id: VariantId,
    ) -> StoreResult<Option<ProductVariant>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {VARIANT_COLS} FROM product_variants WHERE id = "
        ));
        qb.push_bind(*id.as_uuid());
        push_visibility::<ProductVariant>(&mut qb, scope);
        let row = qb
            .build_query_as::<VariantRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_variant", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_variants_of(
        &self,
        scope: &Scope,
        product_id: ProductId,
    ) -> StoreResult<Vec<ProductVariant>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {VARIANT_COLS} FROM product_variants WHERE product_id = "
        ));
        qb.push_bind(*product_id.as_uuid());
        push_visibility::<ProductVariant>(&mut qb, scope);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<VariantRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_variants_of", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_variant(
        &self,
        scope: &Scope,
        variant: ProductVariant,
    ) -> StoreResult<ProductVariant> {
        let mut variant = variant;
        stamp_update(&mut variant, Utc::now());
        let mut qb = QueryBuilder::new("UPDATE product_variants SET product_id = ");
        qb.push_bind(*variant.product_id.as_uuid());
        qb.push(", sku = ");
        qb.push_bind(variant.sku.clone());
        qb.push(", barcode = ");
        qb.push_bind(variant.barcode.clone());
        qb.push(", attributes = ");
        qb.push_bind(variant.attributes.clone());
        qb.push(", active = ");
        qb.push_bind(variant.active);
        qb.push(", updated_at = ");
        qb.push_bind(variant.audit.updated_at);
        qb.push(" WHERE id = ");
        qb.push_bind(*variant.id.as_uuid());
        push_visibility::<ProductVariant>(&mut qb, scope);
        qb.push(format!(" RETURNING {VARIANT_COLS}"));
        let row = qb
            .build_query_as::<VariantRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_variant", e))?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn soft_delete_variant(&self, scope: &Scope, id: VariantId) -> StoreResult<bool> {
        soft_delete_row::<ProductVariant>(&self.pool, "product_variants", scope, *id.as_uuid())
            .await
    }
}

/// Shared soft-delete: flag the row, stamp `updated_at`, leave everything
/// else untouched. The visibility guard keeps it idempotent; an already
/// deleted row no longer matches.
async fn soft_delete_row<E>(
    pool: &PgPool,
    table: &str,
    scope: &Scope,
    id: Uuid,
) -> StoreResult<bool>
where
    E: Record,
    E::Id: Copy + core::fmt::Display + Send + Sync,
{
    let now = Utc::now();
    let mut qb = QueryBuilder::new(format!("UPDATE {table} SET is_deleted = TRUE, deleted_at = "));
    qb.push_bind(now);
    qb.push(", updated_at = ");
    qb.push_bind(now);
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    push_visibility::<E>(&mut qb, scope);
    let result = qb
        .build()
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("soft_delete", e))?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl PartyStore for PostgresStore {
    async fn insert_party(&self, scope: &Scope, party: Party) -> StoreResult<Party> {
        let mut party = party;
        stamp_insert(scope, &mut party, Utc::now());
        sqlx::query(
            "INSERT INTO parties (id, tenant_id, kind, name, email, phone, is_deleted, deleted_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(*party.id.as_uuid())
        .bind(*party.tenant_id.as_uuid())
        .bind(party.kind.to_string())
        .bind(&party.name)
        .bind(&party.email)
        .bind(&party.phone)
        .bind(party.deleted)
        .bind(party.deleted_at)
        .bind(party.audit.created_at)
        .bind(party.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_party", e))?;
        Ok(party)
    }

    async fn get_party(&self, scope: &Scope, id: PartyId) -> StoreResult<Option<Party>> {
        let mut qb = QueryBuilder::new(format!("SELECT {PARTY_COLS} FROM parties WHERE id = "));
        qb.push_bind(*id.as_uuid());
        push_visibility::<Party>(&mut qb, scope);
        let row = qb
            .build_query_as::<PartyRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_party", e))?;
        row.map(PartyRow::into_party).transpose()
    }

    async fn list_parties(&self, scope: &Scope, kind: PartyKind) -> StoreResult<Vec<Party>> {
        let mut qb = QueryBuilder::new(format!("SELECT {PARTY_COLS} FROM parties WHERE kind = "));
        qb.push_bind(kind.to_string());
        push_visibility::<Party>(&mut qb, scope);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<PartyRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_parties", e))?;
        rows.into_iter().map(PartyRow::into_party).collect()
    }

    async fn update_party(&self, scope: &Scope, party: Party) -> StoreResult<Party> {
        let mut party = party;
        stamp_update(&mut party, Utc::now());
        let mut qb = QueryBuilder::new("UPDATE parties SET name = ");
        qb.push_bind(party.name.clone());
        qb.push(", email = ");
        qb.push_bind(party.email.clone());
        qb.push(", phone = ");
        qb.push_bind(party.phone.clone());
        qb.push(", updated_at = ");
        qb.push_bind(party.audit.updated_at);
        qb.push(" WHERE id = ");
        qb.push_bind(*party.id.as_uuid());
        push_visibility::<Party>(&mut qb, scope);
        qb.push(format!(" RETURNING {PARTY_COLS}"));
        let row = qb
            .build_query_as::<PartyRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_party", e))?;
        row.map(PartyRow::into_party)
            .transpose()?
            .ok_or(StoreError::NotFound)
    }

    async fn soft_delete_party(&self, scope: &Scope, id: PartyId) -> StoreResult<bool> {
        soft_delete_row::<Party>(&self.pool, "parties", scope, *id.as_uuid()).await
    }
}

#[async_trait]
impl MovementStore for PostgresStore {
    async fn append_movement(
        &self,
        scope: &Scope,
        movement: StockMovement,
    ) -> StoreResult<StockMovement> {
        let mut movement = movement;
        stamp_insert(scope, &mut movement, Utc::now());
        sqlx::query(
            "INSERT INTO stock_movements (id, tenant_id, product_id, quantity_delta, note, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*movement.id.as_uuid())
        .bind(*movement.tenant_id.as_uuid())
        .bind(*movement.product_id.as_uuid())
        .bind(movement.quantity_delta)
        .bind(&movement.note)
        .bind(movement.audit.created_at)
        .bind(movement.audit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_movement", e))?;
        Ok(movement)
    }

    async fn list_movements(
        &self,
        scope: &Scope,
        product_id: Option<ProductId>,
    ) -> StoreResult<Vec<StockMovement>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {MOVEMENT_COLS} FROM stock_movements WHERE 1 = 1"
        ));
        push_visibility::<StockMovement>(&mut qb, scope);
        if let Some(product) = product_id {
            qb.push(" AND product_id = ");
            qb.push_bind(*product.as_uuid());
        }
        qb.push(" ORDER BY id DESC");
        let rows = qb
            .build_query_as::<MovementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_movements", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
