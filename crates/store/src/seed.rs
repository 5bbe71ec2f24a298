//! Startup seeding: built-in roles always, demo data on request.

use tracing::{info, instrument};

use stockroom_auth::{BUILT_IN_ROLES, OWNER, RoleAssignment, User, hash_password};
use stockroom_catalog::{Category, Product, UnitOfMeasure};
use stockroom_core::{DomainError, DomainResult, Scope, Tenant};

use crate::error::StoreResult;
use crate::traits::{CatalogStore, IdentityStore, TenantDirectory};

pub const DEMO_TENANT_NAME: &str = "Acme";
pub const DEMO_TENANT_DOMAIN: &str = "acme.local";
pub const DEMO_OWNER_EMAIL: &str = "owner@acme.com";
pub const DEMO_OWNER_NAME: &str = "Acme Owner";
pub const DEMO_OWNER_PASSWORD: &str = "Passw0rd!";

/// Create any of the built-in roles that are missing. Matching is
/// case-insensitive, so a manually created "owner" is not duplicated.
pub async fn ensure_builtin_roles(identity: &dyn IdentityStore) -> StoreResult<()> {
    for name in BUILT_IN_ROLES {
        identity.ensure_role(name).await?;
    }
    Ok(())
}

/// Seed the demo tenant, its owner account, and a minimal catalog.
///
/// Idempotent: reruns find the existing rows and fill in whatever is
/// missing (an inactive demo tenant is reactivated, an owner stripped of
/// the Owner role gets it back). All tenant-filtered writes go through the
/// tenant scope so the interceptor stamps them.
#[instrument(skip_all, err)]
pub async fn seed_demo_data(
    tenants: &dyn TenantDirectory,
    identity: &dyn IdentityStore,
    catalog: &dyn CatalogStore,
) -> DomainResult<()> {
    ensure_builtin_roles(identity).await?;

    let tenant = match tenants.find_tenant_by_name(DEMO_TENANT_NAME).await? {
        Some(mut existing) => {
            if !existing.active {
                existing.reactivate();
                let reactivated = tenants.update_tenant(existing).await?;
                info!(tenant = %reactivated.id, "reactivated demo tenant");
                reactivated
            } else {
                existing
            }
        }
        None => {
            let created = tenants
                .create_tenant(Tenant::new(
                    DEMO_TENANT_NAME,
                    Some(DEMO_TENANT_DOMAIN.to_string()),
                )?)
                .await?;
            info!(tenant = %created.id, name = DEMO_TENANT_NAME, "created demo tenant");
            created
        }
    };
    let scope = Scope::tenant(tenant.id);

    let owner = match identity.find_user_by_email(&scope, DEMO_OWNER_EMAIL).await? {
        Some(existing) => existing,
        None => {
            let hash = hash_password(DEMO_OWNER_PASSWORD)
                .map_err(|e| DomainError::internal(e.to_string()))?;
            let user = User::new(
                tenant.id,
                DEMO_OWNER_EMAIL,
                hash,
                Some(DEMO_OWNER_NAME.to_string()),
            )?;
            let user = identity.insert_user(&scope, user).await?;
            info!(user = %user.id, "created demo owner account");
            user
        }
    };

    let names = identity.role_names_for_user(&scope, owner.id).await?;
    if !names.iter().any(|n| n == OWNER) {
        let role = identity.ensure_role(OWNER).await?;
        identity
            .insert_assignment(&scope, RoleAssignment::new(tenant.id, owner.id, role.id))
            .await?;
        info!(user = %owner.id, "granted Owner role to demo owner");
    }

    seed_demo_catalog(catalog, &scope).await?;

    info!(tenant = %tenant.id, "demo seeding complete");
    Ok(())
}

async fn seed_demo_catalog(catalog: &dyn CatalogStore, scope: &Scope) -> DomainResult<()> {
    let tenant = match scope.tenant_id() {
        Some(t) => t,
        None => return Ok(()),
    };

    let unit = match catalog.list_units(scope).await?.into_iter().next() {
        Some(existing) => existing,
        None => {
            catalog
                .insert_unit(scope, UnitOfMeasure::new(tenant, "EA", "Each", 0)?)
                .await?
        }
    };

    if catalog.list_categories(scope).await?.is_empty() {
        catalog
            .insert_category(scope, Category::new(tenant, "General", None)?)
            .await?;
    }

    if catalog.list_products(scope).await?.is_empty() {
        catalog
            .insert_product(
                scope,
                Product::new(
                    tenant,
                    "SAMPLE-001",
                    "Sample Product",
                    Some("Seeded starter product".to_string()),
                    None,
                    unit.id,
                )?,
            )
            .await?;
    }

    Ok(())
}
