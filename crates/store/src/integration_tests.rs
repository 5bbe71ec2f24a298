//! Cross-module tests over the in-memory backend: isolation, uniqueness,
//! soft deletes, and the full credential/token lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use stockroom_auth::{OWNER, RefreshToken, TokenConfig, TokenService};
use stockroom_catalog::{Category, Product, ProductVariant, UnitOfMeasure};
use stockroom_core::{DomainError, Record, Scope, Tenant, TenantId};
use stockroom_inventory::StockMovement;
use stockroom_parties::{Party, PartyKind};

use crate::auth_flows::AuthFlows;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::seed::{self, DEMO_OWNER_EMAIL, DEMO_OWNER_PASSWORD, DEMO_TENANT_NAME};
use crate::traits::{CatalogStore, IdentityStore, MovementStore, PartyStore, TenantDirectory};

fn auth_flows(store: &Arc<MemoryStore>) -> AuthFlows {
    let identity: Arc<dyn IdentityStore> = store.clone();
    AuthFlows::new(
        identity,
        TokenService::new(&TokenConfig::new("integration-test-secret")),
    )
}

async fn provision_tenant(store: &MemoryStore, name: &str) -> TenantId {
    let tenant = Tenant::new(name, None).unwrap();
    store.create_tenant(tenant).await.unwrap().id
}

async fn insert_product(store: &MemoryStore, scope: &Scope, tenant: TenantId, sku: &str) -> Product {
    let unit = store
        .insert_unit(scope, UnitOfMeasure::new(tenant, sku, "Each", 0).unwrap())
        .await
        .unwrap();
    store
        .insert_product(
            scope,
            Product::new(tenant, sku, "Widget", None, None, unit.id).unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn reads_are_confined_to_the_scope_tenant() {
    let store = MemoryStore::new();
    let a = provision_tenant(&store, "Alpha").await;
    let b = provision_tenant(&store, "Beta").await;
    let (scope_a, scope_b) = (Scope::tenant(a), Scope::tenant(b));

    let product_a = insert_product(&store, &scope_a, a, "SKU-A").await;
    insert_product(&store, &scope_b, b, "SKU-B").await;

    let listed_a = store.list_products(&scope_a).await.unwrap();
    assert_eq!(listed_a.len(), 1);
    assert_eq!(listed_a[0].sku, "SKU-A");

    // The row exists, but not for the other tenant.
    assert!(
        store
            .get_product(&scope_b, product_a.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .get_product(&scope_a, product_a.id)
            .await
            .unwrap()
            .is_some()
    );

    // An unrestricted scope sees both.
    let all = store.list_products(&Scope::unrestricted()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn sku_uniqueness_is_per_tenant() {
    let store = MemoryStore::new();
    let a = provision_tenant(&store, "Alpha").await;
    let b = provision_tenant(&store, "Beta").await;
    let (scope_a, scope_b) = (Scope::tenant(a), Scope::tenant(b));

    let first = insert_product(&store, &scope_a, a, "SHARED").await;
    // Same SKU in another tenant is fine.
    insert_product(&store, &scope_b, b, "SHARED").await;

    // Same SKU in the same tenant is not.
    let err = store
        .insert_product(
            &scope_a,
            Product::new(a, "SHARED", "Duplicate", None, None, first.unit_id).unwrap(),
        )
        .await
        .unwrap_err();
    match err {
        StoreError::UniqueViolation { constraint } => {
            assert_eq!(constraint, "products_tenant_sku_key");
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    // Updates hit the same constraint.
    let mut second = insert_product(&store, &scope_a, a, "OTHER").await;
    second.sku = "SHARED".to_string();
    let err = store.update_product(&scope_a, second).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { .. }));
}

#[tokio::test]
async fn soft_deleted_products_vanish_but_keep_their_sku() {
    let store = MemoryStore::new();
    let tenant = provision_tenant(&store, "Alpha").await;
    let scope = Scope::tenant(tenant);

    let product = insert_product(&store, &scope, tenant, "KEEP").await;
    assert!(store.soft_delete_product(&scope, product.id).await.unwrap());
    // Second delete is a no-op.
    assert!(!store.soft_delete_product(&scope, product.id).await.unwrap());

    assert!(store.get_product(&scope, product.id).await.unwrap().is_none());
    assert!(store.list_products(&scope).await.unwrap().is_empty());

    // The row was flagged, not removed: the any-state accessor still
    // returns it, but only within the owning tenant.
    let retained = store
        .get_product_any_state(&scope, product.id)
        .await
        .unwrap()
        .unwrap();
    assert!(retained.deleted);
    assert!(retained.deleted_at.is_some());
    let other = provision_tenant(&store, "Beta").await;
    assert!(
        store
            .get_product_any_state(&Scope::tenant(other), product.id)
            .await
            .unwrap()
            .is_none()
    );

    // The deleted row still owns its SKU; re-creating it conflicts.
    let err = store
        .insert_product(
            &scope,
            Product::new(tenant, "KEEP", "Again", None, None, product.unit_id).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { .. }));
}

#[tokio::test]
async fn updates_cannot_move_a_row_to_another_tenant() {
    let store = MemoryStore::new();
    let a = provision_tenant(&store, "Alpha").await;
    let b = provision_tenant(&store, "Beta").await;
    let scope_a = Scope::tenant(a);

    let mut product = insert_product(&store, &scope_a, a, "PINNED").await;
    let created_at = product.audit.created_at;

    // A tampered record claiming the other tenant is snapped back to the
    // stored row's tenant.
    product.assign_tenant(b);
    product.name = "Renamed".to_string();
    let updated = store.update_product(&scope_a, product.clone()).await.unwrap();
    assert_eq!(updated.tenant_id, a);
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.audit.created_at, created_at);
    assert!(updated.audit.updated_at.is_some());
    assert!(
        store
            .get_product(&Scope::tenant(b), updated.id)
            .await
            .unwrap()
            .is_none()
    );

    // Updating someone else's row fails as not found.
    let err = store
        .update_product(&Scope::tenant(b), updated)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn category_delete_is_hard_and_idempotent() {
    let store = MemoryStore::new();
    let tenant = provision_tenant(&store, "Alpha").await;
    let scope = Scope::tenant(tenant);

    let category = store
        .insert_category(&scope, Category::new(tenant, "Tools", None).unwrap())
        .await
        .unwrap();
    assert!(store.delete_category(&scope, category.id).await.unwrap());
    assert!(!store.delete_category(&scope, category.id).await.unwrap());

    // Gone for real: the name is reusable.
    store
        .insert_category(&scope, Category::new(tenant, "Tools", None).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn variant_skus_conflict_only_when_present() {
    let store = MemoryStore::new();
    let tenant = provision_tenant(&store, "Alpha").await;
    let scope = Scope::tenant(tenant);
    let product = insert_product(&store, &scope, tenant, "PARENT").await;

    // Two variants without sku or barcode coexist.
    for _ in 0..2 {
        store
            .insert_variant(
                &scope,
                ProductVariant::new(tenant, product.id, None, None, None).unwrap(),
            )
            .await
            .unwrap();
    }

    store
        .insert_variant(
            &scope,
            ProductVariant::new(tenant, product.id, Some("V-1".into()), None, None).unwrap(),
        )
        .await
        .unwrap();
    let err = store
        .insert_variant(
            &scope,
            ProductVariant::new(tenant, product.id, Some("V-1".into()), None, None).unwrap(),
        )
        .await
        .unwrap_err();
    match err {
        StoreError::UniqueViolation { constraint } => {
            assert_eq!(constraint, "product_variants_tenant_sku_key");
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    assert_eq!(
        store.list_variants_of(&scope, product.id).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn movement_journal_is_newest_first_and_filterable() {
    let store = MemoryStore::new();
    let tenant = provision_tenant(&store, "Alpha").await;
    let scope = Scope::tenant(tenant);
    let widget = insert_product(&store, &scope, tenant, "WIDGET").await;
    let gadget = insert_product(&store, &scope, tenant, "GADGET").await;

    for (product, delta) in [(widget.id, 10), (gadget.id, 5), (widget.id, -3)] {
        store
            .append_movement(
                &scope,
                StockMovement::new(tenant, product, delta, None).unwrap(),
            )
            .await
            .unwrap();
    }

    let all = store.list_movements(&scope, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].quantity_delta, -3);

    let widget_only = store.list_movements(&scope, Some(widget.id)).await.unwrap();
    assert_eq!(widget_only.len(), 2);
    assert!(widget_only.iter().all(|m| m.product_id == widget.id));
}

#[tokio::test]
async fn parties_are_split_by_kind() {
    let store = MemoryStore::new();
    let tenant = provision_tenant(&store, "Alpha").await;
    let scope = Scope::tenant(tenant);

    store
        .insert_party(
            &scope,
            Party::new(tenant, PartyKind::Customer, "Northwind", None, None).unwrap(),
        )
        .await
        .unwrap();
    let supplier = store
        .insert_party(
            &scope,
            Party::new(tenant, PartyKind::Supplier, "Contoso", None, None).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        store
            .list_parties(&scope, PartyKind::Customer)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        store
            .list_parties(&scope, PartyKind::Supplier)
            .await
            .unwrap()
            .len(),
        1
    );

    assert!(store.soft_delete_party(&scope, supplier.id).await.unwrap());
    assert!(
        store
            .list_parties(&scope, PartyKind::Supplier)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn register_login_refresh_logout_lifecycle() {
    let store = Arc::new(MemoryStore::new());
    let flows = auth_flows(&store);
    let tenant = provision_tenant(&store, "Alpha").await;

    let registered = flows
        .register(tenant, "Owner@Alpha.example ", "s3cure-pass", Some("Ada".into()))
        .await
        .unwrap();
    assert_eq!(registered.roles, vec![OWNER.to_string()]);
    assert_eq!(registered.user.email, "owner@alpha.example");

    // The access token carries the tenant and roles.
    let tokens = TokenService::new(&TokenConfig::new("integration-test-secret"));
    let claims = tokens.verify_access(&registered.access.token).unwrap();
    assert_eq!(claims.tenant, tenant);
    assert!(claims.has_role(OWNER));

    // A second registration against the same tenant is rejected.
    let err = flows
        .register(tenant, "second@alpha.example", "s3cure-pass", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TenantAlreadyInitialized));

    // Login supersedes the registration-issued refresh token.
    let logged_in = flows
        .login(tenant, "owner@alpha.example", "s3cure-pass")
        .await
        .unwrap();
    let err = flows
        .refresh(tenant, &registered.refresh.token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefreshToken));

    // Rotation: the presented token works once.
    let rotated = flows.refresh(tenant, &logged_in.refresh.token).await.unwrap();
    let err = flows
        .refresh(tenant, &logged_in.refresh.token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefreshToken));

    // Logout kills the current token too.
    flows.logout(tenant, rotated.user.id).await.unwrap();
    let err = flows
        .refresh(tenant, &rotated.refresh.token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefreshToken));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let store = Arc::new(MemoryStore::new());
    let flows = auth_flows(&store);
    let tenant = provision_tenant(&store, "Alpha").await;
    let session = flows
        .register(tenant, "owner@alpha.example", "s3cure-pass", None)
        .await
        .unwrap();

    let wrong_password = flows
        .login(tenant, "owner@alpha.example", "not-the-password")
        .await
        .unwrap_err();
    let unknown_user = flows
        .login(tenant, "nobody@alpha.example", "s3cure-pass")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, DomainError::InvalidCredentials));
    assert!(matches!(unknown_user, DomainError::InvalidCredentials));

    // Failed attempts minted nothing: the register-issued token is still
    // the user's only unrevoked row.
    let revoked = store
        .revoke_refresh_tokens_for_user(&Scope::tenant(tenant), session.user.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    // And a short password never reaches the store.
    let other = provision_tenant(&store, "Beta").await;
    let err = flows
        .register(other, "owner@beta.example", "short", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn refresh_rejects_expired_and_foreign_tenant_tokens() {
    let store = Arc::new(MemoryStore::new());
    let flows = auth_flows(&store);
    let tenant = provision_tenant(&store, "Alpha").await;
    let other = provision_tenant(&store, "Beta").await;
    let session = flows
        .register(tenant, "owner@alpha.example", "s3cure-pass", None)
        .await
        .unwrap();

    // A token presented under the wrong tenant is invisible there.
    let err = flows.refresh(other, &session.refresh.token).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefreshToken));

    // An expired token is rejected even though it is still unrevoked.
    let scope = Scope::tenant(tenant);
    let expired = RefreshToken::issue(
        tenant,
        session.user.id,
        TokenService::new_refresh_value(),
        Utc::now() - Duration::days(8),
        Duration::days(7),
    );
    let expired = store.insert_refresh_token(&scope, expired).await.unwrap();
    let err = flows.refresh(tenant, &expired.token).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefreshToken));

    // Logout still revokes it: every unrevoked token counts, expired or not.
    let revoked = store
        .revoke_refresh_tokens_for_user(&scope, session.user.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(revoked, 2);
}

#[tokio::test]
async fn concurrent_rotation_has_exactly_one_winner() {
    let store = Arc::new(MemoryStore::new());
    let flows = auth_flows(&store);
    let tenant = provision_tenant(&store, "Alpha").await;
    let session = flows
        .register(tenant, "owner@alpha.example", "s3cure-pass", None)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        flows.refresh(tenant, &session.refresh.token),
        flows.refresh(tenant, &session.refresh.token),
    );
    assert_eq!(
        first.is_ok() as u8 + second.is_ok() as u8,
        1,
        "exactly one rotation must win"
    );

    // Store-level: the losing revoke sees the token already consumed.
    let scope = Scope::tenant(tenant);
    let winner = first.or(second).unwrap();
    let replacement = RefreshToken::issue(
        tenant,
        session.user.id,
        TokenService::new_refresh_value(),
        Utc::now(),
        Duration::days(7),
    );
    let rotated = store
        .rotate_refresh_token(&scope, winner.refresh.id, replacement.clone(), Utc::now())
        .await
        .unwrap();
    assert!(rotated.is_some());
    let again = store
        .rotate_refresh_token(&scope, winner.refresh.id, replacement, Utc::now())
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn demo_seed_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    for _ in 0..2 {
        seed::seed_demo_data(store.as_ref(), store.as_ref(), store.as_ref())
            .await
            .unwrap();
    }

    let acme = store
        .find_tenant_by_name(DEMO_TENANT_NAME)
        .await
        .unwrap()
        .unwrap();
    assert!(acme.active);
    assert_eq!(store.list_tenants().await.unwrap().len(), 1);

    let scope = Scope::tenant(acme.id);
    assert_eq!(store.list_products(&scope).await.unwrap().len(), 1);
    assert_eq!(store.list_roles().await.unwrap().len(), 5);

    // The seeded owner can log in.
    let flows = auth_flows(&store);
    let session = flows
        .login(acme.id, DEMO_OWNER_EMAIL, DEMO_OWNER_PASSWORD)
        .await
        .unwrap();
    assert!(session.roles.iter().any(|r| r == OWNER));
}
