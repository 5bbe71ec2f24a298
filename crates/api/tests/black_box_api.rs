use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stockroom_auth::{AccessClaims, UserId};
use stockroom_core::TenantId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = stockroom_api::app::build_app(JWT_SECRET.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Sign an access token directly, bypassing the register flow. Lets tests
/// exercise role gates and tenant mismatches the server never issues.
fn mint_access(tenant: &str, roles: &[&str]) -> String {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: UserId::new(),
        email: "forged@test.local".to_string(),
        tenant: tenant.parse::<TenantId>().unwrap(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        iat: now.timestamp(),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_tenant(client: &reqwest::Client, base: &str, name: &str) -> String {
    let res = client
        .post(format!("{base}/api/tenants"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

/// Register the tenant's first (owner) account; returns (access, refresh).
async fn register_owner(
    client: &reqwest::Client,
    base: &str,
    tenant: &str,
    email: &str,
) -> (String, String) {
    let res = client
        .post(format!("{base}/api/auth/register"))
        .header("X-Tenant-Id", tenant)
        .json(&json!({
            "email": email,
            "password": "Passw0rd!",
            "fullName": "Test Owner",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    (
        body["accessToken"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

/// Create a unit of measure and a product using it; returns the product id.
async fn create_product(
    client: &reqwest::Client,
    base: &str,
    tenant: &str,
    access: &str,
    sku: &str,
) -> String {
    let res = client
        .post(format!("{base}/api/catalog/units"))
        .header("X-Tenant-Id", tenant)
        .bearer_auth(access)
        .json(&json!({ "code": format!("U-{sku}"), "name": "Each" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let unit: serde_json::Value = res.json().await.unwrap();

    let res = client
        .post(format!("{base}/api/catalog/products"))
        .header("X-Tenant-Id", tenant)
        .bearer_auth(access)
        .json(&json!({
            "sku": sku,
            "name": format!("Product {sku}"),
            "unitId": unit["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: serde_json::Value = res.json().await.unwrap();
    product["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_resolution_is_strict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // No header at all.
    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_tenant");

    // Header present but not a UUID.
    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "malformed_tenant");

    // Well-formed but unknown tenant.
    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", TenantId::new().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "tenant_not_found");

    // Known tenant, no bearer token.
    let tenant = create_tenant(&client, &srv.base_url, "Strict Co").await;
    let res = client
        .get(format!("{}/api/me", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_bootstraps_a_single_owner() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Bootstrap Co").await;

    // Too-short password is rejected before any account exists.
    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "o@x.com", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "o@x.com", "password": "Passw0rd!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());
    assert!(body["expiresAtUtc"].is_string());

    // The tenant is sealed after its first account.
    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "second@x.com", "password": "Passw0rd!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "tenant_already_initialized");
}

#[tokio::test]
async fn login_accepts_only_the_right_password() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Login Co").await;
    register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "o@x.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");

    // Unknown email fails with the same error, not a different one.
    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "nobody@x.com", "password": "Passw0rd!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "email": "o@x.com", "password": "Passw0rd!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Refresh Co").await;
    let (_, refresh) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;

    let res = client
        .post(format!("{}/api/auth/refresh", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let rotated = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);

    // The consumed value is dead; the rotated one still works.
    let res = client
        .post(format!("{}/api/auth/refresh", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_refresh_token");

    let res = client
        .post(format!("{}/api/auth/refresh", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "refreshToken": rotated }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_is_idempotent_and_revokes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Logout Co").await;
    let (access, refresh) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;

    for _ in 0..2 {
        let res = client
            .post(format!("{}/api/auth/logout", srv.base_url))
            .header("X-Tenant-Id", &tenant)
            .bearer_auth(&access)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = client
        .post(format!("{}/api/auth/refresh", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenants_are_isolated_from_each_other() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let tenant_a = create_tenant(&client, &srv.base_url, "Alpha").await;
    let tenant_b = create_tenant(&client, &srv.base_url, "Beta").await;
    let (access_a, _) = register_owner(&client, &srv.base_url, &tenant_a, "o@alpha.com").await;
    let (access_b, _) = register_owner(&client, &srv.base_url, &tenant_b, "o@beta.com").await;

    let res = client
        .post(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant_a)
        .bearer_auth(&access_a)
        .json(&json!({ "name": "Beverages" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // The other tenant sees an empty list, not an error.
    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant_b)
        .bearer_auth(&access_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant_a)
        .bearer_auth(&access_a)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn token_tenant_must_match_the_header() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let tenant_a = create_tenant(&client, &srv.base_url, "Alpha").await;
    let tenant_b = create_tenant(&client, &srv.base_url, "Beta").await;
    let (access_a, _) = register_owner(&client, &srv.base_url, &tenant_a, "o@alpha.com").await;

    let res = client
        .get(format!("{}/api/me", srv.base_url))
        .header("X-Tenant-Id", &tenant_b)
        .bearer_auth(&access_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn viewer_tokens_cannot_mutate_the_catalog() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Viewer Co").await;
    let viewer = mint_access(&tenant, &["Viewer"]);

    let res = client
        .post(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&viewer)
        .json(&json!({ "name": "Forbidden" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Reads stay open to any authenticated principal.
    let res = client
        .get(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Manager clears the same gate.
    let manager = mint_access(&tenant, &["Manager"]);
    let res = client
        .post(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&manager)
        .json(&json!({ "name": "Allowed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Sku Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;
    create_product(&client, &srv.base_url, &tenant, &access, "COLA-1").await;

    let res = client
        .post(format!("{}/api/catalog/units", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "code": "BOX", "name": "Box" }))
        .send()
        .await
        .unwrap();
    let unit: serde_json::Value = res.json().await.unwrap();

    let res = client
        .post(format!("{}/api/catalog/products", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "sku": "COLA-1", "name": "Duplicate", "unitId": unit["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn me_echoes_principal_and_tenant() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Me Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "Owner@Me.Co").await;

    let res = client
        .get(format!("{}/api/me", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "owner@me.co");
    assert_eq!(body["tenantId"], tenant);
    assert_eq!(body["roles"][0], "Owner");
}

#[tokio::test]
async fn category_crud_roundtrip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Crud Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;

    let res = client
        .post(format!("{}/api/catalog/categories", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "name": "Drinks" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/catalog/categories/{id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(format!("{}/api/catalog/categories/{id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "name": "Beverages" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Beverages");
    assert!(updated["updatedAt"].is_string());

    // Delete is idempotent; the row is gone after the first call.
    for _ in 0..2 {
        let res = client
            .delete(format!("{}/api/catalog/categories/{id}", srv.base_url))
            .header("X-Tenant-Id", &tenant)
            .bearer_auth(&access)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
    let res = client
        .get(format!("{}/api/catalog/categories/{id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn movement_journal_lists_newest_first_and_filters() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Moves Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;
    let cola = create_product(&client, &srv.base_url, &tenant, &access, "COLA-1").await;
    let water = create_product(&client, &srv.base_url, &tenant, &access, "WATER-1").await;

    for (product, delta) in [(&cola, 5i64), (&cola, -2), (&water, 7)] {
        let res = client
            .post(format!("{}/api/inventory/movements", srv.base_url))
            .header("X-Tenant-Id", &tenant)
            .bearer_auth(&access)
            .json(&json!({ "productId": product, "quantityDelta": delta }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // Zero deltas and unknown products never reach the journal.
    let res = client
        .post(format!("{}/api/inventory/movements", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "productId": cola, "quantityDelta": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = client
        .post(format!("{}/api/inventory/movements", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "productId": uuid::Uuid::now_v7(), "quantityDelta": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/inventory/movements", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["quantityDelta"], 7);

    let res = client
        .get(format!(
            "{}/api/inventory/movements?productId={cola}",
            srv.base_url
        ))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn variant_skus_conflict_only_when_present() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Variant Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;
    let product = create_product(&client, &srv.base_url, &tenant, &access, "SHIRT-1").await;

    // A variant without its own SKU is fine.
    let res = client
        .post(format!(
            "{}/api/catalog/products/{product}/variants",
            srv.base_url
        ))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "attributes": { "size": "M" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!(
            "{}/api/catalog/products/{product}/variants",
            srv.base_url
        ))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "sku": "SHIRT-1-L", "attributes": { "size": "L" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let sized: serde_json::Value = res.json().await.unwrap();
    let sized_id = sized["id"].as_str().unwrap();

    let res = client
        .post(format!(
            "{}/api/catalog/products/{product}/variants",
            srv.base_url
        ))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "sku": "SHIRT-1-L" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .put(format!("{}/api/catalog/variants/{sized_id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "sku": "SHIRT-1-L", "barcode": "4006381333931" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["barcode"], "4006381333931");

    let res = client
        .delete(format!("{}/api/catalog/variants/{sized_id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!(
            "{}/api/catalog/products/{product}/variants",
            srv.base_url
        ))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn party_routes_fix_the_kind() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = create_tenant(&client, &srv.base_url, "Party Co").await;
    let (access, _) = register_owner(&client, &srv.base_url, &tenant, "o@x.com").await;

    let res = client
        .post(format!("{}/api/customers", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "name": "Globex", "email": "buyer@globex.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let customer: serde_json::Value = res.json().await.unwrap();
    assert_eq!(customer["kind"], "customer");
    let customer_id = customer["id"].as_str().unwrap();

    // The supplier routes cannot see a customer.
    let res = client
        .get(format!("{}/api/suppliers", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let res = client
        .get(format!("{}/api/suppliers/{customer_id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/api/customers/{customer_id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .json(&json!({ "name": "Globex Corp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Globex Corp");

    let res = client
        .delete(format!("{}/api/customers/{customer_id}", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/api/customers", srv.base_url))
        .header("X-Tenant-Id", &tenant)
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn tenant_directory_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_tenant(&client, &srv.base_url, "Directory Co").await;

    let res = client
        .get(format!("{}/api/tenants", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Directory Co"));

    let res = client
        .get(format!("{}/api/tenants/{id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["isActive"], true);

    let res = client
        .get(format!("{}/api/tenants/nope", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!(
            "{}/api/tenants/{}",
            srv.base_url,
            TenantId::new()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Blank names never create a tenant.
    let res = client
        .post(format!("{}/api/tenants", srv.base_url))
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
