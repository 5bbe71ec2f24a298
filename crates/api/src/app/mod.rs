//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and shared handles
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services(jwt_secret).await);

    let tenant_state = middleware::TenantState {
        tenants: services.tenants.clone(),
    };
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };

    // Handlers behind this layer always see an authenticated principal
    // whose token belongs to the resolved tenant.
    let protected = Router::new()
        .route("/api/me", get(routes::system::me))
        .route("/api/auth/logout", post(routes::auth::logout))
        .nest("/api/catalog", routes::catalog_router())
        .nest("/api/customers", routes::parties::customers_router())
        .nest("/api/suppliers", routes::parties::suppliers_router())
        .nest("/api/inventory", routes::movements::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::require_principal,
        ));

    // The anonymous credential endpoints share tenant resolution with the
    // protected zone; nothing below this layer runs without a tenant.
    let tenant_scoped = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            tenant_state,
            middleware::resolve_tenant,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/tenants", routes::tenants::router())
        .merge(tenant_scoped)
        .layer(Extension(services))
}
