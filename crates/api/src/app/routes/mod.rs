use axum::Router;

pub mod auth;
pub mod categories;
pub mod movements;
pub mod parties;
pub mod products;
pub mod system;
pub mod tenants;
pub mod units;
pub mod variants;

/// Router for the catalog area (categories, units, products, variants).
pub fn catalog_router() -> Router {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/units", units::router())
        .nest("/products", products::router())
        .nest("/variants", variants::router())
}
