//! Tenant provisioning. These endpoints sit outside tenant resolution;
//! fronting them with an operator surface is deployment wiring.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockroom_core::{Tenant, TenantId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_tenant).get(list_tenants))
        .route("/:id", get(get_tenant))
}

pub async fn create_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateTenantRequest>,
) -> axum::response::Response {
    let tenant = match Tenant::new(body.name, body.domain) {
        Ok(t) => t,
        Err(e) => return errors::error_response(&e),
    };
    match services.tenants.create_tenant(tenant).await {
        Ok(created) => (StatusCode::OK, Json(dto::tenant_to_json(&created))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn list_tenants(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.tenants.list_tenants().await {
        Ok(tenants) => {
            errors::items_response(tenants.iter().map(dto::tenant_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn get_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TenantId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tenant id");
        }
    };
    match services.tenants.get_tenant(id).await {
        Ok(Some(tenant)) => (StatusCode::OK, Json(dto::tenant_to_json(&tenant))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "tenant not found"),
        Err(e) => errors::store_error(e),
    }
}
