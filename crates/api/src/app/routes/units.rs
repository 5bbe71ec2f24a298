use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_catalog::{UnitId, UnitOfMeasure};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/:id", get(get_unit).put(update_unit).delete(delete_unit))
}

pub async fn list_units(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.catalog.list_units(&tenant.scope()).await {
        Ok(units) => errors::items_response(units.iter().map(dto::unit_to_json).collect::<Vec<_>>()),
        Err(e) => errors::store_error(e),
    }
}

pub async fn create_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpsertUnitRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let unit = match UnitOfMeasure::new(
        tenant.tenant_id(),
        &body.code,
        &body.name,
        body.precision.unwrap_or(0),
    ) {
        Ok(u) => u,
        Err(e) => return errors::error_response(&e),
    };
    match services.catalog.insert_unit(&tenant.scope(), unit).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::unit_to_json(&created))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn get_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UnitId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid unit id");
        }
    };
    match services.catalog.get_unit(&tenant.scope(), id).await {
        Ok(Some(unit)) => (StatusCode::OK, Json(dto::unit_to_json(&unit))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "unit not found"),
        Err(e) => errors::store_error(e),
    }
}

pub async fn update_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertUnitRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: UnitId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid unit id");
        }
    };
    let mut replacement = match UnitOfMeasure::new(
        tenant.tenant_id(),
        &body.code,
        &body.name,
        body.precision.unwrap_or(0),
    ) {
        Ok(u) => u,
        Err(e) => return errors::error_response(&e),
    };
    replacement.id = id;
    match services.catalog.update_unit(&tenant.scope(), replacement).await {
        Ok(updated) => (StatusCode::OK, Json(dto::unit_to_json(&updated))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn delete_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: UnitId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid unit id");
        }
    };
    match services.catalog.delete_unit(&tenant.scope(), id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error(e),
    }
}
