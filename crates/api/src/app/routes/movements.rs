use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_inventory::StockMovement;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new().route("/movements", get(list_movements).post(create_movement))
}

/// Journal listing, newest first, optionally narrowed with `?productId=`.
pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<dto::MovementListQuery>,
) -> axum::response::Response {
    match services
        .movements
        .list_movements(&tenant.scope(), query.product_id)
        .await
    {
        Ok(movements) => {
            errors::items_response(movements.iter().map(dto::movement_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn create_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateMovementRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    // The journal only accepts movements against a product visible in this
    // tenant.
    match services
        .catalog
        .get_product(&tenant.scope(), body.product_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error(e),
    }
    let movement = match StockMovement::new(
        tenant.tenant_id(),
        body.product_id,
        body.quantity_delta,
        body.note,
    ) {
        Ok(m) => m,
        Err(e) => return errors::error_response(&e),
    };
    match services
        .movements
        .append_movement(&tenant.scope(), movement)
        .await
    {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::movement_to_json(&created))).into_response()
        }
        Err(e) => errors::store_error(e),
    }
}
