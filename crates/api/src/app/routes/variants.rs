use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
};

use stockroom_catalog::{ProductVariant, VariantId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new().route("/:id", put(update_variant).delete(delete_variant))
}

pub async fn update_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertVariantRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: VariantId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid variant id");
        }
    };
    // A variant never changes parent; the stored product id is carried
    // over from the existing row.
    let existing = match services.catalog.get_variant(&tenant.scope(), id).await {
        Ok(Some(v)) => v,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "variant not found");
        }
        Err(e) => return errors::store_error(e),
    };
    let mut replacement = match ProductVariant::new(
        tenant.tenant_id(),
        existing.product_id,
        body.sku,
        body.barcode,
        body.attributes,
    ) {
        Ok(v) => v,
        Err(e) => return errors::error_response(&e),
    };
    replacement.id = existing.id;
    if let Some(active) = body.is_active {
        replacement.active = active;
    }
    match services
        .catalog
        .update_variant(&tenant.scope(), replacement)
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(dto::variant_to_json(&updated))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn delete_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: VariantId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid variant id");
        }
    };
    match services
        .catalog
        .soft_delete_variant(&tenant.scope(), id)
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error(e),
    }
}
