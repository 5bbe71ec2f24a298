use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_catalog::{Category, CategoryId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.catalog.list_categories(&tenant.scope()).await {
        Ok(categories) => {
            errors::items_response(categories.iter().map(dto::category_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpsertCategoryRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let category = match Category::new(tenant.tenant_id(), &body.name, body.parent_id) {
        Ok(c) => c,
        Err(e) => return errors::error_response(&e),
    };
    match services
        .catalog
        .insert_category(&tenant.scope(), category)
        .await
    {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::category_to_json(&created))).into_response()
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    match services.catalog.get_category(&tenant.scope(), id).await {
        Ok(Some(category)) => {
            (StatusCode::OK, Json(dto::category_to_json(&category))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertCategoryRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    // Validation runs through the constructor; the id pins the row being
    // replaced.
    let mut replacement = match Category::new(tenant.tenant_id(), &body.name, body.parent_id) {
        Ok(c) => c,
        Err(e) => return errors::error_response(&e),
    };
    replacement.id = id;
    match services
        .catalog
        .update_category(&tenant.scope(), replacement)
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(dto::category_to_json(&updated))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: CategoryId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };
    // Idempotent: deleting an absent category is still 204.
    match services.catalog.delete_category(&tenant.scope(), id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error(e),
    }
}
