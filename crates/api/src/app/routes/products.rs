use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_catalog::{Product, ProductId, ProductVariant};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/variants", get(list_variants).post(create_variant))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.catalog.list_products(&tenant.scope()).await {
        Ok(products) => {
            errors::items_response(products.iter().map(dto::product_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpsertProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let mut product = match Product::new(
        tenant.tenant_id(),
        &body.sku,
        &body.name,
        body.description,
        body.category_id,
        body.unit_id,
    ) {
        Ok(p) => p,
        Err(e) => return errors::error_response(&e),
    };
    if let Some(active) = body.is_active {
        product.active = active;
    }
    match services.catalog.insert_product(&tenant.scope(), product).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::product_to_json(&created))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    match services.catalog.get_product(&tenant.scope(), id).await {
        Ok(Some(product)) => {
            (StatusCode::OK, Json(dto::product_to_json(&product))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    let mut replacement = match Product::new(
        tenant.tenant_id(),
        &body.sku,
        &body.name,
        body.description,
        body.category_id,
        body.unit_id,
    ) {
        Ok(p) => p,
        Err(e) => return errors::error_response(&e),
    };
    replacement.id = id;
    if let Some(active) = body.is_active {
        replacement.active = active;
    }
    match services
        .catalog
        .update_product(&tenant.scope(), replacement)
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(dto::product_to_json(&updated))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    // Soft delete: the row keeps claiming its SKU but drops out of reads.
    match services
        .catalog
        .soft_delete_product(&tenant.scope(), id)
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error(e),
    }
}

pub async fn list_variants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    match services.catalog.list_variants_of(&tenant.scope(), id).await {
        Ok(variants) => {
            errors::items_response(variants.iter().map(dto::variant_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

pub async fn create_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertVariantRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    // The parent must be visible in this tenant before a variant may hang
    // off it.
    match services.catalog.get_product(&tenant.scope(), product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::store_error(e),
    }
    let mut variant = match ProductVariant::new(
        tenant.tenant_id(),
        product_id,
        body.sku,
        body.barcode,
        body.attributes,
    ) {
        Ok(v) => v,
        Err(e) => return errors::error_response(&e),
    };
    if let Some(active) = body.is_active {
        variant.active = active;
    }
    match services.catalog.insert_variant(&tenant.scope(), variant).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::variant_to_json(&created))).into_response(),
        Err(e) => errors::store_error(e),
    }
}
