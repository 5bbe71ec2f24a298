//! Customer and supplier endpoints. One party directory backs both; each
//! route group fixes the kind, so /customers can never read or mutate a
//! supplier.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_parties::{Party, PartyId, PartyKind};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn customers_router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

pub fn suppliers_router() -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    list_parties(services, tenant, PartyKind::Customer).await
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpsertPartyRequest>,
) -> axum::response::Response {
    create_party(services, tenant, principal, PartyKind::Customer, body).await
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    get_party(services, tenant, PartyKind::Customer, id).await
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertPartyRequest>,
) -> axum::response::Response {
    update_party(services, tenant, principal, PartyKind::Customer, id, body).await
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    delete_party(services, tenant, principal, PartyKind::Customer, id).await
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    list_parties(services, tenant, PartyKind::Supplier).await
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpsertPartyRequest>,
) -> axum::response::Response {
    create_party(services, tenant, principal, PartyKind::Supplier, body).await
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    get_party(services, tenant, PartyKind::Supplier, id).await
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertPartyRequest>,
) -> axum::response::Response {
    update_party(services, tenant, principal, PartyKind::Supplier, id, body).await
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    delete_party(services, tenant, principal, PartyKind::Supplier, id).await
}

async fn list_parties(
    services: Arc<AppServices>,
    tenant: TenantContext,
    kind: PartyKind,
) -> axum::response::Response {
    match services.parties.list_parties(&tenant.scope(), kind).await {
        Ok(parties) => {
            errors::items_response(parties.iter().map(dto::party_to_json).collect::<Vec<_>>())
        }
        Err(e) => errors::store_error(e),
    }
}

async fn create_party(
    services: Arc<AppServices>,
    tenant: TenantContext,
    principal: PrincipalContext,
    kind: PartyKind,
    body: dto::UpsertPartyRequest,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let party = match Party::new(tenant.tenant_id(), kind, &body.name, body.email, body.phone) {
        Ok(p) => p,
        Err(e) => return errors::error_response(&e),
    };
    match services.parties.insert_party(&tenant.scope(), party).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::party_to_json(&created))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

/// Fetch one party, treating a kind mismatch as absence.
async fn find_party_of_kind(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    id: PartyId,
) -> Result<Option<Party>, axum::response::Response> {
    match services.parties.get_party(&tenant.scope(), id).await {
        Ok(found) => Ok(found.filter(|p| p.kind == kind)),
        Err(e) => Err(errors::store_error(e)),
    }
}

async fn get_party(
    services: Arc<AppServices>,
    tenant: TenantContext,
    kind: PartyKind,
    id: String,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid party id");
        }
    };
    match find_party_of_kind(&services, &tenant, kind, id).await {
        Ok(Some(party)) => (StatusCode::OK, Json(dto::party_to_json(&party))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "party not found"),
        Err(resp) => resp,
    }
}

async fn update_party(
    services: Arc<AppServices>,
    tenant: TenantContext,
    principal: PrincipalContext,
    kind: PartyKind,
    id: String,
    body: dto::UpsertPartyRequest,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid party id");
        }
    };
    let existing = match find_party_of_kind(&services, &tenant, kind, id).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "party not found");
        }
        Err(resp) => return resp,
    };
    let mut replacement = match Party::new(
        tenant.tenant_id(),
        existing.kind,
        &body.name,
        body.email,
        body.phone,
    ) {
        Ok(p) => p,
        Err(e) => return errors::error_response(&e),
    };
    replacement.id = existing.id;
    match services.parties.update_party(&tenant.scope(), replacement).await {
        Ok(updated) => (StatusCode::OK, Json(dto::party_to_json(&updated))).into_response(),
        Err(e) => errors::store_error(e),
    }
}

async fn delete_party(
    services: Arc<AppServices>,
    tenant: TenantContext,
    principal: PrincipalContext,
    kind: PartyKind,
    id: String,
) -> axum::response::Response {
    if let Err(resp) = authz::require_catalog_manager(&principal) {
        return resp;
    }
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid party id");
        }
    };
    // A kind mismatch deletes nothing; the delete stays idempotent either
    // way.
    match find_party_of_kind(&services, &tenant, kind, id).await {
        Ok(Some(party)) => {
            match services
                .parties
                .soft_delete_party(&tenant.scope(), party.id)
                .await
            {
                Ok(_) => StatusCode::NO_CONTENT.into_response(),
                Err(e) => errors::store_error(e),
            }
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
