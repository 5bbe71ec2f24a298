//! Credential endpoints. Register, login, and refresh are anonymous but
//! tenant-resolved; logout requires a bearer token.

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let session = match services
        .flows
        .register(tenant.tenant_id(), &body.email, &body.password, body.full_name)
        .await
    {
        Ok(s) => s,
        Err(e) => return errors::error_response(&e),
    };
    (StatusCode::OK, Json(dto::session_to_json(&session))).into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let session = match services
        .flows
        .login(tenant.tenant_id(), &body.email, &body.password)
        .await
    {
        Ok(s) => s,
        Err(e) => return errors::error_response(&e),
    };
    (StatusCode::OK, Json(dto::session_to_json(&session))).into_response()
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::RefreshRequest>,
) -> axum::response::Response {
    let session = match services
        .flows
        .refresh(tenant.tenant_id(), &body.refresh_token)
        .await
    {
        Ok(s) => s,
        Err(e) => return errors::error_response(&e),
    };
    (StatusCode::OK, Json(dto::session_to_json(&session))).into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services
        .flows
        .logout(tenant.tenant_id(), principal.user_id())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::error_response(&e),
    }
}
