//! Tenant resolution and bearer authentication.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use stockroom_auth::TokenService;
use stockroom_core::DomainError;
use stockroom_store::TenantDirectory;

use crate::app::errors;
use crate::context::{PrincipalContext, TenantContext};

/// Header naming the tenant a request acts within.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

#[derive(Clone)]
pub struct TenantState {
    pub tenants: Arc<dyn TenantDirectory>,
}

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// Resolve `X-Tenant-Id` strictly: a missing or malformed header is a
/// client error, an unknown or inactive tenant reads as not found. On
/// success a [`TenantContext`] is attached for everything downstream.
pub async fn resolve_tenant(
    State(state): State<TenantState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let raw = req
        .headers()
        .get(TENANT_HEADER)
        .ok_or_else(|| errors::error_response(&DomainError::MissingTenant))?;
    let tenant_id = raw
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| errors::error_response(&DomainError::MalformedTenant))?;

    let tenant = state
        .tenants
        .get_active_tenant(tenant_id)
        .await
        .map_err(|e| errors::error_response(&e.into()))?
        .ok_or_else(|| errors::error_response(&DomainError::TenantNotFound))?;

    req.extensions_mut().insert(TenantContext::new(tenant.id));
    Ok(next.run(req).await)
}

/// Authenticate the bearer access token and attach a [`PrincipalContext`].
///
/// The token must verify and its `tenant` claim must equal the resolved
/// tenant; a valid token for some other tenant does not authenticate here.
pub async fn require_principal(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let tenant = req
        .extensions()
        .get::<TenantContext>()
        .copied()
        .ok_or_else(|| {
            errors::error_response(&DomainError::internal("tenant context missing"))
        })?;

    let token = extract_bearer(req.headers())
        .ok_or_else(|| errors::error_response(&DomainError::Unauthenticated))?;
    let claims = state
        .tokens
        .verify_access(token)
        .map_err(|_| errors::error_response(&DomainError::Unauthenticated))?;
    if claims.tenant != tenant.tenant_id() {
        return Err(errors::error_response(&DomainError::Unauthenticated));
    }

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.email, claims.roles));
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_extraction_requires_the_scheme_and_a_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Token abc"),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer   "),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }
}
