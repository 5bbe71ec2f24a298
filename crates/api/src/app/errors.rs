//! Consistent JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use stockroom_core::DomainError;
use stockroom_store::StoreError;

/// Uniform error body: `{"error": <code>, "message": <text>}`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// The one mapping from domain errors to HTTP responses. Internal failures
/// are logged with a correlation id and surfaced generically; everything
/// else carries its own message.
pub fn error_response(err: &DomainError) -> Response {
    match err {
        DomainError::MissingTenant => {
            json_error(StatusCode::BAD_REQUEST, "missing_tenant", err.to_string())
        }
        DomainError::MalformedTenant => {
            json_error(StatusCode::BAD_REQUEST, "malformed_tenant", err.to_string())
        }
        DomainError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        DomainError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            err.to_string(),
        ),
        DomainError::InvalidRefreshToken => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_refresh_token",
            err.to_string(),
        ),
        DomainError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        DomainError::Unauthorized => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        DomainError::TenantAlreadyInitialized => json_error(
            StatusCode::FORBIDDEN,
            "tenant_already_initialized",
            err.to_string(),
        ),
        DomainError::TenantNotFound => {
            json_error(StatusCode::NOT_FOUND, "tenant_not_found", err.to_string())
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DomainError::Conflict(message) => {
            json_error(StatusCode::CONFLICT, "conflict", message.clone())
        }
        DomainError::Internal(detail) => {
            let correlation = stockroom_observability::correlation_id();
            error!(%correlation, %detail, "internal error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("internal error; reference {correlation}"),
            )
        }
    }
}

/// Store failures map through their domain equivalents.
pub fn store_error(err: StoreError) -> Response {
    error_response(&err.into())
}

/// `200 OK` with a `{"items": [...]}` envelope.
pub fn items_response<T: serde::Serialize>(items: Vec<T>) -> Response {
    (StatusCode::OK, Json(json!({ "items": items }))).into_response()
}
