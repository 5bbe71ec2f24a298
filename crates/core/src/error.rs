//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Every failure a caller can act on has its own variant; transport layers
/// map these to status codes in exactly one place. Infrastructure failures
/// are folded into [`DomainError::Internal`] at the boundary so nothing
/// storage-specific leaks upward.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request carried no tenant identifier.
    #[error("tenant header missing")]
    MissingTenant,

    /// The request carried a tenant identifier that does not parse.
    #[error("tenant header malformed")]
    MalformedTenant,

    /// The tenant identifier matches no active tenant.
    #[error("tenant not found")]
    TenantNotFound,

    /// Registration attempted against a tenant that already has users.
    #[error("tenant already initialized")]
    TenantAlreadyInitialized,

    /// Login failed. Deliberately covers unknown user, inactive user, and
    /// wrong password alike so accounts cannot be enumerated.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The presented refresh token is unknown, revoked, or expired.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No valid credential accompanied the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Valid identity, insufficient role.
    #[error("unauthorized")]
    Unauthorized,

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Unexpected failure. Logged with a correlation id; surfaced generically.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
