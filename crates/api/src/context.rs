//! Per-request contexts inserted by the middleware stack.

use stockroom_auth::UserId;
use stockroom_core::{Scope, TenantId};

/// The resolved tenant of a request.
///
/// Present on every tenant-scoped route; inserted by `resolve_tenant` after
/// the header names an existing, active tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The scope every store call of this request runs under.
    pub fn scope(&self) -> Scope {
        Scope::tenant(self.tenant_id)
    }
}

/// The authenticated identity of a request, from verified access claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    email: String,
    roles: Vec<String>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, email: String, roles: Vec<String>) -> Self {
        Self {
            user_id,
            email,
            roles,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}
