//! Role gates applied at the handler boundary.

use axum::response::Response;

use stockroom_auth::policy;
use stockroom_core::DomainError;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Catalog, party, and movement mutations require a managing role
/// (Owner, Admin, or Manager). Reads are open to any authenticated
/// principal of the tenant.
pub fn require_catalog_manager(principal: &PrincipalContext) -> Result<(), Response> {
    if policy::can_manage_catalog(principal.roles()) {
        Ok(())
    } else {
        Err(errors::error_response(&DomainError::Unauthorized))
    }
}
