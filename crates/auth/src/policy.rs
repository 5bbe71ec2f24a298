//! Role-based policy checks applied to gated operations.
//!
//! Pure functions over the role names carried in verified access claims; no
//! storage lookups. Matching is exact, against the canonical built-in names.

use crate::roles::{ADMIN, MANAGER, OWNER};

/// Catalog, party, and movement mutations.
pub fn can_manage_catalog(roles: &[String]) -> bool {
    roles.iter().any(|r| r == OWNER || r == ADMIN || r == MANAGER)
}
