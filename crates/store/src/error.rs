use thiserror::Error;

use stockroom_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation error.
///
/// Infrastructure outcomes (constraints, missing rows, backend failures) as
/// opposed to domain rule violations. Race outcomes that callers must handle
/// are values, not panics: a lost uniqueness race surfaces as
/// `UniqueViolation` from either backend, carrying the same constraint name
/// the Postgres schema uses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unique(constraint: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                DomainError::conflict(duplicate_message(&constraint))
            }
            StoreError::NotFound => DomainError::NotFound,
            StoreError::Backend(message) => DomainError::internal(message),
        }
    }
}

/// Client-facing wording per constraint; falls back to a generic message so
/// an unmapped constraint never leaks index names to clients.
fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "users_tenant_email_key" => "an account with this email already exists",
        "categories_tenant_name_key" => "a category with this name already exists",
        "uoms_tenant_code_key" => "a unit with this code already exists",
        "products_tenant_sku_key" | "product_variants_tenant_sku_key" => {
            "a product or variant with this SKU already exists"
        }
        "product_variants_tenant_barcode_key" => {
            "a variant with this barcode already exists"
        }
        "roles_name_key" => "a role with this name already exists",
        _ => "a record with the same unique value already exists",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err: DomainError = StoreError::unique("products_tenant_sku_key").into();
        match err {
            DomainError::Conflict(m) => {
                assert_eq!(m, "a product or variant with this SKU already exists")
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn unmapped_constraint_stays_generic() {
        let err: DomainError = StoreError::unique("some_internal_idx").into();
        match err {
            DomainError::Conflict(m) => {
                assert_eq!(m, "a record with the same unique value already exists")
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn not_found_and_backend_map_through() {
        assert_eq!(DomainError::from(StoreError::NotFound), DomainError::NotFound);
        assert!(matches!(
            DomainError::from(StoreError::backend("boom")),
            DomainError::Internal(_)
        ));
    }
}
