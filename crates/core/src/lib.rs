//! `stockroom-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the error taxonomy, the record capability
//! registry that drives query isolation, and the tenant boundary entity.

pub mod entity;
pub mod error;
pub mod id;
pub mod record;
pub mod scope;
pub mod tenant;

pub use entity::{AuditStamp, Entity};
pub use error::{DomainError, DomainResult};
pub use id::TenantId;
pub use record::{FilterSet, Record, UniqueKey};
pub use scope::Scope;
pub use tenant::Tenant;
