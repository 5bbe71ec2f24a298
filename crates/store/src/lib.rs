//! Storage layer: scoped repositories over swappable backends.
//!
//! Every read is narrowed and every write is stamped according to the
//! [`FilterSet`](stockroom_core::FilterSet) the record type declares; the
//! narrowing predicate ([`isolation`]) and the stamping rules
//! ([`interceptor`]) each live in exactly one place, shared by all backends.
//! Handlers and flows never filter by tenant themselves.
//!
//! Two backends: an in-memory store (tests, dev) and a Postgres store behind
//! the `postgres` feature.

pub mod auth_flows;
pub mod error;
pub mod interceptor;
pub mod isolation;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod seed;
pub mod traits;

#[cfg(test)]
mod integration_tests;

pub use auth_flows::{AuthFlows, AuthSession};
pub use error::{StoreError, StoreResult};
pub use interceptor::{stamp_insert, stamp_update};
pub use isolation::visible;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use traits::{CatalogStore, IdentityStore, MovementStore, PartyStore, TenantDirectory};
