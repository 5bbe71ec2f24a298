//! Catalog domain: categories, units of measure, products, and variants.
//!
//! Pure entity types and their invariants; no IO, no HTTP, no storage. All
//! four types are tenant-filtered records; products and variants are
//! additionally soft-deletable.

pub mod category;
pub mod product;
pub mod unit;
pub mod variant;

pub use category::{Category, CategoryId};
pub use product::{Product, ProductId};
pub use unit::{UnitId, UnitOfMeasure};
pub use variant::{ProductVariant, VariantId};
