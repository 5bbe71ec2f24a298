//! Stock movement journal.
//!
//! Movements are an append-only record of quantity changes against products.
//! There is no balance arithmetic here: the journal is the source of truth
//! and readers derive whatever aggregates they need.

pub mod movement;

pub use movement::{MovementId, StockMovement};
