//! Party directory: the customers and suppliers a tenant trades with.

pub mod party;

pub use party::{Party, PartyId, PartyKind};
