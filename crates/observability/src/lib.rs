//! Process-wide telemetry.
//!
//! Binaries call [`init`] once from `main`; library crates only emit
//! `tracing` events and spans and never install subscribers. Instrumented
//! flows record tenant and user ids as span fields, so with the JSON
//! subscriber every event line carries them.

mod setup;

pub use setup::init;

use uuid::Uuid;

/// Opaque id tying an error response to its server-side log line.
pub fn correlation_id() -> String {
    Uuid::now_v7().to_string()
}
