//! Entity trait and audit fields shared by every stored record.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Audit timestamps carried by every record.
///
/// The write path owns these: `created_at` is overwritten on insert and
/// `updated_at` is set on every modification. Entity constructors fill in a
/// provisional `created_at` that the store replaces at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditStamp {
    pub fn now() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
