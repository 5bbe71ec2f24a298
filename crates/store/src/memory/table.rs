//! Generic table used by the in-memory backend: rows by id plus a unique
//! index mirroring the constraints the record declares.

use std::collections::HashMap;
use std::hash::Hash;

use stockroom_core::Record;

use crate::error::{StoreError, StoreResult};

/// (constraint name, claimed value) — one slot per uniqueness constraint.
type UniqueSlot = (&'static str, String);

pub(crate) struct MemTable<E>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    rows: HashMap<E::Id, E>,
    unique: HashMap<UniqueSlot, E::Id>,
}

impl<E> MemTable<E>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    pub(crate) fn new() -> Self {
        Self {
            rows: HashMap::new(),
            unique: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, id: &E::Id) -> Option<&E> {
        self.rows.get(id)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    /// Insert a new row, enforcing every unique key the record claims.
    /// Checks all keys before claiming any, so a rejected insert leaves the
    /// index untouched.
    pub(crate) fn insert(&mut self, record: E) -> StoreResult<()> {
        let id = *record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::backend(format!(
                "duplicate id on insert into {}: {id}",
                E::KIND
            )));
        }
        let keys = record.unique_keys();
        for key in &keys {
            if self.unique.contains_key(&(key.constraint, key.value.clone())) {
                return Err(StoreError::unique(key.constraint));
            }
        }
        for key in keys {
            self.unique.insert((key.constraint, key.value), id);
        }
        self.rows.insert(id, record);
        Ok(())
    }

    /// Replace an existing row, releasing its old unique keys and claiming
    /// the new ones. A key held by a different row rejects the replace.
    pub(crate) fn replace(&mut self, record: E) -> StoreResult<()> {
        let id = *record.id();
        let old = self.rows.get(&id).ok_or(StoreError::NotFound)?;
        let old_keys = old.unique_keys();
        let new_keys = record.unique_keys();

        for key in &new_keys {
            if let Some(holder) = self.unique.get(&(key.constraint, key.value.clone())) {
                if *holder != id {
                    return Err(StoreError::unique(key.constraint));
                }
            }
        }
        for key in old_keys {
            self.unique.remove(&(key.constraint, key.value));
        }
        for key in new_keys {
            self.unique.insert((key.constraint, key.value), id);
        }
        self.rows.insert(id, record);
        Ok(())
    }

    /// Remove a row and release its unique keys.
    pub(crate) fn remove(&mut self, id: &E::Id) -> Option<E> {
        let record = self.rows.remove(id)?;
        for key in record.unique_keys() {
            self.unique.remove(&(key.constraint, key.value));
        }
        Some(record)
    }
}

impl<E> Default for MemTable<E>
where
    E: Record,
    E::Id: Copy + Eq + Hash + core::fmt::Display + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
