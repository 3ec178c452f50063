//! Keyed cache of materialized types.
//!
//! Every name gets its own slot: a write-once cell plus a lock taken only to
//! fill it. Concurrent requests for a name that is not loaded yet wait for the
//! first one and then share its result, while requests for other names
//! proceed. Reading a filled slot never locks. The outer map lock is held only
//! long enough to find or create a slot.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::types::LoadedType;

#[derive(Default)]
struct Slot {
    cell: OnceLock<Arc<LoadedType>>,
    init: Mutex<()>,
}

#[derive(Default)]
pub struct TypeCache {
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached type for `name`, without waiting. A name that is being
    /// materialized right now reads as not loaded yet.
    pub fn get(&self, name: &str) -> Option<Arc<LoadedType>> {
        self.slots.read().get(name)?.cell.get().cloned()
    }

    /// Return the cached type for `name` or run `init` to produce it.
    ///
    /// `init` runs with the slot for `name` locked and at most once per
    /// successful materialization. If it fails the slot stays empty and the
    /// next caller tries again.
    pub fn get_or_try_insert<E, F>(&self, name: &str, init: F) -> Result<Arc<LoadedType>, E>
    where
        F: FnOnce() -> Result<Arc<LoadedType>, E>,
    {
        let slot = self.slot(name);
        if let Some(existing) = slot.cell.get() {
            return Ok(existing.clone());
        }
        let _guard = slot.init.lock();
        if let Some(existing) = slot.cell.get() {
            return Ok(existing.clone());
        }
        let created = init()?;
        // Only the holder of `init` fills the cell, so this cannot race.
        let _ = slot.cell.set(created.clone());
        Ok(created)
    }

    /// Number of materialized types. Slots still being filled are not counted.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(name) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

impl std::fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCache")
            .field("slots", &self.slots.read().len())
            .finish()
    }
}
