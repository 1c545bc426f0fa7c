//! Per-name lock table guarding the define transition.

use parking_lot::{Mutex, ReentrantMutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Hands out one lock per name. Slots are created on demand and kept for the
/// loader's lifetime, matching the append-only resolution cache.
///
/// Locks are reentrant so a definer that resolves the name it is defining
/// does not deadlock; the loader detects that re-entry and refuses it.
#[derive(Debug, Default)]
pub struct NameLocks {
    slots: Mutex<HashMap<String, Arc<ReentrantMutex<()>>>>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock slot for `name`; the caller holds `slot.lock()` while defining.
    pub fn slot(&self, name: &str) -> Arc<ReentrantMutex<()>> {
        let mut slots = self.slots.lock();
        slots
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(ReentrantMutex::new(())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
