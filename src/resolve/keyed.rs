//! Per-key async mutual exclusion.

use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
use tokio::sync::OwnedMutexGuard;

struct Slot {
    mutex: Arc<tokio::sync::Mutex<()>>,
    /// Callers holding or waiting on `mutex`
    users: usize,
}

/// A table of async mutexes created on demand and dropped once unused.
///
/// Holding the guard for a key serializes every other `lock` call on the
/// same key; distinct keys never contend.
#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

/// Counts one caller against a key until dropped, whether or not the
/// mutex was ever acquired.
struct Registration<'a> {
    owner: &'a KeyedLocks,
    key: String,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

pub struct KeyGuard<'a> {
    // Field order matters: the mutex is released before the slot is released.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: String) -> KeyGuard<'_> {
        let (mutex, registration) = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
                mutex: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            (
                Arc::clone(&slot.mutex),
                Registration { owner: self, key },
            )
        };

        let guard = mutex.lock_owned().await;
        KeyGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Keys currently held or waited on
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
