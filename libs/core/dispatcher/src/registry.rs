//! Pending-result registry
//!
//! Maps a correlation id to the one-shot channel its caller is waiting on.
//! Each slot is filled at most once: [`PendingRegistry::complete`] removes
//! the slot before sending, so a second completion for the same id finds
//! nothing and is discarded. The [`PendingGuard`] returned by `register`
//! removes the slot when the caller stops waiting for any reason.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::DispatchError;

pub struct PendingRegistry<T> {
    slots: Mutex<HashMap<Uuid, oneshot::Sender<T>>>,
}

impl<T> PendingRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Register a slot for `correlation_id`.
    ///
    /// The slot lives until it is completed or the returned guard is dropped.
    pub fn register(
        self: &Arc<Self>,
        correlation_id: Uuid,
    ) -> Result<(oneshot::Receiver<T>, PendingGuard<T>), DispatchError> {
        let (tx, rx) = oneshot::channel();
        let mut slots = self.lock();
        if slots.contains_key(&correlation_id) {
            return Err(DispatchError::DuplicateCorrelation(correlation_id));
        }
        slots.insert(correlation_id, tx);

        let guard = PendingGuard {
            registry: Arc::clone(self),
            correlation_id,
        };
        Ok((rx, guard))
    }

    /// Deliver `value` to the caller waiting on `correlation_id`.
    ///
    /// Returns `false` when nobody is waiting any more (timed out, cancelled,
    /// or already completed); the value is dropped in that case.
    pub fn complete(&self, correlation_id: Uuid, value: T) -> bool {
        match self.lock().remove(&correlation_id) {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Drop the slot without a value; the waiting caller sees its channel close.
    pub fn abandon(&self, correlation_id: Uuid) -> bool {
        self.lock().remove(&correlation_id).is_some()
    }

    pub fn contains(&self, correlation_id: Uuid) -> bool {
        self.lock().contains_key(&correlation_id)
    }

    /// Number of callers currently waiting
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every slot, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut slots = self.lock();
        let removed = slots.len();
        slots.clear();
        removed
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, oneshot::Sender<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for PendingRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PendingRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRegistry")
            .field("pending", &self.len())
            .finish()
    }
}

/// Removes its registry slot on drop
pub struct PendingGuard<T> {
    registry: Arc<PendingRegistry<T>>,
    correlation_id: Uuid,
}

impl<T> PendingGuard<T> {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl<T> Drop for PendingGuard<T> {
    fn drop(&mut self) {
        self.registry.abandon(self.correlation_id);
    }
}
