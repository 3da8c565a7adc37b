use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::types::Signal;

#[derive(Debug, Default)]
struct SignalLog {
    /// Insertion order, oldest first. Reads reverse it.
    signals: Vec<Signal>,
    index: HashMap<Uuid, usize>,
}

/// In-memory signal store, newest first on every read.
///
/// Clones share the same underlying log. Each method takes the lock once, so
/// a reader never observes a half-applied `update`.
#[derive(Clone, Debug, Default)]
pub struct SignalStore {
    inner: Arc<Mutex<SignalLog>>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, SignalLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, signal: Signal) {
        let mut log = self.log();
        let position = log.signals.len();
        log.index.insert(signal.id, position);
        log.signals.push(signal);
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<Signal> {
        let log = self.log();
        log.index.get(id).map(|&pos| log.signals[pos].clone())
    }

    /// Apply `f` to the stored signal in place. Returns `None` when the id is
    /// unknown.
    pub fn update<T>(&self, id: &Uuid, f: impl FnOnce(&mut Signal) -> T) -> Option<T> {
        let mut log = self.log();
        let pos = *log.index.get(id)?;
        log.signals.get_mut(pos).map(f)
    }

    pub fn list_all(&self) -> Vec<Signal> {
        self.log().signals.iter().rev().cloned().collect()
    }

    pub fn list_pending(&self) -> Vec<Signal> {
        self.log()
            .signals
            .iter()
            .rev()
            .filter(|s| s.is_pending())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log().signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(total, pending)` read under one lock.
    pub fn counts(&self) -> (usize, usize) {
        let log = self.log();
        let pending = log.signals.iter().filter(|s| s.is_pending()).count();
        (log.signals.len(), pending)
    }
}
