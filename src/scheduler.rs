//! Delayed-task scheduler
//!
//! Events are scheduled under a key and delivered on an mpsc channel once
//! their delay elapses. The timer tasks never touch application state: whoever
//! owns the receiving half applies the events, so state keeps a single owner.
//! Every task scheduled under a key can be cancelled before it fires.

use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Channel capacity used by [`DelayedScheduler::new`]
pub const DEFAULT_CAPACITY: usize = 100;

pub struct DelayedScheduler<K, E> {
    tx: mpsc::Sender<E>,
    tasks: HashMap<K, Vec<JoinHandle<()>>>,
}

impl<K, E> DelayedScheduler<K, E>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    E: Send + 'static,
{
    /// Create a scheduler and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::Receiver<E>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<E>) {
        let (tx, rx) = mpsc::channel(capacity);
        let scheduler = DelayedScheduler {
            tx,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }

    /// Deliver `event` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, key: K, delay: Duration, event: E) {
        let tx = self.tx.clone();
        let key_for_log = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).await.is_err() {
                // Receiver is gone, the session has ended
                debug!("Dropping scheduled event for {:?}: receiver closed", key_for_log);
            }
        });

        self.prune_finished();
        self.tasks.entry(key).or_default().push(handle);
    }

    /// Drop handles of tasks that already fired, and keys left with none
    fn prune_finished(&mut self) {
        self.tasks.retain(|_, handles| {
            handles.retain(|h| !h.is_finished());
            !handles.is_empty()
        });
    }

    /// Number of keys that still have unfinished tasks
    pub fn tracked_keys(&mut self) -> usize {
        self.prune_finished();
        self.tasks.len()
    }

    /// Abort every pending task for `key`, returning how many were still pending
    pub fn cancel(&mut self, key: &K) -> usize {
        let Some(handles) = self.tasks.remove(key) else {
            return 0;
        };

        let mut cancelled = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!("Cancelled {} scheduled task(s) for {:?}", cancelled, key);
        }
        cancelled
    }

    pub fn cancel_all(&mut self) -> usize {
        let keys: Vec<K> = self.tasks.keys().cloned().collect();
        let cancelled: usize = keys.iter().map(|k| self.cancel(k)).sum();
        if cancelled > 0 {
            warn!("Aborted {} scheduled task(s) that had not fired yet", cancelled);
        }
        cancelled
    }

    /// Number of tasks for `key` that have not completed
    pub fn pending(&self, key: &K) -> usize {
        self.tasks
            .get(key)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }
}

impl<K, E> Drop for DelayedScheduler<K, E> {
    fn drop(&mut self) {
        for handle in self.tasks.values().flatten() {
            handle.abort();
        }
    }
}
