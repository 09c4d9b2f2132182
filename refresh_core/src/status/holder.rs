use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use super::observer::StatusObserver;
use super::snapshot::StatusSnapshot;
use crate::types::types::RefreshPhase;

/// Handle returned by [`StatusHolder::add_observer`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Holds the current status string and publishes every write.
///
/// The value lives inside a `watch` channel, so async consumers can await
/// changes through [`StatusHolder::watch`] while synchronous observers are
/// called inline by the writer.
///
/// # Lifecycle
///
/// | Call                 | Effect                                            |
/// |----------------------|---------------------------------------------------|
/// | `new(initial)`       | value = `initial`, `seq = 0`                      |
/// | `set_status(v)`      | overwrite, `seq += 1`, notify observers           |
/// | `publish(v, p, id)`  | same as `set_status`, tagged with phase + id      |
/// | `get_status()`       | read current value, no side effects               |
///
/// Writes are expected to come from one logical execution context. Each
/// write plus its notification runs under `write_lock`, so observers see
/// writes in `seq` order even with concurrent writers. Observers must not
/// write the status from inside `on_status`.
pub struct StatusHolder {
    tx: watch::Sender<StatusSnapshot>,
    write_lock: Mutex<()>,
    observers: Mutex<Vec<(ObserverId, Arc<dyn StatusObserver>)>>,
    next_observer_id: AtomicU64,
}

impl StatusHolder {
    pub fn new<S: Into<String>>(initial: S) -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::initial(initial));
        Self {
            tx,
            write_lock: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
            next_observer_id: AtomicU64::new(1),
        }
    }

    /// Overwrite the current value and synchronously notify observers.
    pub fn set_status<S: Into<String>>(&self, value: S) -> StatusSnapshot {
        self.write(value.into(), None, None)
    }

    /// Write path used by refresh invocations: the value carries the phase
    /// it represents and the id of the invocation that reached it.
    pub fn publish<S: Into<String>>(
        &self,
        value: S,
        phase: RefreshPhase,
        invocation: &str,
    ) -> StatusSnapshot {
        self.write(value.into(), Some(phase), Some(invocation.to_string()))
    }

    pub fn get_status(&self) -> String {
        self.tx.borrow().value.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    /// Register an observer. It sees every write made after this call.
    pub fn add_observer(&self, observer: Arc<dyn StatusObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        id
    }

    /// Unregister an observer. Returns `false` if it was already gone.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// A receiver that yields every subsequent snapshot.
    pub fn watch(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    /// Wait until the current snapshot satisfies `predicate` and return it.
    /// Returns immediately if it already does.
    pub async fn wait_for<F>(&self, mut predicate: F) -> StatusSnapshot
    where
        F: FnMut(&StatusSnapshot) -> bool,
    {
        let mut rx = self.tx.subscribe();
        loop {
            {
                let current = rx.borrow_and_update();
                if predicate(&*current) {
                    return (*current).clone();
                }
            }
            // The sender lives in `self`, so `changed` only fails once the
            // holder is gone, which the borrow on `self` rules out.
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    fn write(
        &self,
        value: String,
        phase: Option<RefreshPhase>,
        invocation: Option<String>,
    ) -> StatusSnapshot {
        let _write = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut published = None;
        self.tx.send_modify(|current| {
            current.seq += 1;
            current.value = value;
            current.phase = phase;
            current.invocation = invocation;
            published = Some(current.clone());
        });
        let snapshot = published.unwrap_or_else(|| self.snapshot());

        // Clone the list so observers can (un)subscribe while being notified.
        let observers: Vec<Arc<dyn StatusObserver>> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in &observers {
            observer.on_status(&snapshot);
        }

        snapshot
    }
}

impl Default for StatusHolder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INITIAL_STATUS)
    }
}
