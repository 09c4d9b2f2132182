use super::snapshot::StatusSnapshot;

/// Trait for anything that wants to observe status writes.
///
/// The `StatusHolder` calls `on_status` on every registered observer right
/// after each write, on the task that performed the write. Implementations
/// must not block; observers that need to do async work should forward the
/// snapshot to a channel.
pub trait StatusObserver: Send + Sync + 'static {
    fn on_status(&self, snapshot: &StatusSnapshot);
}

/// Any `Fn(&StatusSnapshot)` closure is an observer.
impl<F> StatusObserver for F
where
    F: Fn(&StatusSnapshot) + Send + Sync + 'static,
{
    fn on_status(&self, snapshot: &StatusSnapshot) {
        self(snapshot)
    }
}

/// Writes every status change to the `log` facade.
pub struct LogStatusObserver {
    label: String,
}

impl LogStatusObserver {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self { label: label.into() }
    }
}

impl StatusObserver for LogStatusObserver {
    fn on_status(&self, snapshot: &StatusSnapshot) {
        log::info!(
            "[{}] seq={} phase={:?} invocation={} status=\"{}\"",
            self.label,
            snapshot.seq,
            snapshot.phase,
            snapshot.invocation.as_deref().unwrap_or("-"),
            snapshot.value
        );
    }
}
