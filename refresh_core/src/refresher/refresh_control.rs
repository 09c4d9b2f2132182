use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::refresher::strategy::launch_strategy::{DismissPolicy, LaunchStrategy};
use crate::refresher::strategy::refresh_handler::RefreshHandler;
use crate::status::holder::{ObserverId, StatusHolder};
use crate::status::snapshot::StatusSnapshot;
use crate::types::types::RefreshError;

/// Stand-in for a pull-to-refresh control.
///
/// Each `pull()` starts a cycle in its own task with its own cancellation
/// token (the refresh indicator). How the handler relates to that token is
/// decided by the `LaunchStrategy`.
pub struct RefreshControl {
    handler: Arc<dyn RefreshHandler>,
    strategy: LaunchStrategy,
    dismiss_policy: DismissPolicy,
    status: Option<Arc<StatusHolder>>,
}

impl RefreshControl {
    pub fn new(handler: Arc<dyn RefreshHandler>, strategy: LaunchStrategy) -> Self {
        Self {
            handler,
            strategy,
            dismiss_policy: DismissPolicy::Manual,
            status: None,
        }
    }

    /// Attach the holder the control watches for `DismissPolicy::OnPublish`.
    pub fn with_status(mut self, status: Arc<StatusHolder>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dismiss_policy(mut self, policy: DismissPolicy) -> Self {
        self.dismiss_policy = policy;
        self
    }

    /// Start a refresh cycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn pull(&self) -> RefreshCycle {
        let cycle_id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        let strategy = self.strategy;

        // Dismiss-on-publish: the observer lives exactly as long as the cycle.
        let subscription = match (self.dismiss_policy, &self.status) {
            (DismissPolicy::OnPublish, Some(status)) => {
                let dismiss = token.clone();
                let id = status.add_observer(Arc::new(move |_: &StatusSnapshot| dismiss.cancel()));
                Some(DismissSubscription {
                    status: Arc::clone(status),
                    id,
                })
            }
            (DismissPolicy::OnPublish, None) => {
                log::warn!(
                    "[RefreshControl] cycle={}: dismiss-on-publish requested without a status holder, falling back to manual",
                    cycle_id
                );
                None
            }
            (DismissPolicy::Manual, _) => None,
        };

        log::info!(
            "[RefreshControl] cycle={}: pull strategy={} dismiss_policy={:?}",
            cycle_id,
            strategy,
            self.dismiss_policy
        );

        let handler = Arc::clone(&self.handler);
        let task_token = token.clone();
        let task_cycle_id = cycle_id.clone();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let result = run_cycle(handler, strategy, task_token.clone()).await;
            drop(subscription);

            let elapsed = started.elapsed();
            let dismissed = task_token.is_cancelled();
            match &result {
                Ok(_) => log::info!(
                    "[RefreshControl] cycle={}: done strategy={} elapsed={:?} dismissed={}",
                    task_cycle_id,
                    strategy,
                    elapsed,
                    dismissed
                ),
                Err(e) => log::error!(
                    "[RefreshControl] cycle={}: failed strategy={}: {}",
                    task_cycle_id,
                    strategy,
                    e
                ),
            }

            result.map(|detached| CycleReport {
                cycle_id: task_cycle_id,
                strategy,
                elapsed,
                dismissed,
                detached,
            })
        });

        RefreshCycle {
            id: cycle_id,
            token,
            handle,
        }
    }
}

/// The trigger body. Returns the handle of a detached unit that the cycle
/// did not wait for, if any.
async fn run_cycle(
    handler: Arc<dyn RefreshHandler>,
    strategy: LaunchStrategy,
    token: CancellationToken,
) -> Result<Option<JoinHandle<()>>, RefreshError> {
    if strategy.propagates_cancellation() {
        handler.refresh(token).await;
        return Ok(None);
    }

    let unit = tokio::spawn(async move {
        handler.refresh(CancellationToken::new()).await;
    });
    if strategy.awaits_handler() {
        unit.await?;
        Ok(None)
    } else {
        Ok(Some(unit))
    }
}

/// Dismiss-on-publish observer registration, removed when the cycle task
/// ends on any path, including a panicking handler.
struct DismissSubscription {
    status: Arc<StatusHolder>,
    id: ObserverId,
}

impl Drop for DismissSubscription {
    fn drop(&mut self) {
        self.status.remove_observer(self.id);
    }
}

/// A running refresh cycle, i.e. a visible refresh indicator.
pub struct RefreshCycle {
    id: String,
    token: CancellationToken,
    handle: JoinHandle<Result<CycleReport, RefreshError>>,
}

impl RefreshCycle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dismiss the indicator: cancel the cycle's token. Only handlers that
    /// share that token observe it.
    pub fn dismiss(&self) {
        log::debug!("[RefreshCycle] cycle={}: dismiss", self.id);
        self.token.cancel();
    }

    pub fn is_dismissed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the trigger side has already reported completion.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the trigger side to report completion.
    pub async fn finished(self) -> Result<CycleReport, RefreshError> {
        self.handle.await?
    }
}

/// What the trigger side saw when its cycle completed.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: String,
    pub strategy: LaunchStrategy,
    /// Time from cycle start until the trigger reported completion.
    pub elapsed: Duration,
    /// Whether the cycle's token had been cancelled by then.
    pub dismissed: bool,
    /// The still-running unit for `LaunchStrategy::Detached`.
    pub detached: Option<JoinHandle<()>>,
}

impl CycleReport {
    /// Wait for a detached unit, if the cycle left one behind.
    pub async fn join_detached(&mut self) -> Result<(), RefreshError> {
        if let Some(unit) = self.detached.take() {
            unit.await?;
        }
        Ok(())
    }
}
