use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RefreshConfig;
use crate::refresher::strategy::refresh_handler::RefreshHandler;
use crate::status::holder::StatusHolder;
use crate::types::types::{RefreshError, RefreshPhase};

/// Suspends for `delay` unless `cancel` fires first.
///
/// Cancellation is only observed here. A token that is already cancelled
/// wins over a zero delay.
pub async fn cancellable_delay(
    delay: std::time::Duration,
    cancel: &CancellationToken,
) -> Result<(), RefreshError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RefreshError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// The view model: owns the status holder and runs the three-phase refresh.
///
/// Every invocation writes `"<op>: enter"`, waits `config.delay`, then writes
/// `"<op>: leave"`. If the wait is cancelled the terminal write is
/// `"<op>: <error>"` instead. Nothing is returned as an error; the terminal
/// phase is returned for callers that want it.
pub struct RefreshAction {
    status: Arc<StatusHolder>,
    config: RefreshConfig,
}

impl RefreshAction {
    /// A fresh holder initialised with `config.initial_status`.
    pub fn new(config: RefreshConfig) -> Self {
        let status = Arc::new(StatusHolder::new(config.initial_status.clone()));
        Self { status, config }
    }

    /// Share an existing holder, e.g. one already wired to observers.
    pub fn with_status(status: Arc<StatusHolder>, config: RefreshConfig) -> Self {
        Self { status, config }
    }

    pub fn status(&self) -> &Arc<StatusHolder> {
        &self.status
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Run one invocation to a terminal phase.
    pub async fn run(&self, cancel: CancellationToken) -> RefreshPhase {
        let invocation = Uuid::new_v4().to_string();

        let message = self.config.format_status("enter");
        log::info!("[RefreshAction] invocation={}: {}", invocation, message);
        self.status.publish(message, RefreshPhase::Entered, &invocation);

        match cancellable_delay(self.config.delay, &cancel).await {
            Ok(()) => {
                let message = self.config.format_status("leave");
                log::info!("[RefreshAction] invocation={}: {}", invocation, message);
                self.status.publish(message, RefreshPhase::Left, &invocation);
                RefreshPhase::Left
            }
            Err(err) => {
                let message = self.config.format_status(&err);
                log::warn!("[RefreshAction] invocation={}: {}", invocation, message);
                self.status.publish(message, RefreshPhase::Failed, &invocation);
                RefreshPhase::Failed
            }
        }
    }
}

#[async_trait]
impl RefreshHandler for RefreshAction {
    async fn refresh(&self, cancel: CancellationToken) {
        self.run(cancel).await;
    }
}
