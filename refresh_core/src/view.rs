use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RefreshConfig;
use crate::refresher::refresh_action::RefreshAction;
use crate::refresher::strategy::refresh_handler::RefreshHandler;
use crate::status::holder::StatusHolder;
use crate::types::types::{RefreshError, RefreshPhase};

/// What a refresh handler holds on to between creation and invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capture {
    /// The long-lived view model. Invocation works no matter what happened
    /// to the view.
    Model,
    /// The owning view, weakly. If the view is torn down before the control
    /// invokes the handler, the invocation fails up front.
    Owner,
}

impl Capture {
    pub fn as_str(self) -> &'static str {
        match self {
            Capture::Model => "model",
            Capture::Owner => "owner",
        }
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown capture {0:?} (expected model or owner)")]
pub struct UnknownCapture(pub String);

impl FromStr for Capture {
    type Err = UnknownCapture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(Capture::Model),
            "owner" => Ok(Capture::Owner),
            _ => Err(UnknownCapture(s.to_string())),
        }
    }
}

/// The owning view: holds the view model and hands out refresh handlers.
pub struct RefreshView {
    model: Arc<RefreshAction>,
}

impl RefreshView {
    pub fn new(config: RefreshConfig) -> Arc<Self> {
        Arc::new(Self {
            model: Arc::new(RefreshAction::new(config)),
        })
    }

    pub fn status(&self) -> &Arc<StatusHolder> {
        self.model.status()
    }

    /// Build the handler a refresh control will invoke later.
    pub fn handler(self: &Arc<Self>, capture: Capture) -> Arc<dyn RefreshHandler> {
        match capture {
            Capture::Model => Arc::clone(&self.model) as Arc<dyn RefreshHandler>,
            Capture::Owner => Arc::new(OwnerHandler {
                owner: Arc::downgrade(self),
                status: Arc::downgrade(self.model.status()),
                config: self.model.config().clone(),
            }),
        }
    }
}

/// Handler that reaches the model through a weak reference to its view.
struct OwnerHandler {
    owner: Weak<RefreshView>,
    status: Weak<StatusHolder>,
    config: RefreshConfig,
}

#[async_trait]
impl RefreshHandler for OwnerHandler {
    async fn refresh(&self, cancel: CancellationToken) {
        match self.owner.upgrade() {
            Some(view) => {
                view.model.run(cancel).await;
            }
            None => {
                let err = RefreshError::OwnerReleased;
                let message = self.config.format_status(&err);
                log::warn!("[OwnerHandler] {}", message);
                if let Some(status) = self.status.upgrade() {
                    let invocation = Uuid::new_v4().to_string();
                    status.publish(message, RefreshPhase::Failed, &invocation);
                }
            }
        }
    }
}
