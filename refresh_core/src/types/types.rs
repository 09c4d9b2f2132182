use serde::{Deserialize, Serialize};

/// Lifecycle of a single refresh invocation.
///
/// `Idle → Entered → (Left | Failed)`. `Left` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    Idle,
    Entered,
    Left,
    Failed,
}

impl RefreshPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RefreshPhase::Left | RefreshPhase::Failed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("owner released before invocation")]
    OwnerReleased,
    #[error("refresh task failed: {0}")]
    TaskFailed(String),
}

impl RefreshError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RefreshError::Cancelled)
    }
}

impl From<tokio::task::JoinError> for RefreshError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            RefreshError::Cancelled
        } else {
            RefreshError::TaskFailed(err.to_string())
        }
    }
}
