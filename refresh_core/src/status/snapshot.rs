use serde::Serialize;

use crate::types::types::RefreshPhase;

/// One published status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Write counter; the initial placeholder is `0`.
    pub seq: u64,
    pub value: String,
    /// `None` for raw `set_status` writes and the initial placeholder.
    pub phase: Option<RefreshPhase>,
    /// Invocation id of the refresh that wrote this value, if any.
    pub invocation: Option<String>,
}

impl StatusSnapshot {
    pub fn initial<S: Into<String>>(value: S) -> Self {
        Self {
            seq: 0,
            value: value.into(),
            phase: None,
            invocation: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.map(RefreshPhase::is_terminal).unwrap_or(false)
    }
}
