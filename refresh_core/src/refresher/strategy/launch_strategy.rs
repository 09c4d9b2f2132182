use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// How a refresh cycle runs its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchStrategy {
    /// Awaited inline with the cycle's own token. Dismissing the cycle
    /// cancels the handler.
    DirectChild,
    /// Spawned with a fresh token and not awaited. The cycle finishes right
    /// away and dismissal never reaches the handler.
    Detached,
    /// Spawned with a fresh token, then joined. The cycle finishes only after
    /// the handler does, and dismissal never reaches the handler.
    DetachedAwaited,
}

impl LaunchStrategy {
    pub const ALL: [LaunchStrategy; 3] = [
        LaunchStrategy::DirectChild,
        LaunchStrategy::Detached,
        LaunchStrategy::DetachedAwaited,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LaunchStrategy::DirectChild => "direct-child",
            LaunchStrategy::Detached => "detached",
            LaunchStrategy::DetachedAwaited => "detached-awaited",
        }
    }

    /// Whether dismissing the cycle can cancel the handler's delay.
    pub fn propagates_cancellation(self) -> bool {
        matches!(self, LaunchStrategy::DirectChild)
    }

    /// Whether the cycle waits for the handler before reporting completion.
    pub fn awaits_handler(self) -> bool {
        !matches!(self, LaunchStrategy::Detached)
    }
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown launch strategy {0:?} (expected direct-child, detached or detached-awaited)")]
pub struct UnknownStrategy(pub String);

impl FromStr for LaunchStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct-child" | "direct" => Ok(LaunchStrategy::DirectChild),
            "detached" => Ok(LaunchStrategy::Detached),
            "detached-awaited" | "awaited" => Ok(LaunchStrategy::DetachedAwaited),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// When a refresh control dismisses a running cycle on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissPolicy {
    /// Only an explicit `RefreshCycle::dismiss()` cancels the cycle.
    #[default]
    Manual,
    /// Any status write while the cycle is running dismisses it, the way a
    /// view that re-renders on every published change tears down its
    /// in-flight refresh.
    OnPublish,
}
