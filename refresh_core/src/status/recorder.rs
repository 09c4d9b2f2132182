use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::observer::StatusObserver;
use super::snapshot::StatusSnapshot;

/// A recorded status write together with its offset from the recorder's
/// start.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub at_ms: u128,
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
}

/// Keeps every snapshot it is notified of, with a timestamp.
///
/// The holder itself keeps no history; this observer is how the CLI prints
/// a timeline and how tests assert on the exact write sequence. Timestamps
/// come from `tokio::time`, so they follow paused test clocks.
pub struct RecordingObserver {
    started: Instant,
    entries: Mutex<Vec<(Duration, StatusSnapshot)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        self.lock().iter().map(|(_, snap)| snap.clone()).collect()
    }

    /// Just the status strings, in write order.
    pub fn values(&self) -> Vec<String> {
        self.lock().iter().map(|(_, snap)| snap.value.clone()).collect()
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.lock()
            .iter()
            .map(|(at, snap)| TimelineEntry {
                at_ms: at.as_millis(),
                snapshot: snap.clone(),
            })
            .collect()
    }

    /// Offset of the first write whose value equals `value`.
    pub fn offset_of(&self, value: &str) -> Option<Duration> {
        self.lock()
            .iter()
            .find(|(_, snap)| snap.value == value)
            .map(|(at, _)| *at)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.timeline())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Duration, StatusSnapshot)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusObserver for RecordingObserver {
    fn on_status(&self, snapshot: &StatusSnapshot) {
        let at = self.started.elapsed();
        self.lock().push((at, snapshot.clone()));
    }
}
