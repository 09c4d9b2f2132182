use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use refresh_core::status::{StatusObserver, StatusSnapshot};
use refresh_core::types::types::RefreshPhase;

/// Renders the current status of one scenario as an indicatif spinner line.
///
/// The spinner ticks while the refresh is in flight and is finished (or
/// abandoned, on failure) at the terminal write.
pub struct TerminalStatusObserver {
    bar: ProgressBar,
}

impl TerminalStatusObserver {
    pub fn new(multi: &MultiProgress, label: &str, initial: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        // The template is a literal; fall back to the default style rather than fail.
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:>18.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_prefix(format!("[{}]", label));
        bar.set_message(initial.to_string());
        Self { bar }
    }
}

impl StatusObserver for TerminalStatusObserver {
    fn on_status(&self, snapshot: &StatusSnapshot) {
        match snapshot.phase {
            Some(RefreshPhase::Entered) => {
                self.bar.enable_steady_tick(Duration::from_millis(100));
                self.bar.set_message(snapshot.value.clone());
            }
            Some(RefreshPhase::Left) => {
                self.bar.finish_with_message(format!("{} ✔", snapshot.value));
            }
            Some(RefreshPhase::Failed) => {
                self.bar.abandon_with_message(format!("{} ✘", snapshot.value));
            }
            Some(RefreshPhase::Idle) | None => {
                self.bar.set_message(snapshot.value.clone());
            }
        }
    }
}
