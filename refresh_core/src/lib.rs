//! Pull-to-refresh cancellation lab.
//!
//! A [`StatusHolder`] publishes a single status string. A [`RefreshAction`]
//! writes `enter`, waits, then writes `leave` (or the failure that cut the
//! wait short). A [`RefreshControl`] plays the pull-to-refresh control and
//! launches the action under one of the [`LaunchStrategy`] variants, which
//! decide whether dismissing the refresh indicator cancels the action.

pub mod config;
pub mod refresher;
pub mod status;
pub mod types;
pub mod view;

pub use config::{ConfigError, RefreshConfig};
pub use refresher::refresh_action::RefreshAction;
pub use refresher::refresh_control::{CycleReport, RefreshControl, RefreshCycle};
pub use refresher::strategy::launch_strategy::{DismissPolicy, LaunchStrategy};
pub use refresher::strategy::refresh_handler::RefreshHandler;
pub use status::{RecordingObserver, StatusHolder, StatusObserver, StatusSnapshot};
pub use types::types::{RefreshError, RefreshPhase};
pub use view::{Capture, RefreshView, UnknownCapture};
