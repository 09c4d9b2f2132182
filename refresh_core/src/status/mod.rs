pub mod holder;
pub mod observer;
pub mod recorder;
pub mod snapshot;

pub use holder::{ObserverId, StatusHolder};
pub use observer::{LogStatusObserver, StatusObserver};
pub use recorder::{RecordingObserver, TimelineEntry};
pub use snapshot::StatusSnapshot;
