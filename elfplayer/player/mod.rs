pub mod chrome;
pub mod snapshot;
pub mod source;
pub mod state;

pub use chrome::{ChromeSync, FullscreenHandle, SnapshotSink};
pub use snapshot::UiSnapshot;
pub use source::PlaybackSource;
pub use state::PlaybackState;
