use crate::error::App;
use crate::player::state::PlaybackState;
use async_trait::async_trait;
use tokio::sync::watch;

/// Capability set a playback backend exposes to the chrome.
///
/// Implementations bridge one concrete video technology (a local pipeline,
/// an embedded frame) and are responsible for translating backend-specific
/// state codes into [`PlaybackState`]. All methods are individually
/// idempotent. `play` and `pause` are commands, not queries: their effect
/// becomes visible through `state` or the time-update channel, not through
/// their return value.
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Current playback position in seconds. Zero while unknown.
    async fn current_time(&self) -> Result<f64, App>;

    /// Total duration in seconds, `None` until metadata is loaded.
    async fn duration(&self) -> Result<Option<f64>, App>;

    /// Current volume as a fraction in `[0, 1]`.
    async fn volume(&self) -> Result<f64, App>;

    /// Set the volume; the fraction arrives already clamped to `[0, 1]`.
    async fn set_volume(&self, fraction: f64) -> Result<(), App>;

    async fn play(&self) -> Result<(), App>;

    async fn pause(&self) -> Result<(), App>;

    /// Jump to a position. Out-of-range requests are clamped into
    /// `[0, duration]` rather than failing; scrubbing past the end lands on
    /// the end.
    async fn seek(&self, seconds: f64) -> Result<(), App>;

    async fn state(&self) -> Result<PlaybackState, App>;

    /// Channel carrying the latest playback position, for backends that
    /// report time on their own cadence. Polling-only backends return
    /// `None`.
    fn time_updates(&self) -> Option<watch::Receiver<f64>> {
        None
    }
}
