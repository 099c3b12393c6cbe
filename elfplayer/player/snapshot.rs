use crate::clock::ZERO_CLOCK;
use crate::player::state::PlaybackState;
use serde::Serialize;

/// Everything the control surface needs to render for one update.
///
/// Produced fresh on every tick and handed to the registered sink; nothing
/// holds on to it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiSnapshot {
    /// Elapsed time, formatted for the clock widget.
    pub current_text: String,
    /// Total duration, formatted for the clock widget.
    pub duration_text: String,
    /// Seek bar fill fraction in `[0, 1]`.
    pub position: f64,
    /// Volume bar fill fraction in `[0, 1]`.
    pub volume: f64,
    pub state: PlaybackState,
    pub fullscreen: bool,
}

impl UiSnapshot {
    /// Snapshot shown while the source has no usable metadata yet.
    #[must_use]
    pub fn placeholder(volume: f64, state: PlaybackState, fullscreen: bool) -> Self {
        Self {
            current_text: ZERO_CLOCK.to_string(),
            duration_text: ZERO_CLOCK.to_string(),
            position: 0.0,
            volume,
            state,
            fullscreen,
        }
    }
}
