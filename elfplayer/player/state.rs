use serde::Serialize;
use std::fmt;

/// The five states a player surface can render.
///
/// `Ended` does not advance on its own; leaving it takes an explicit restart
/// (seek back to zero and play), which lands in `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
}

impl PlaybackState {
    /// Class token the surface hangs on the chrome element.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            PlaybackState::Unstarted => "unstarted",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Ended => "ended",
        }
    }

    #[must_use]
    pub fn is_started(self) -> bool {
        self != PlaybackState::Unstarted
    }

    /// Fold a backend observation into the current state.
    ///
    /// `None` means the backend reported nothing usable this tick; the
    /// current state stands. A reported `Unstarted` is also ignored once
    /// playback has been seen in any other state, so a transient backend
    /// reset never snaps the surface back to its initial look.
    #[must_use]
    pub fn observe(self, observed: Option<PlaybackState>) -> PlaybackState {
        match observed {
            None => self,
            Some(PlaybackState::Unstarted) if self.is_started() => self,
            Some(next) => next,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_replaces_the_current_state() {
        let state = PlaybackState::Unstarted;
        let state = state.observe(Some(PlaybackState::Playing));
        assert_eq!(state, PlaybackState::Playing);
        let state = state.observe(Some(PlaybackState::Paused));
        assert_eq!(state, PlaybackState::Paused);
    }

    #[test]
    fn nothing_observed_keeps_the_current_state() {
        let state = PlaybackState::Buffering;
        assert_eq!(state.observe(None), PlaybackState::Buffering);
    }

    #[test]
    fn never_falls_back_to_unstarted_once_started() {
        let state = PlaybackState::Unstarted.observe(Some(PlaybackState::Playing));
        assert_eq!(
            state.observe(Some(PlaybackState::Unstarted)),
            PlaybackState::Playing
        );
    }

    #[test]
    fn unstarted_observation_is_valid_before_playback() {
        let state = PlaybackState::Unstarted;
        assert_eq!(
            state.observe(Some(PlaybackState::Unstarted)),
            PlaybackState::Unstarted
        );
    }

    #[test]
    fn ended_leaves_via_playing() {
        let state = PlaybackState::Ended.observe(Some(PlaybackState::Playing));
        assert_eq!(state, PlaybackState::Playing);
    }

    #[test]
    fn class_tokens_are_lowercase_names() {
        assert_eq!(PlaybackState::Unstarted.class(), "unstarted");
        assert_eq!(PlaybackState::Ended.to_string(), "ended");
    }

    #[test]
    fn serializes_to_the_class_token() {
        let json = serde_json::to_string(&PlaybackState::Buffering).unwrap();
        assert_eq!(json, "\"buffering\"");
    }
}
