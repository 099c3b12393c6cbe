use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task;

use crate::error::App;
use crate::player::source::PlaybackSource;
use crate::player::state::PlaybackState;
use async_trait::async_trait;

/// Messages an embedded player frame posts to its host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum EmbedEvent {
    /// The frame finished loading its media.
    Ready { duration: f64 },
    /// Numeric player state code, in the embed APIs' convention.
    State { code: i32 },
    /// Playback position report.
    Time { seconds: f64 },
    /// Duration became known or changed.
    Duration { seconds: f64 },
    /// The frame's own volume changed.
    Volume { fraction: f64 },
}

/// Commands the host posts back into the frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum EmbedCommand {
    Play,
    Pause,
    Seek { seconds: f64 },
    Volume { fraction: f64 },
}

/// Translate an embed API state code into a canonical state.
///
/// Codes follow the iframe APIs: -1 unstarted, 0 ended, 1 playing,
/// 2 paused, 3 buffering. Anything else (5 "cued" included) is not a
/// playback state the chrome renders, so it maps to `None` and the last
/// known state stands.
#[must_use]
pub fn state_from_code(code: i32) -> Option<PlaybackState> {
    match code {
        -1 => Some(PlaybackState::Unstarted),
        0 => Some(PlaybackState::Ended),
        1 => Some(PlaybackState::Playing),
        2 => Some(PlaybackState::Paused),
        3 => Some(PlaybackState::Buffering),
        _ => None,
    }
}

/// Channel endpoints the frame glue wires up: serialized commands flowing
/// out of the source, serialized events flowing into it.
pub struct EmbedChannels {
    pub commands: mpsc::Receiver<String>,
    pub events: mpsc::Sender<String>,
}

#[derive(Debug)]
struct EmbedShared {
    current: f64,
    duration: Option<f64>,
    volume: f64,
    state: PlaybackState,
}

/// Playback source backed by an embedded player frame.
///
/// The frame is reached only through JSON messages: inbound events update
/// the mirrored state here, outbound commands ask the frame to act. The
/// mirror is what `current_time`/`state`/... report, so the chrome sees
/// whatever the frame last told us.
pub struct EmbedSource {
    shared: Arc<Mutex<EmbedShared>>,
    commands: mpsc::Sender<String>,
    time_tx: Arc<watch::Sender<f64>>,
}

impl EmbedSource {
    /// Build a source and the channel pair its frame glue talks over.
    ///
    /// Spawns the inbound event listener, so this must run inside a tokio
    /// runtime.
    #[must_use]
    pub fn new() -> (Arc<Self>, EmbedChannels) {
        let (event_tx, event_rx) = mpsc::channel::<String>(16);
        let (command_tx, command_rx) = mpsc::channel::<String>(16);
        let (time_tx, _) = watch::channel(0.0);

        let source = Arc::new(Self {
            shared: Arc::new(Mutex::new(EmbedShared {
                current: 0.0,
                duration: None,
                volume: 1.0,
                state: PlaybackState::Unstarted,
            })),
            commands: command_tx,
            time_tx: Arc::new(time_tx),
        });

        source.start_event_listener(event_rx);

        (
            source,
            EmbedChannels {
                commands: command_rx,
                events: event_tx,
            },
        )
    }

    fn start_event_listener(&self, mut event_rx: mpsc::Receiver<String>) {
        let shared = Arc::clone(&self.shared);
        let time_tx = Arc::clone(&self.time_tx);

        task::spawn(async move {
            while let Some(raw) = event_rx.recv().await {
                match serde_json::from_str::<EmbedEvent>(&raw) {
                    Ok(event) => Self::apply_event(&shared, &time_tx, event),
                    Err(e) => warn!("Discarding malformed frame message: {e}"),
                }
            }
            debug!("Frame event channel closed");
        });
    }

    fn apply_event(shared: &Mutex<EmbedShared>, time_tx: &watch::Sender<f64>, event: EmbedEvent) {
        let mut shared = shared.lock().unwrap();
        match event {
            EmbedEvent::Ready { duration } => {
                debug!("Frame ready, duration {duration}");
                shared.duration = Some(duration);
            }
            EmbedEvent::State { code } => {
                if let Some(state) = state_from_code(code) {
                    shared.state = state;
                } else {
                    debug!("Ignoring frame state code {code}");
                }
            }
            EmbedEvent::Time { seconds } => {
                shared.current = seconds;
                let _ = time_tx.send(seconds);
            }
            EmbedEvent::Duration { seconds } => {
                shared.duration = Some(seconds);
            }
            EmbedEvent::Volume { fraction } => {
                shared.volume = fraction.clamp(0.0, 1.0);
            }
        }
    }

    async fn post(&self, command: EmbedCommand) -> Result<(), App> {
        let raw = serde_json::to_string(&command)?;
        self.commands.send(raw).await?;
        Ok(())
    }
}

#[async_trait]
impl PlaybackSource for EmbedSource {
    async fn current_time(&self) -> Result<f64, App> {
        Ok(self.shared.lock().unwrap().current)
    }

    async fn duration(&self) -> Result<Option<f64>, App> {
        Ok(self.shared.lock().unwrap().duration)
    }

    async fn volume(&self) -> Result<f64, App> {
        Ok(self.shared.lock().unwrap().volume)
    }

    async fn set_volume(&self, fraction: f64) -> Result<(), App> {
        let fraction = fraction.clamp(0.0, 1.0);
        // Mirror right away; the frame echoes a volume event eventually.
        self.shared.lock().unwrap().volume = fraction;
        self.post(EmbedCommand::Volume { fraction }).await
    }

    async fn play(&self) -> Result<(), App> {
        self.post(EmbedCommand::Play).await
    }

    async fn pause(&self) -> Result<(), App> {
        self.post(EmbedCommand::Pause).await
    }

    async fn seek(&self, seconds: f64) -> Result<(), App> {
        if seconds.is_nan() {
            return Err(App::InvalidInput(
                "seek position must be a number".to_string(),
            ));
        }
        let duration = self.shared.lock().unwrap().duration;
        let Some(duration) = duration else {
            return Err(App::NotReady(
                "cannot seek before the frame reports a duration".to_string(),
            ));
        };
        let seconds = seconds.clamp(0.0, duration);
        self.post(EmbedCommand::Seek { seconds }).await
    }

    async fn state(&self) -> Result<PlaybackState, App> {
        Ok(self.shared.lock().unwrap().state)
    }

    fn time_updates(&self) -> Option<watch::Receiver<f64>> {
        Some(self.time_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    async fn send(events: &mpsc::Sender<String>, event: &EmbedEvent) {
        events
            .send(serde_json::to_string(event).unwrap())
            .await
            .unwrap();
        // Let the listener task drain the channel.
        sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn events_update_the_mirror() {
        let (source, channels) = EmbedSource::new();

        send(&channels.events, &EmbedEvent::Ready { duration: 212.0 }).await;
        send(&channels.events, &EmbedEvent::State { code: 1 }).await;
        send(&channels.events, &EmbedEvent::Time { seconds: 42.5 }).await;

        assert_eq!(source.duration().await.unwrap(), Some(212.0));
        assert_eq!(source.state().await.unwrap(), PlaybackState::Playing);
        assert!((source.current_time().await.unwrap() - 42.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn state_codes_translate_to_canonical_states() {
        assert_eq!(state_from_code(-1), Some(PlaybackState::Unstarted));
        assert_eq!(state_from_code(0), Some(PlaybackState::Ended));
        assert_eq!(state_from_code(1), Some(PlaybackState::Playing));
        assert_eq!(state_from_code(2), Some(PlaybackState::Paused));
        assert_eq!(state_from_code(3), Some(PlaybackState::Buffering));
        assert_eq!(state_from_code(5), None);
        assert_eq!(state_from_code(42), None);
    }

    #[tokio::test]
    async fn unknown_state_codes_keep_the_last_state() {
        let (source, channels) = EmbedSource::new();

        send(&channels.events, &EmbedEvent::State { code: 1 }).await;
        send(&channels.events, &EmbedEvent::State { code: 5 }).await;

        assert_eq!(source.state().await.unwrap(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn malformed_messages_are_discarded() {
        let (source, channels) = EmbedSource::new();

        send(&channels.events, &EmbedEvent::State { code: 2 }).await;
        channels
            .events
            .send("{not json at all".to_string())
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(source.state().await.unwrap(), PlaybackState::Paused);
    }

    #[tokio::test]
    async fn commands_are_posted_as_json() {
        let (source, mut channels) = EmbedSource::new();

        send(&channels.events, &EmbedEvent::Ready { duration: 100.0 }).await;
        source.play().await.unwrap();
        source.set_volume(0.5).await.unwrap();
        source.seek(500.0).await.unwrap();

        let play: EmbedCommand =
            serde_json::from_str(&channels.commands.recv().await.unwrap()).unwrap();
        assert_eq!(play, EmbedCommand::Play);
        let volume: EmbedCommand =
            serde_json::from_str(&channels.commands.recv().await.unwrap()).unwrap();
        assert_eq!(volume, EmbedCommand::Volume { fraction: 0.5 });
        // Scrubbing past the end lands on the end.
        let seek: EmbedCommand =
            serde_json::from_str(&channels.commands.recv().await.unwrap()).unwrap();
        assert_eq!(seek, EmbedCommand::Seek { seconds: 100.0 });
    }

    #[tokio::test]
    async fn seek_without_metadata_is_not_ready() {
        let (source, _channels) = EmbedSource::new();

        assert!(matches!(source.seek(10.0).await, Err(App::NotReady(_))));
    }

    #[tokio::test]
    async fn set_volume_mirrors_immediately() {
        let (source, _channels) = EmbedSource::new();

        source.set_volume(1.7).await.unwrap();

        assert!((source.volume().await.unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn time_updates_follow_time_events() {
        let (source, channels) = EmbedSource::new();
        let mut updates = source.time_updates().unwrap();

        send(&channels.events, &EmbedEvent::Time { seconds: 7.0 }).await;

        updates.changed().await.unwrap();
        assert!((*updates.borrow() - 7.0).abs() < f64::EPSILON);
    }
}
