use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::clock::format_clock;
use crate::config::ChromeConfig;
use crate::error::App;
use crate::fill::fill_fraction;
use crate::player::snapshot::UiSnapshot;
use crate::player::source::PlaybackSource;
use crate::player::state::PlaybackState;

/// Sink receiving every snapshot the chrome produces.
pub type SnapshotSink = Arc<dyn Fn(UiSnapshot) + Send + Sync>;

/// Hook into whatever the hosting surface uses to expand the chrome.
///
/// Surfaces without fullscreen support simply never install one; toggling
/// is then a no-op and the flag stays where it is.
pub trait FullscreenHandle: Send + Sync {
    fn set_fullscreen(&self, active: bool);
}

struct Shared {
    source: Arc<dyn PlaybackSource>,
    config: ChromeConfig,
    state: Mutex<PlaybackState>,
    fullscreen: AtomicBool,
    sink: Mutex<Option<SnapshotSink>>,
}

/// Keeps one player's control surface in step with its playback source.
///
/// The chrome owns the update loop (polling, or the source's own time
/// updates) and the command surface the widgets call into. One instance
/// drives one source; the embedding layer must not issue commands to the
/// source directly while the chrome is running.
pub struct ChromeSync {
    shared: Arc<Shared>,
    fullscreen_handle: Option<Arc<dyn FullscreenHandle>>,
    loop_task: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl ChromeSync {
    #[must_use]
    pub fn new(source: Arc<dyn PlaybackSource>, config: ChromeConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                state: Mutex::new(PlaybackState::Unstarted),
                fullscreen: AtomicBool::new(false),
                sink: Mutex::new(None),
            }),
            fullscreen_handle: None,
            loop_task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_fullscreen(mut self, handle: Arc<dyn FullscreenHandle>) -> Self {
        self.fullscreen_handle = Some(handle);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ChromeConfig {
        &self.shared.config
    }

    /// The state the chrome currently believes the player is in.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.shared.state.lock().unwrap()
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.shared.fullscreen.load(Ordering::SeqCst)
    }

    /// Register the snapshot sink. One sink is active at a time; calling
    /// this again replaces the previous one.
    pub fn on_update<F>(&self, sink: F)
    where
        F: Fn(UiSnapshot) + Send + Sync + 'static,
    {
        *self.shared.sink.lock().unwrap() = Some(Arc::new(sink));
    }

    /// Begin the update loop. Must be called from within a tokio runtime.
    ///
    /// Calling this while the loop is already running is a no-op; there is
    /// never more than one loop per chrome.
    pub fn start(&self) {
        let mut slot = self.loop_task.lock().unwrap();
        if let Some((_, task)) = slot.as_ref() {
            if !task.is_finished() {
                debug!("Chrome update loop already running");
                return;
            }
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(Self::run_loop(Arc::clone(&self.shared), stop_rx));
        *slot = Some((stop_tx, task));
    }

    /// Halt the update loop and release its timer or subscription.
    ///
    /// Idempotent, and safe to call from inside the snapshot sink; the loop
    /// winds down before its next scheduled tick.
    pub fn stop(&self) {
        let mut slot = self.loop_task.lock().unwrap();
        if let Some((stop_tx, _task)) = slot.take() {
            debug!("Stopping chrome update loop");
            let _ = stop_tx.send(true);
        }
    }

    /// Run one update immediately, outside the loop cadence.
    pub async fn refresh(&self) {
        Self::tick(&self.shared).await;
    }

    /// The single play/pause rule behind every click target on the chrome:
    /// pause while playing, otherwise play, rewinding first when the track
    /// has ended.
    pub async fn toggle_play_pause(&self) -> Result<(), App> {
        let current = self.state();
        if current == PlaybackState::Playing {
            debug!("Toggle: pausing");
            self.shared.source.pause().await
        } else {
            if current == PlaybackState::Ended {
                debug!("Toggle: restarting from the end");
                self.shared.source.seek(0.0).await?;
            }
            debug!("Toggle: playing");
            self.shared.source.play().await
        }
    }

    /// Scrub to a point on the seek bar. Does nothing while the duration is
    /// still unknown.
    pub async fn seek_to_fraction(&self, fraction: f64) -> Result<(), App> {
        if fraction.is_nan() {
            return Err(App::InvalidInput(
                "seek fraction must be a number".to_string(),
            ));
        }
        let Some(duration) = self.shared.source.duration().await? else {
            debug!("Seek ignored, duration not known yet");
            return Ok(());
        };
        if duration <= 0.0 {
            return Ok(());
        }
        let fraction = fraction.clamp(0.0, 1.0);
        self.shared.source.seek(fraction * duration).await
    }

    pub async fn set_volume_fraction(&self, fraction: f64) -> Result<(), App> {
        if fraction.is_nan() {
            return Err(App::InvalidInput(
                "volume fraction must be a number".to_string(),
            ));
        }
        self.shared
            .source
            .set_volume(fraction.clamp(0.0, 1.0))
            .await
    }

    /// Flip the fullscreen flag and tell the surface, when it gave us a
    /// handle to do so. Without one the flag is left untouched.
    pub fn toggle_fullscreen(&self) {
        let Some(handle) = &self.fullscreen_handle else {
            debug!("No fullscreen support on this surface");
            return;
        };
        let was = self.shared.fullscreen.fetch_xor(true, Ordering::SeqCst);
        handle.set_fullscreen(!was);
    }

    async fn run_loop(shared: Arc<Shared>, mut stop: watch::Receiver<bool>) {
        let updates = if shared.config.use_subscription {
            shared.source.time_updates()
        } else {
            None
        };

        if let Some(mut updates) = updates {
            debug!("Chrome following the source's own time updates");
            loop {
                // Stop wins over a ready tick, so it always lands before the
                // next one fires.
                tokio::select! {
                    biased;
                    _ = stop.changed() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            debug!("Time update channel closed, chrome loop exiting");
                            break;
                        }
                        Self::tick(&shared).await;
                    }
                }
            }
        } else {
            let mut timer = interval(Duration::from_millis(shared.config.poll_interval_ms.max(1)));
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.changed() => break,
                    _ = timer.tick() => Self::tick(&shared).await,
                }
            }
        }
    }

    async fn tick(shared: &Shared) {
        let snapshot = match Self::observe(shared).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // One bad read must not kill the loop; the next tick re-reads.
                warn!("Skipping chrome update: {e}");
                return;
            }
        };
        let sink = shared.sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink(snapshot);
        }
    }

    async fn observe(shared: &Shared) -> Result<UiSnapshot, App> {
        let current = shared.source.current_time().await?;
        let duration = shared.source.duration().await?;
        let volume = shared.source.volume().await?.clamp(0.0, 1.0);
        let observed = shared.source.state().await?;

        let state = {
            let mut slot = shared.state.lock().unwrap();
            *slot = slot.observe(Some(observed));
            *slot
        };
        let fullscreen = shared.fullscreen.load(Ordering::SeqCst);

        match duration {
            Some(duration) if duration > 0.0 => {
                let current = current.clamp(0.0, duration);
                Ok(UiSnapshot {
                    current_text: format_clock(current)?,
                    duration_text: format_clock(duration)?,
                    position: fill_fraction(current, 0.0, duration)?,
                    volume,
                    state,
                    fullscreen,
                })
            }
            _ => Ok(UiSnapshot::placeholder(volume, state, fullscreen)),
        }
    }
}

impl Drop for ChromeSync {
    fn drop(&mut self) {
        self.stop();
    }
}
