use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::StreamExt;
use gstreamer::prelude::*;
use gstreamer::MessageView;
use log::{error, info};
use tokio::task;

use crate::error::App;
use crate::player::source::PlaybackSource;
use crate::player::state::PlaybackState;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

fn clock_seconds(time: gstreamer::ClockTime) -> f64 {
    time.nseconds() as f64 / NANOS_PER_SECOND
}

/// Fold the pipeline state and the bus-observed flags into one canonical
/// state. End-of-stream and buffering outrank the raw pipeline state; a
/// paused pipeline that never played counts as unstarted.
fn map_state(
    pipeline_state: gstreamer::State,
    started: bool,
    ended: bool,
    buffering: bool,
) -> PlaybackState {
    if ended {
        return PlaybackState::Ended;
    }
    if buffering {
        return PlaybackState::Buffering;
    }
    match pipeline_state {
        gstreamer::State::Playing => PlaybackState::Playing,
        gstreamer::State::Paused if started => PlaybackState::Paused,
        _ => PlaybackState::Unstarted,
    }
}

/// Playback source over a local `playbin` pipeline.
///
/// The pipeline plays whatever URI the tag carried; position, duration and
/// volume come straight from `playbin` queries, while end-of-stream and
/// buffering are observed on the bus.
pub struct MediaSource {
    playbin: gstreamer::Element,
    started: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
    buffering: Arc<AtomicBool>,
}

impl MediaSource {
    /// Build a pipeline for the given URI, parked in `Ready` until the
    /// first `play`. Spawns the bus listener, so this must run inside a
    /// tokio runtime.
    pub fn new(uri: &str) -> Result<Arc<Self>, App> {
        gstreamer::init().map_err(|e| App::Init(e.to_string()))?;

        let playbin = gstreamer::ElementFactory::make("playbin")
            .property("uri", uri)
            .build()
            .map_err(|_| App::Element("Failed to create playbin element".to_string()))?;

        playbin
            .set_state(gstreamer::State::Ready)
            .map_err(|_| App::State("Failed to set pipeline to Ready".to_string()))?;

        let source = Arc::new(Self {
            playbin,
            started: Arc::new(AtomicBool::new(false)),
            ended: Arc::new(AtomicBool::new(false)),
            buffering: Arc::new(AtomicBool::new(false)),
        });
        source.start_bus_listener()?;

        Ok(source)
    }

    fn start_bus_listener(&self) -> Result<(), App> {
        let bus = self
            .playbin
            .bus()
            .ok_or_else(|| App::Pipeline("Failed to get playbin bus".to_string()))?;

        let ended = Arc::clone(&self.ended);
        let buffering = Arc::clone(&self.buffering);

        task::spawn(bus.stream().for_each(move |msg| {
            let ended = Arc::clone(&ended);
            let buffering = Arc::clone(&buffering);
            async move {
                match msg.view() {
                    MessageView::Eos(_) => {
                        info!("End of stream reached");
                        ended.store(true, Ordering::SeqCst);
                    }
                    MessageView::Buffering(b) => {
                        buffering.store(b.percent() < 100, Ordering::SeqCst);
                    }
                    MessageView::Error(err) => {
                        error!("Error from playback pipeline: {}", err.error());
                    }
                    _ => (),
                }
            }
        }));

        Ok(())
    }

    fn query_duration_seconds(&self) -> Option<f64> {
        self.playbin
            .query_duration::<gstreamer::ClockTime>()
            .map(clock_seconds)
    }
}

#[async_trait]
impl PlaybackSource for MediaSource {
    async fn current_time(&self) -> Result<f64, App> {
        Ok(self
            .playbin
            .query_position::<gstreamer::ClockTime>()
            .map_or(0.0, clock_seconds))
    }

    async fn duration(&self) -> Result<Option<f64>, App> {
        Ok(self.query_duration_seconds())
    }

    async fn volume(&self) -> Result<f64, App> {
        Ok(self.playbin.property::<f64>("volume").clamp(0.0, 1.0))
    }

    async fn set_volume(&self, fraction: f64) -> Result<(), App> {
        self.playbin
            .set_property("volume", fraction.clamp(0.0, 1.0));
        Ok(())
    }

    async fn play(&self) -> Result<(), App> {
        self.ended.store(false, Ordering::SeqCst);
        self.playbin
            .set_state(gstreamer::State::Playing)
            .map_err(|_| App::State("Failed to set pipeline to Playing".to_string()))?;
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> Result<(), App> {
        self.playbin
            .set_state(gstreamer::State::Paused)
            .map_err(|_| App::State("Failed to set pipeline to Paused".to_string()))?;
        Ok(())
    }

    async fn seek(&self, seconds: f64) -> Result<(), App> {
        if seconds.is_nan() {
            return Err(App::InvalidInput(
                "seek position must be a number".to_string(),
            ));
        }
        let Some(duration) = self.query_duration_seconds() else {
            return Err(App::NotReady(
                "cannot seek before the pipeline reports a duration".to_string(),
            ));
        };
        let clamped = seconds.clamp(0.0, duration);
        // Rewinding is how playback leaves the ended state.
        self.ended.store(false, Ordering::SeqCst);
        let position = gstreamer::ClockTime::from_nseconds((clamped * NANOS_PER_SECOND) as u64);
        self.playbin
            .seek_simple(gstreamer::SeekFlags::FLUSH | gstreamer::SeekFlags::KEY_UNIT, position)?;
        Ok(())
    }

    async fn state(&self) -> Result<PlaybackState, App> {
        Ok(map_state(
            self.playbin.current_state(),
            self.started.load(Ordering::SeqCst),
            self.ended.load(Ordering::SeqCst),
            self.buffering.load(Ordering::SeqCst),
        ))
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        let _ = self.playbin.set_state(gstreamer::State::Null);
    }
}
