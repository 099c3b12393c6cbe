use std::sync::Arc;

use clap::Parser;
use flexi_logger::Logger;
use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::task;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

use elfplayer::backend::{EmbedCommand, EmbedEvent, EmbedSource};
use elfplayer::config::{DEFAULT_BG, DEFAULT_FG};
use elfplayer::{
    App, ChromeConfig, ChromeSync, Page, PlaybackSource, PlayerRegistry, PlayerTag, UiSnapshot,
};

const SCREEN_TICK_MS: u64 = 250;

#[derive(Parser)]
#[command(
    name = "elfplay",
    about = "Run a page's players headlessly and print every chrome snapshot.",
    version = "1.0.0"
)]
struct Cli {
    #[arg(short = 'p', long = "page", help = "Page description TOML listing player tags")]
    page: Option<String>,

    #[arg(
        short = 's',
        long = "seconds",
        default_value_t = 12,
        help = "How long to run before shutting down"
    )]
    seconds: u64,

    #[arg(
        short = 'i',
        long = "interval",
        default_value_t = 1000,
        help = "Chrome poll interval in milliseconds"
    )]
    interval: u64,

    #[arg(
        long = "push",
        action = clap::ArgAction::SetTrue,
        help = "Follow the sources' own time updates instead of polling"
    )]
    push: bool,

    #[arg(
        long = "uri",
        help = "Play this URI over the local media pipeline instead of simulated frames"
    )]
    uri: Option<String>,

    #[arg(
        long = "screen-length",
        default_value_t = 30.0,
        help = "Simulated media length in seconds"
    )]
    screen_length: f64,
}

#[tokio::main]
async fn main() -> Result<(), App> {
    let cli = Cli::parse();

    // Snapshots go to stdout as JSON lines, so logs stay on stderr.
    Logger::try_with_env_or_str("info")?.log_to_stderr().start()?;

    let page = match &cli.page {
        Some(path) => Page::load_from_file(path).await?,
        None => default_page(),
    };

    let config = ChromeConfig {
        poll_interval_ms: cli.interval,
        use_subscription: cli.push,
        ..ChromeConfig::default()
    };

    let mut registry = PlayerRegistry::new();
    let mut ids = Vec::new();

    if let Some(uri) = &cli.uri {
        let source = media_source(uri)?;
        let tag = uri_tag(uri);
        let id = "player-0".to_string();
        wire_player(&mut registry, &id, tag, source, &config).await?;
        ids.push(id);
    } else {
        if page.players.is_empty() {
            warn!("Page has no player tags, nothing to do");
            return Ok(());
        }
        for (index, tag) in page.players.iter().enumerate() {
            let (source, channels) = EmbedSource::new();
            task::spawn(run_screen(
                cli.screen_length,
                channels.commands,
                channels.events,
            ));
            let id = format!("player-{index}");
            wire_player(&mut registry, &id, tag.clone(), source, &config).await?;
            ids.push(id);
        }
    }

    tokio::select! {
        result = run_demo(&registry, &ids, cli.seconds) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    registry.clear();
    Ok(())
}

/// Create a chrome for one tag, hook up the snapshot printer and kick
/// playback off.
async fn wire_player(
    registry: &mut PlayerRegistry,
    id: &str,
    tag: PlayerTag,
    source: Arc<dyn PlaybackSource>,
    config: &ChromeConfig,
) -> Result<Arc<ChromeSync>, App> {
    let chrome = registry.create(id, tag, source, config)?;
    info!(
        "Styling {id} with fg {} bg {}",
        chrome.config().fg,
        chrome.config().bg
    );

    let label = id.to_string();
    chrome.on_update(move |snapshot| print_snapshot(&label, &snapshot));

    chrome.start();
    chrome.toggle_play_pause().await?;
    Ok(chrome)
}

/// Let the players run, scrubbing halfway through and cutting the volume at
/// the midpoint so the snapshots show the command surface at work.
async fn run_demo(registry: &PlayerRegistry, ids: &[String], seconds: u64) -> Result<(), App> {
    let half = seconds / 2;
    sleep(Duration::from_secs(half)).await;

    for id in ids {
        if let Some(entry) = registry.get(id) {
            info!("Scrubbing {id} to the middle");
            entry.chrome.seek_to_fraction(0.5).await?;
            entry.chrome.set_volume_fraction(0.5).await?;
        }
    }

    sleep(Duration::from_secs(seconds - half)).await;
    info!("Demo time up");
    Ok(())
}

fn print_snapshot(id: &str, snapshot: &UiSnapshot) {
    match serde_json::to_string(&serde_json::json!({ "player": id, "snapshot": snapshot })) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("Failed to encode snapshot: {e}"),
    }
}

fn default_page() -> Page {
    Page {
        players: vec![PlayerTag {
            src: "demo-screen".to_string(),
            poster: None,
            title: Some("Simulated screen".to_string()),
            fg: DEFAULT_FG.to_string(),
            bg: DEFAULT_BG.to_string(),
        }],
    }
}

fn uri_tag(uri: &str) -> PlayerTag {
    PlayerTag {
        src: uri.to_string(),
        poster: None,
        title: None,
        fg: DEFAULT_FG.to_string(),
        bg: DEFAULT_BG.to_string(),
    }
}

#[cfg(feature = "gst")]
fn media_source(uri: &str) -> Result<Arc<dyn PlaybackSource>, App> {
    let source: Arc<dyn PlaybackSource> = elfplayer::backend::MediaSource::new(uri)?;
    Ok(source)
}

#[cfg(not(feature = "gst"))]
fn media_source(_uri: &str) -> Result<Arc<dyn PlaybackSource>, App> {
    Err(App::Init(
        "this build has no local media pipeline; rebuild with --features gst".to_string(),
    ))
}

/// Stand-in for an embedded player frame: answers commands and reports time
/// on its own cadence, over the same JSON messages a real frame would post.
async fn run_screen(
    duration: f64,
    mut commands: mpsc::Receiver<String>,
    events: mpsc::Sender<String>,
) {
    post(&events, &EmbedEvent::Ready { duration }).await;

    let mut position = 0.0_f64;
    let mut playing = false;
    let mut timer = interval(Duration::from_millis(SCREEN_TICK_MS));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(raw) = command else { break };
                match serde_json::from_str::<EmbedCommand>(&raw) {
                    Ok(EmbedCommand::Play) => {
                        if position >= duration {
                            position = 0.0;
                        }
                        playing = true;
                        post(&events, &EmbedEvent::State { code: 1 }).await;
                    }
                    Ok(EmbedCommand::Pause) => {
                        playing = false;
                        post(&events, &EmbedEvent::State { code: 2 }).await;
                    }
                    Ok(EmbedCommand::Seek { seconds }) => {
                        position = seconds.clamp(0.0, duration);
                        post(&events, &EmbedEvent::Time { seconds: position }).await;
                    }
                    Ok(EmbedCommand::Volume { fraction }) => {
                        post(&events, &EmbedEvent::Volume { fraction }).await;
                    }
                    Err(e) => warn!("Screen ignoring malformed command: {e}"),
                }
            }
            _ = timer.tick() => {
                if playing {
                    position += SCREEN_TICK_MS as f64 / 1000.0;
                    if position >= duration {
                        position = duration;
                        playing = false;
                        post(&events, &EmbedEvent::Time { seconds: position }).await;
                        post(&events, &EmbedEvent::State { code: 0 }).await;
                    } else {
                        post(&events, &EmbedEvent::Time { seconds: position }).await;
                    }
                }
            }
        }
    }
}

async fn post(events: &mpsc::Sender<String>, event: &EmbedEvent) {
    match serde_json::to_string(event) {
        // A closed channel means the host side went away; the screen task
        // winds down with it on the next recv.
        Ok(raw) => {
            let _ = events.send(raw).await;
        }
        Err(e) => error!("Failed to encode frame event: {e}"),
    }
}
