use serde::Deserialize;

/// Cadence of the polling update loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Foreground color token applied when a tag carries none.
pub const DEFAULT_FG: &str = "#fff";
/// Background color token applied when a tag carries none.
pub const DEFAULT_BG: &str = "rgba(150,150,150,0.3)";

/// Settings for one chrome synchronizer, fixed at construction.
///
/// The color tokens are opaque here; they are handed back untouched so the
/// embedding surface can paint slider gradients with them.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ChromeConfig {
    pub poll_interval_ms: u64,
    pub fg: String,
    pub bg: String,
    /// Prefer the source's own time-update channel over polling when it
    /// offers one.
    pub use_subscription: bool,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            fg: DEFAULT_FG.to_string(),
            bg: DEFAULT_BG.to_string(),
            use_subscription: false,
        }
    }
}
