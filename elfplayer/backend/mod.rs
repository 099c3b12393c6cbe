pub mod embed;
#[cfg(feature = "gst")]
pub mod media;

pub use embed::{EmbedChannels, EmbedCommand, EmbedEvent, EmbedSource};
#[cfg(feature = "gst")]
pub use media::MediaSource;
