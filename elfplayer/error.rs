use flexi_logger::FlexiLoggerError;
use std::io;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

#[derive(Error, Debug, Clone)]
pub enum App {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Metadata not ready: {0}")]
    NotReady(String),

    #[error("Source failure: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Data parsing error: {0}")]
    DataParsing(String),

    #[error("TOML parsing error: {0}")]
    TomlParsing(String),

    #[error("Logger initialization error: {0}")]
    Logger(String),

    #[error("Channel send error: {0}")]
    Send(String),

    #[error("Backend initialization error: {0}")]
    Init(String),

    #[error("Backend element error: {0}")]
    Element(String),

    #[error("Backend pipeline error: {0}")]
    Pipeline(String),

    #[error("Backend state error: {0}")]
    State(String),
}

impl From<io::Error> for App {
    fn from(error: io::Error) -> Self {
        App::Io(error.to_string())
    }
}

impl From<toml::de::Error> for App {
    fn from(error: toml::de::Error) -> Self {
        App::TomlParsing(error.to_string())
    }
}

impl From<FlexiLoggerError> for App {
    fn from(error: FlexiLoggerError) -> Self {
        App::Logger(error.to_string())
    }
}

impl From<serde_json::Error> for App {
    fn from(error: serde_json::Error) -> Self {
        App::DataParsing(error.to_string())
    }
}

impl<T> From<SendError<T>> for App {
    fn from(error: SendError<T>) -> Self {
        App::Send(error.to_string())
    }
}

#[cfg(feature = "gst")]
impl From<glib::BoolError> for App {
    fn from(_: glib::BoolError) -> Self {
        App::State("Failed to perform an operation on the playback pipeline".to_string())
    }
}
