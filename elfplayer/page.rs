use crate::config::{DEFAULT_BG, DEFAULT_FG};
use crate::error::App;
use serde::Deserialize;

/// Attributes read off one player tag on the hosting page.
#[derive(Deserialize, Clone, Debug)]
pub struct PlayerTag {
    /// Media URL or embed video id.
    pub src: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
}

fn default_fg() -> String {
    DEFAULT_FG.to_string()
}

fn default_bg() -> String {
    DEFAULT_BG.to_string()
}

/// The set of player tags found on a page description file.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Page {
    #[serde(default, rename = "player")]
    pub players: Vec<PlayerTag>,
}

impl Page {
    pub async fn load_from_file(file_path: &str) -> Result<Self, App> {
        log::info!("Loading page description from {file_path}");
        let content = tokio::fs::read_to_string(file_path).await?;
        let page: Page = toml::from_str(&content)?;
        Ok(page)
    }
}
