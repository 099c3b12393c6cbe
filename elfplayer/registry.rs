use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::config::ChromeConfig;
use crate::error::App;
use crate::page::PlayerTag;
use crate::player::chrome::ChromeSync;
use crate::player::source::PlaybackSource;

/// One live player: the tag it was created from and its running chrome.
pub struct PlayerEntry {
    pub tag: PlayerTag,
    pub chrome: Arc<ChromeSync>,
}

/// All players discovered on a page, keyed by tag identity.
///
/// Owned by the embedding layer; creating an entry wires a chrome to its
/// source, destroying it stops the chrome.
#[derive(Default)]
pub struct PlayerRegistry {
    players: HashMap<String, PlayerEntry>,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chrome for a tag and remember it under `id`.
    ///
    /// The tag's own color tokens override the ones in `config`, the same
    /// precedence the attributes have over stylesheet defaults.
    pub fn create(
        &mut self,
        id: impl Into<String>,
        tag: PlayerTag,
        source: Arc<dyn PlaybackSource>,
        config: &ChromeConfig,
    ) -> Result<Arc<ChromeSync>, App> {
        let id = id.into();
        if self.players.contains_key(&id) {
            return Err(App::InvalidInput(format!(
                "a player with id {id} already exists"
            )));
        }

        let config = ChromeConfig {
            fg: tag.fg.clone(),
            bg: tag.bg.clone(),
            ..config.clone()
        };
        let chrome = Arc::new(ChromeSync::new(source, config));
        info!("Created player {id} for {}", tag.src);
        self.players.insert(
            id,
            PlayerEntry {
                tag,
                chrome: Arc::clone(&chrome),
            },
        );
        Ok(chrome)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PlayerEntry> {
        self.players.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.players.keys()
    }

    /// Stop a player's chrome and forget it. Returns whether it existed.
    pub fn destroy(&mut self, id: &str) -> bool {
        match self.players.remove(id) {
            Some(entry) => {
                entry.chrome.stop();
                info!("Destroyed player {id}");
                true
            }
            None => {
                debug!("No player {id} to destroy");
                false
            }
        }
    }

    /// Stop and forget every player.
    pub fn clear(&mut self) {
        for (id, entry) in self.players.drain() {
            entry.chrome.stop();
            debug!("Destroyed player {id}");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EmbedSource;

    fn tag(src: &str) -> PlayerTag {
        toml::from_str(&format!("src = \"{src}\"")).unwrap()
    }

    #[tokio::test]
    async fn create_applies_tag_colors_over_config() {
        let mut registry = PlayerRegistry::new();
        let (source, _channels) = EmbedSource::new();
        let mut player_tag = tag("clips/a.mp4");
        player_tag.fg = "#e91e63".to_string();

        let chrome = registry
            .create("a", player_tag, source, &ChromeConfig::default())
            .unwrap();

        assert_eq!(chrome.config().fg, "#e91e63");
        assert_eq!(chrome.config().bg, "rgba(150,150,150,0.3)");
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let mut registry = PlayerRegistry::new();
        let (first, _c1) = EmbedSource::new();
        let (second, _c2) = EmbedSource::new();

        registry
            .create("a", tag("one.mp4"), first, &ChromeConfig::default())
            .unwrap();
        let duplicate = registry.create("a", tag("two.mp4"), second, &ChromeConfig::default());

        assert!(matches!(duplicate, Err(App::InvalidInput(_))));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn destroy_stops_and_forgets_the_player() {
        let mut registry = PlayerRegistry::new();
        let (source, _channels) = EmbedSource::new();

        let chrome = registry
            .create("a", tag("one.mp4"), source, &ChromeConfig::default())
            .unwrap();
        chrome.start();

        assert!(registry.destroy("a"));
        assert!(!registry.destroy("a"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_registry() {
        let mut registry = PlayerRegistry::new();
        for n in 0..3 {
            let (source, _channels) = EmbedSource::new();
            registry
                .create(format!("p{n}"), tag("x.mp4"), source, &ChromeConfig::default())
                .unwrap();
        }

        registry.clear();

        assert!(registry.is_empty());
    }
}
