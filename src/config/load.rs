//! Deck description loading from files.

use std::path::{Path, PathBuf};

use super::{ConfigError, DeckConfig};

impl DeckConfig {
    /// Load the deck description from a file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

/// Get the base path from a deck file path (its parent directory).
///
/// Page references, list files and assets are resolved against it.
pub fn base_path_from_deck(deck_path: &Path) -> PathBuf {
    deck_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
