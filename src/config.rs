use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game parameters consumed at engine construction.
///
/// `win_score` is carried and round-tripped through checkpoints but no code
/// path acts on it; reaching the threshold changes nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "defaults::width")]
    pub width: u32,
    #[serde(default = "defaults::height")]
    pub height: u32,
    #[serde(default = "defaults::start_tiles")]
    pub start_tiles: u32,
    #[serde(default = "defaults::win_score")]
    pub win_score: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: defaults::width(),
            height: defaults::height(),
            start_tiles: defaults::start_tiles(),
            win_score: defaults::win_score(),
        }
    }
}

impl GameConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    #[inline]
    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

mod defaults {
    pub fn width() -> u32 {
        4
    }
    pub fn height() -> u32 {
        4
    }
    pub fn start_tiles() -> u32 {
        2
    }
    pub fn win_score() -> u64 {
        2048
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
