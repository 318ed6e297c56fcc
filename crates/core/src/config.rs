//! Game configuration loaded from an optional JSON file.

use crate::puzzle::DEFAULT_WORDS_PER_LINE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::trace;

/// Behavioral knobs of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum wall-clock gap between processed playback-time signals.
    /// `None` processes every signal.
    pub debounce_ms: Option<u64>,
    /// Words per line in the puzzle markup.
    pub words_per_line: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debounce_ms: None,
            words_per_line: DEFAULT_WORDS_PER_LINE,
        }
    }
}

impl GameConfig {
    /// Read a config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        trace!("GameConfig::load path={}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("failed parsing config file: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn debounce(&self) -> Option<Duration> {
        self.debounce_ms.map(Duration::from_millis)
    }
}
