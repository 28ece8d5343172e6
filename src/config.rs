//! Engine configuration
//!
//! Every tunable constant of the letter board lives in [`EngineConfig`].
//! Defaults match the shipped game; an optional JSON file can override any
//! subset of fields:
//! - `--config PATH` on the command line, or
//! - `config.json` in the OS-standard config directory (via `directories`)

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name used for the OS-standard data and config directories.
pub const APP_NAME: &str = "letterdrop";

/// Number of tiles in a pool when the word fits.
pub const POOL_SIZE_DEFAULT: usize = 15;
/// Grid columns used by the layout planner, independent of pool size.
pub const LAYOUT_COLUMNS_DEFAULT: usize = 5;
pub const LAYOUT_PADDING_DEFAULT: f32 = 20.0;
pub const TILE_SIZE_DEFAULT: f32 = 50.0;
/// Answer band bounds as fractions of the screen height.
pub const ANSWER_BAND_TOP_DEFAULT: f32 = 0.15;
pub const ANSWER_BAND_BOTTOM_DEFAULT: f32 = 0.45;
pub const SLOT_WIDTH_DEFAULT: f32 = 50.0;
pub const SLOT_MARGIN_DEFAULT: f32 = 5.0;
pub const POINTS_PER_LETTER_DEFAULT: u32 = 10;
pub const EVALUATE_DELAY_MS_DEFAULT: u64 = 500;
pub const ADVANCE_DELAY_MS_DEFAULT: u64 = 1500;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Tunable constants of the letter board engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pool_size: usize,
    pub layout_columns: usize,
    pub layout_padding: f32,
    pub tile_size: f32,
    pub answer_band_top: f32,
    pub answer_band_bottom: f32,
    pub slot_width: f32,
    pub slot_margin: f32,
    pub points_per_letter: u32,
    pub evaluate_delay_ms: u64,
    pub advance_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_size: POOL_SIZE_DEFAULT,
            layout_columns: LAYOUT_COLUMNS_DEFAULT,
            layout_padding: LAYOUT_PADDING_DEFAULT,
            tile_size: TILE_SIZE_DEFAULT,
            answer_band_top: ANSWER_BAND_TOP_DEFAULT,
            answer_band_bottom: ANSWER_BAND_BOTTOM_DEFAULT,
            slot_width: SLOT_WIDTH_DEFAULT,
            slot_margin: SLOT_MARGIN_DEFAULT,
            points_per_letter: POINTS_PER_LETTER_DEFAULT,
            evaluate_delay_ms: EVALUATE_DELAY_MS_DEFAULT,
            advance_delay_ms: ADVANCE_DELAY_MS_DEFAULT,
        }
    }
}

impl EngineConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default config file is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// `config.json` inside the OS-standard config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid("pool_size must be positive".into()));
        }
        if self.layout_columns == 0 {
            return Err(ConfigError::Invalid("layout_columns must be positive".into()));
        }
        if self.layout_padding < 0.0 || self.tile_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "layout_padding must be >= 0 and tile_size > 0".into(),
            ));
        }
        let band_ok = (0.0..=1.0).contains(&self.answer_band_top)
            && (0.0..=1.0).contains(&self.answer_band_bottom)
            && self.answer_band_top < self.answer_band_bottom;
        if !band_ok {
            return Err(ConfigError::Invalid(format!(
                "answer band [{}, {}] must be an increasing range within 0..=1",
                self.answer_band_top, self.answer_band_bottom
            )));
        }
        if self.slot_width <= 0.0 || self.slot_margin < 0.0 {
            return Err(ConfigError::Invalid(
                "slot_width must be > 0 and slot_margin >= 0".into(),
            ));
        }
        Ok(())
    }

    pub fn evaluate_delay(&self) -> Duration {
        Duration::from_millis(self.evaluate_delay_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
