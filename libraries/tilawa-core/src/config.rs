//! Player configuration
//!
//! Loaded from an optional `tilawa.toml` plus `TILAWA_`-prefixed
//! environment variables. Defaults reproduce the fifteen-track looping
//! player; `total_tracks = 13` with `looping_supported = false` gives
//! the plain wraparound player.

use crate::error::{Result, TilawaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File stem shared by every track asset.
const TRACK_FILE_STEM: &str = "tiktokQuran";

/// Top-level player configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Track count and looping capability
    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    /// Audio asset layout
    #[serde(default = "default_assets")]
    pub assets: AssetSettings,

    /// Loudness normalizer bounds
    #[serde(default = "default_normalizer")]
    pub normalizer: NormalizerSettings,

    /// Terminal UI settings
    #[serde(default = "default_ui")]
    pub ui: UiSettings,
}

/// Track count and looping capability
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Number of track assets, indexed 1..=total_tracks
    #[serde(default = "default_total_tracks")]
    pub total_tracks: u32,

    /// Whether the loop-range controls are available
    #[serde(default = "default_looping_supported")]
    pub looping_supported: bool,
}

/// Audio asset layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetSettings {
    /// Directory holding the numbered track files
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
}

/// Loudness normalizer bounds
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct NormalizerSettings {
    /// Target RMS level selected at startup
    #[serde(default = "default_initial_target")]
    pub initial_target: f32,

    /// Upper bound of the target-level control
    #[serde(default = "default_max_target")]
    pub max_target: f32,
}

/// Terminal UI settings
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct UiSettings {
    /// Frames per second for the spectrum and meter display
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// When `config_path` is `None`, `tilawa.toml` in the working
    /// directory is read if present. Environment variables prefixed
    /// with `TILAWA_` override file values.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match config_path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("tilawa.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TILAWA")
                .separator("_")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| TilawaError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TilawaError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.total_tracks == 0 {
            return Err(TilawaError::Config(
                "total_tracks must be at least 1".to_string(),
            ));
        }

        if self.normalizer.max_target <= 0.0 {
            return Err(TilawaError::Config(
                "max_target must be positive".to_string(),
            ));
        }

        if self.normalizer.initial_target < 0.0
            || self.normalizer.initial_target > self.normalizer.max_target
        {
            return Err(TilawaError::Config(format!(
                "initial_target must be within [0, {}]",
                self.normalizer.max_target
            )));
        }

        if self.ui.frame_rate == 0 || self.ui.frame_rate > 120 {
            return Err(TilawaError::Config(
                "frame_rate must be within 1..=120".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the audio asset for a track index
    ///
    /// Follows the fixed naming convention; indices are not checked
    /// against `total_tracks` here.
    pub fn track_path(&self, index: u32) -> PathBuf {
        self.assets
            .audio_dir
            .join(format!("{TRACK_FILE_STEM}{index}.mp3"))
    }
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        total_tracks: default_total_tracks(),
        looping_supported: default_looping_supported(),
    }
}

fn default_total_tracks() -> u32 {
    15
}

fn default_looping_supported() -> bool {
    true
}

fn default_assets() -> AssetSettings {
    AssetSettings {
        audio_dir: default_audio_dir(),
    }
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_normalizer() -> NormalizerSettings {
    NormalizerSettings {
        initial_target: default_initial_target(),
        max_target: default_max_target(),
    }
}

fn default_initial_target() -> f32 {
    0.5
}

fn default_max_target() -> f32 {
    2.0
}

fn default_ui() -> UiSettings {
    UiSettings {
        frame_rate: default_frame_rate(),
    }
}

fn default_frame_rate() -> u32 {
    30
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        default_normalizer()
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: default_playback(),
            assets: default_assets(),
            normalizer: default_normalizer(),
            ui: default_ui(),
        }
    }
}
