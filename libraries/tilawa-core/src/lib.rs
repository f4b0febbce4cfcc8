//! Tilawa Core
//!
//! Shared configuration and error handling for the Tilawa recitation player.
//!
//! This crate holds everything the playback, audio, and application crates
//! agree on: the player configuration (track count, looping support, asset
//! layout, normalizer bounds, frame rate) and the unified error type.
//!
//! # Architecture
//!
//! - **Configuration**: [`PlayerConfig`] with its nested sections, loaded
//!   from `tilawa.toml` plus `TILAWA_`-prefixed environment overrides.
//! - **Asset layout**: track paths derived from the fixed
//!   `audio/tiktokQuran{index}.mp3` convention via
//!   [`PlayerConfig::track_path`].
//! - **Error Handling**: unified [`TilawaError`] and [`Result`] types.
//!
//! # Example
//!
//! ```rust
//! use tilawa_core::PlayerConfig;
//!
//! let config = PlayerConfig::default();
//! assert_eq!(config.playback.total_tracks, 15);
//! assert!(config.playback.looping_supported);
//!
//! let path = config.track_path(3);
//! assert!(path.ends_with("tiktokQuran3.mp3"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{
    AssetSettings, NormalizerSettings, PlaybackSettings, PlayerConfig, UiSettings,
};
pub use error::{Result, TilawaError};
