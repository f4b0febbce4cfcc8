//! Error types for playback sequencing

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track index outside the configured range
    #[error("Invalid track index {index} (tracks are 1..={total})")]
    InvalidTrackIndex {
        /// The rejected index
        index: u32,
        /// Number of tracks in the set
        total: u32,
    },

    /// Loop bound outside the configured range
    #[error("Invalid loop bound {bound} (tracks are 1..={total})")]
    InvalidLoopBound {
        /// The rejected bound
        bound: u32,
        /// Number of tracks in the set
        total: u32,
    },

    /// Loop controls used on a configuration without looping
    #[error("Looping is not supported by this configuration")]
    LoopingUnsupported,

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
