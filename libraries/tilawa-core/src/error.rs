//! Core error types for Tilawa

use thiserror::Error;

/// Result type alias using `TilawaError`
pub type Result<T> = std::result::Result<T, TilawaError>;

/// Core error type for Tilawa
#[derive(Error, Debug)]
pub enum TilawaError {
    /// Configuration load or validation errors
    #[error("Config error: {0}")]
    Config(String),
}
