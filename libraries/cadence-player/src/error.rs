//! Error types for playback coordination

use std::time::Duration;
use thiserror::Error;

/// Player errors
///
/// Failures reported by the media engine are not errors here: they are
/// surfaced as `PlaybackState::Error` through the state observer.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// No engine or no active item to act on
    #[error("No media engine loaded")]
    NoEngine,

    /// Engine reported a time range that cannot be represented
    #[error("Invalid time range: start {start}, length {length}")]
    InvalidRange {
        /// Reported start in seconds
        start: f64,
        /// Reported length in seconds
        length: f64,
    },

    /// Seek target lies past the known item duration
    #[error("Seek target {target:?} is beyond duration {duration:?}")]
    SeekBeyondDuration {
        /// Requested position
        target: Duration,
        /// Known duration of the current item
        duration: Duration,
    },

    /// Raw source could not be turned into a URL
    #[error("Source resolution failed: {0}")]
    SourceResolution(String),

    /// Engine factory could not construct an engine
    #[error("Engine creation failed: {0}")]
    EngineCreation(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
