//! Core types for playback coordination

use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Why the current source stopped being playable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The media item cannot be decoded or fetched
    ItemFailed,

    /// The playback engine itself entered a failure state
    EngineFailed,
}

/// User-facing playback state
///
/// Exactly one state is active at a time. `Error` values compare equal only
/// when their kinds match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing has been played yet
    Idle,

    /// Stalled, see [`LoadingReason`] for the cause
    Loading,

    /// Audio is being rendered
    Playing,

    /// Paused by the caller
    Paused,

    /// Current item played through to its end
    Ended,

    /// Terminal for the current source until the caller acts again
    Error(FailureKind),
}

impl PlaybackState {
    /// Playing or loading: stalls count here, and rate changes reach the
    /// engine right away
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Loading)
    }
}

/// Sub-state of [`PlaybackState::Loading`]
///
/// Only meaningful while the session is `Loading`; reset to `None` whenever
/// the session settles into any other state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingReason {
    /// Not loading
    #[default]
    None,

    /// Waiting for data covering the playhead to arrive
    WaitingForData,

    /// Data arrived, waiting for the engine to actually resume
    WaitingToResume,
}

/// Unique player instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Allocate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Configuration for a [`crate::Player`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Interval of periodic progress reports (default: 1s)
    pub progress_tick_interval: Duration,

    /// Resume after an external interruption ends (default: true)
    pub resume_after_interruption: bool,

    /// Rate the engine is driven at while playing (default: 1.0)
    pub playback_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_tick_interval: Duration::from_secs(1),
            resume_after_interruption: true,
            playback_rate: 1.0,
        }
    }
}

impl PlayerConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.progress_tick_interval.is_zero() {
            return Err(PlayerError::InvalidConfig(
                "progress_tick_interval must be non-zero".to_string(),
            ));
        }
        validate_rate(self.playback_rate)
    }
}

pub(crate) fn validate_rate(rate: f32) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(PlayerError::InvalidConfig(format!(
            "playback_rate must be positive and finite, got {rate}"
        )))
    }
}
