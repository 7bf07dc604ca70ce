//! Player Events
//!
//! Two directions of traffic:
//! - [`EngineSignal`]: the closed set of raw signals the media engine and the
//!   host environment deliver to the player
//! - [`PlayerEvent`]: the stable, user-facing notifications the player emits

use crate::buffered::TimeRange;
use crate::seek::SeekToken;
use crate::types::{LoadingReason, PlaybackState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted towards the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playback state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// Loading sub-state changed
    LoadingReasonChanged {
        /// The new reason
        reason: LoadingReason,
    },

    /// Periodic playhead report
    ProgressChanged {
        /// Current position
        position: Duration,
    },

    /// Buffered leading edge moved
    BufferedProgressChanged {
        /// End of the loaded range at or after the playhead
        position: Duration,
    },
}

/// Player-level engine status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Status of the engine's active item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Whether the engine is rendering, paused, or waiting to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    Paused,
    WaitingToPlayAtSpecifiedRate,
    Playing,
}

/// External interruption (phone call, other audio session)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionPhase {
    Began,
    Ended {
        /// The environment suggests resuming
        should_resume: bool,
    },
}

/// Subscription groups a signal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalScope {
    /// Engine-wide properties (rate, status, time control)
    Player,

    /// Properties of the active item (item status, loaded ranges)
    Item,

    /// Notifications (end of media, error log, interruption)
    Notifications,

    /// Periodic progress ticks
    Progress,
}

/// Raw signal from the engine or environment
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    RateChanged { rate: f32 },
    StatusChanged(EngineStatus),
    TimeControlStatusChanged(TimeControlStatus),
    ItemStatusChanged(ItemStatus),

    /// Ranges the engine currently reports as loaded
    BufferedRangesChanged { ranges: Vec<TimeRange> },

    ReachedEnd,
    NewErrorLogEntry,
    FailedToPlayToEnd,
    Interruption(InterruptionPhase),

    /// Completion of the seek identified by `token`
    SeekCompleted { token: SeekToken, success: bool },

    PeriodicTick { position: Duration },
}

impl EngineSignal {
    /// Subscription that must be live for this signal to be handled
    ///
    /// Seek completions answer a command and are always accepted.
    pub fn scope(&self) -> Option<SignalScope> {
        match self {
            EngineSignal::RateChanged { .. }
            | EngineSignal::StatusChanged(_)
            | EngineSignal::TimeControlStatusChanged(_) => Some(SignalScope::Player),
            EngineSignal::ItemStatusChanged(_) | EngineSignal::BufferedRangesChanged { .. } => {
                Some(SignalScope::Item)
            }
            EngineSignal::ReachedEnd
            | EngineSignal::NewErrorLogEntry
            | EngineSignal::FailedToPlayToEnd
            | EngineSignal::Interruption(_) => Some(SignalScope::Notifications),
            EngineSignal::PeriodicTick { .. } => Some(SignalScope::Progress),
            EngineSignal::SeekCompleted { .. } => None,
        }
    }
}
