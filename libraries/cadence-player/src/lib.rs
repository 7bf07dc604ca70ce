//! Cadence - Playback Coordination
//!
//! Turns the noisy signal stream of an external media engine into a small,
//! stable playback state machine for one streamed or local track.
//!
//! This crate provides:
//! - Playback state (idle, loading, playing, paused, ended, error) with a
//!   loading sub-state explaining every stall
//! - Buffered range tracking that accumulates what the engine has loaded
//! - Seek coordination that hides stalls caused by seeking into buffered data
//! - Signal routing from raw engine signals to state transitions
//! - Source lifecycle: resolution, rewrite plugins, engine subscriptions
//!
//! # Architecture
//!
//! The engine (fetch, decode, output) lives outside this crate behind the
//! [`MediaEngine`] trait. Signals from the engine are fed to
//! [`Player::handle_signal`] on the same serialized context the public
//! operations run on, so the session needs no locking:
//!
//! ```text
//! engine signal -> EventRouter -> PlaybackStateMachine -> PlayerObserver
//! play/pause/seek_to -> EventRouter / SeekCoordinator -> MediaEngine
//! ```
//!
//! # Example: Buffered Ranges
//!
//! ```rust
//! use cadence_player::{BufferedRanges, TimeRange};
//! use std::time::Duration;
//!
//! let mut buffered = BufferedRanges::new();
//! buffered.add_range(TimeRange::new(Duration::from_secs(0), Duration::from_secs(5)));
//! buffered.add_range(TimeRange::new(Duration::from_secs(5), Duration::from_secs(3)));
//!
//! assert_eq!(buffered.ranges().len(), 1);
//! assert!(buffered.can_play(Duration::from_secs(7)));
//! assert!(!buffered.can_play(Duration::from_secs(8)));
//! ```

mod buffered;
mod engine;
mod error;
mod events;
mod lifecycle;
mod player;
mod router;
mod seek;
mod session;
mod source;
mod state;
pub mod types;

// Public exports
pub use buffered::{BufferedRanges, TimeRange};
pub use engine::{EngineFactory, MediaEngine, MediaItem, SourceKind, SubscriptionId};
pub use error::{PlayerError, Result};
pub use events::{
    EngineSignal, EngineStatus, InterruptionPhase, ItemStatus, PlayerEvent, SignalScope,
    TimeControlStatus,
};
pub use lifecycle::{SourceLifecycle, SubscriptionSet};
pub use player::{Player, PlayerObserver, SeekCallback};
pub use router::{EventRouter, SeekCompletion};
pub use seek::{SeekCoordinator, SeekOutcome, SeekToken};
pub use session::PlaybackSession;
pub use source::{SourceResolver, SourceRewriter};
pub use state::PlaybackStateMachine;
pub use types::{FailureKind, LoadingReason, PlaybackState, PlayerConfig, PlayerId};
