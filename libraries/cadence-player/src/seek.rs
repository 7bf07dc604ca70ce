//! Seek coordination
//!
//! Tracks the in-flight seek so stall reports caused by the seek itself can
//! be told apart from real buffering.

use crate::buffered::BufferedRanges;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one seek command; echoed back by the engine on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeekToken(u64);

/// How a completion relates to the most recent seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Completion of the most recent seek
    Current,

    /// A later seek was issued before this one completed
    Superseded,
}

/// In-flight seek state
///
/// The target is kept after completion until the next seek overwrites it,
/// so late stall signals can still ask whether it was already buffered.
#[derive(Debug, Clone, Default)]
pub struct SeekCoordinator {
    is_seeking: bool,
    target: Duration,
    latest: Option<SeekToken>,
    next_token: u64,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a seek to `target`, superseding any seek still in flight
    pub fn begin(&mut self, target: Duration) -> SeekToken {
        let token = SeekToken(self.next_token);
        self.next_token += 1;
        self.is_seeking = true;
        self.target = target;
        self.latest = Some(token);
        token
    }

    /// Record a completion
    ///
    /// Only the most recent seek clears the seeking flag.
    pub fn complete(&mut self, token: SeekToken) -> SeekOutcome {
        if self.latest == Some(token) {
            self.is_seeking = false;
            self.latest = None;
            SeekOutcome::Current
        } else {
            SeekOutcome::Superseded
        }
    }

    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    /// Last requested seek position
    pub fn target(&self) -> Duration {
        self.target
    }

    pub fn is_target_buffered(&self, buffered: &BufferedRanges) -> bool {
        buffered.can_play(self.target)
    }

    /// A stall is an artifact of the seek when the target is already loaded
    pub fn should_suppress_stall(&self, buffered: &BufferedRanges) -> bool {
        self.is_seeking && self.is_target_buffered(buffered)
    }

    /// Forget the current seek (source change)
    ///
    /// Token numbering continues, so completions from the old source read as
    /// superseded.
    pub fn reset(&mut self) {
        self.is_seeking = false;
        self.target = Duration::ZERO;
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffered::TimeRange;

    fn buffered(start: u64, length: u64) -> BufferedRanges {
        let mut ranges = BufferedRanges::new();
        ranges.add_range(TimeRange::new(
            Duration::from_secs(start),
            Duration::from_secs(length),
        ));
        ranges
    }

    #[test]
    fn begin_and_complete() {
        let mut seek = SeekCoordinator::new();
        let token = seek.begin(Duration::from_secs(10));
        assert!(seek.is_seeking());

        assert_eq!(seek.complete(token), SeekOutcome::Current);
        assert!(!seek.is_seeking());
        assert_eq!(seek.target(), Duration::from_secs(10));
    }

    #[test]
    fn superseded_completion_keeps_seeking() {
        let mut seek = SeekCoordinator::new();
        let first = seek.begin(Duration::from_secs(10));
        let second = seek.begin(Duration::from_secs(30));
        assert_ne!(first, second);

        assert_eq!(seek.complete(first), SeekOutcome::Superseded);
        assert!(seek.is_seeking());
        assert_eq!(seek.target(), Duration::from_secs(30));

        assert_eq!(seek.complete(second), SeekOutcome::Current);
        assert!(!seek.is_seeking());
    }

    #[test]
    fn duplicate_completion_is_superseded() {
        let mut seek = SeekCoordinator::new();
        let token = seek.begin(Duration::from_secs(1));
        assert_eq!(seek.complete(token), SeekOutcome::Current);
        assert_eq!(seek.complete(token), SeekOutcome::Superseded);
    }

    #[test]
    fn suppresses_stall_only_when_target_buffered() {
        let mut seek = SeekCoordinator::new();
        seek.begin(Duration::from_secs(10));

        assert!(seek.should_suppress_stall(&buffered(8, 5)));
        assert!(!seek.should_suppress_stall(&buffered(20, 5)));
        assert!(!seek.should_suppress_stall(&BufferedRanges::new()));
    }

    #[test]
    fn no_suppression_after_completion() {
        let mut seek = SeekCoordinator::new();
        let token = seek.begin(Duration::from_secs(10));
        seek.complete(token);

        assert!(seek.is_target_buffered(&buffered(8, 5)));
        assert!(!seek.should_suppress_stall(&buffered(8, 5)));
    }

    #[test]
    fn reset_invalidates_outstanding_tokens() {
        let mut seek = SeekCoordinator::new();
        let token = seek.begin(Duration::from_secs(10));
        seek.reset();

        assert!(!seek.is_seeking());
        assert_eq!(seek.target(), Duration::ZERO);
        assert_eq!(seek.complete(token), SeekOutcome::Superseded);

        let fresh = seek.begin(Duration::from_secs(2));
        assert_ne!(fresh, token);
    }
}
