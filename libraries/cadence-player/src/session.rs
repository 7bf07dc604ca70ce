//! Playback session - the aggregate every handler mutates

use crate::buffered::BufferedRanges;
use crate::events::PlayerEvent;
use crate::seek::SeekCoordinator;
use crate::state::PlaybackStateMachine;
use crate::types::{LoadingReason, PlaybackState};
use std::time::Duration;

/// Everything the player knows about the current playback
///
/// Lives as long as the player. Source-scoped parts (buffered ranges, seek
/// state, loading reason) are reset on every source change.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub(crate) machine: PlaybackStateMachine,
    pub(crate) buffered: BufferedRanges,
    pub(crate) seek: SeekCoordinator,
    source: Option<String>,
    rate: f32,
}

impl PlaybackSession {
    pub fn new(rate: f32) -> Self {
        Self {
            machine: PlaybackStateMachine::new(),
            buffered: BufferedRanges::new(),
            seek: SeekCoordinator::new(),
            source: None,
            rate,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn loading_reason(&self) -> LoadingReason {
        self.machine.loading_reason()
    }

    pub fn buffered(&self) -> &BufferedRanges {
        &self.buffered
    }

    pub fn seek(&self) -> &SeekCoordinator {
        &self.seek
    }

    /// Raw source string as the caller set it
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub(crate) fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    /// Whether data is loaded at `position`
    pub fn can_play_at(&self, position: Duration) -> bool {
        self.buffered.can_play(position)
    }

    /// Start over for a new source (or none)
    ///
    /// A session that was loading keeps loading, now waiting for the new
    /// item's data. `Ended` and `Error` belong to the old item and settle
    /// into `Paused`.
    pub(crate) fn reset_for_source(&mut self, source: Option<String>) {
        self.buffered.clear();
        self.seek.reset();
        self.source = source;

        match self.machine.state() {
            PlaybackState::Loading => self
                .machine
                .set_loading_reason(LoadingReason::WaitingForData),
            PlaybackState::Ended | PlaybackState::Error(_) => {
                self.machine.transition(PlaybackState::Paused);
            }
            PlaybackState::Idle | PlaybackState::Playing | PlaybackState::Paused => {
                self.machine.clear_loading_reason();
            }
        }
    }

    pub(crate) fn notify(&mut self, event: PlayerEvent) {
        self.machine.notify(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.machine.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffered::TimeRange;

    #[test]
    fn reset_clears_source_scoped_state() {
        let mut session = PlaybackSession::new(1.0);
        session.reset_for_source(Some("a.mp3".to_string()));
        session.buffered.add_range(TimeRange::new(
            Duration::ZERO,
            Duration::from_secs(10),
        ));
        session.seek.begin(Duration::from_secs(5));
        session
            .machine
            .set_loading_reason(LoadingReason::WaitingToResume);

        session.reset_for_source(Some("b.mp3".to_string()));

        assert!(session.buffered().is_empty());
        assert!(!session.seek().is_seeking());
        assert_eq!(session.seek().target(), Duration::ZERO);
        assert_eq!(session.source(), Some("b.mp3"));
        // the new item has no data yet
        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(session.loading_reason(), LoadingReason::WaitingForData);
    }

    #[test]
    fn reset_leaves_terminal_states() {
        for terminal in [
            PlaybackState::Ended,
            PlaybackState::Error(crate::types::FailureKind::EngineFailed),
        ] {
            let mut session = PlaybackSession::new(1.0);
            session.machine.transition(terminal);

            session.reset_for_source(Some("b.mp3".to_string()));

            assert_eq!(session.state(), PlaybackState::Paused, "from {terminal:?}");
            assert_eq!(session.loading_reason(), LoadingReason::None);
        }
    }

    #[test]
    fn reset_keeps_playing_state() {
        let mut session = PlaybackSession::new(1.0);
        session.machine.transition(PlaybackState::Playing);

        session.reset_for_source(Some("b.mp3".to_string()));

        assert_eq!(session.state(), PlaybackState::Playing);
    }

    #[test]
    fn rate_is_session_wide() {
        let mut session = PlaybackSession::new(1.0);
        session.set_rate(1.5);
        session.reset_for_source(None);
        assert_eq!(session.rate(), 1.5);
    }
}
