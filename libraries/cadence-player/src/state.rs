//! Playback state machine
//!
//! Holds the user-facing state and its loading sub-state, and queues a
//! notification for every change that observers should see.

use crate::events::PlayerEvent;
use crate::types::{LoadingReason, PlaybackState};
use tracing::debug;

/// State plus loading reason, with change notifications
#[derive(Debug, Clone)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
    loading_reason: LoadingReason,
    pending_events: Vec<PlayerEvent>,
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            loading_reason: LoadingReason::None,
            pending_events: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn loading_reason(&self) -> LoadingReason {
        self.loading_reason
    }

    /// Move to `to`
    ///
    /// Returns `false` (and notifies nobody) if `to` is already current.
    /// Leaving `Loading` resets the loading reason.
    pub fn transition(&mut self, to: PlaybackState) -> bool {
        if self.state == to {
            return false;
        }

        let from = std::mem::replace(&mut self.state, to);
        debug!(?from, ?to, "playback state changed");
        self.pending_events
            .push(PlayerEvent::StateChanged { state: to });

        if to != PlaybackState::Loading {
            self.clear_loading_reason();
        }
        true
    }

    /// Set why playback is stalled
    ///
    /// Any reason other than `None` forces `Loading`. Setting `None` leaves
    /// the state alone; the caller picks the next concrete state.
    pub fn set_loading_reason(&mut self, reason: LoadingReason) {
        if reason != LoadingReason::None {
            self.transition(PlaybackState::Loading);
        }
        self.update_reason(reason);
    }

    /// Reset the reason without touching the state (source change)
    pub fn clear_loading_reason(&mut self) {
        self.update_reason(LoadingReason::None);
    }

    fn update_reason(&mut self, reason: LoadingReason) {
        if self.loading_reason == reason {
            return;
        }
        debug!(from = ?self.loading_reason, to = ?reason, "loading reason changed");
        self.loading_reason = reason;
        self.pending_events
            .push(PlayerEvent::LoadingReasonChanged { reason });
    }

    /// Queue a notification that isn't a state change
    pub(crate) fn notify(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    /// Take every notification queued since the last call
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
