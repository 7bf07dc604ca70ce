//! Event routing
//!
//! Maps raw engine signals onto state machine transitions. Each signal is
//! handled to completion on its own: at most one transition, at most one
//! engine command, and handlers never call each other.
//!
//! Caller commands (play, pause, seek) go through here as well so that the
//! engine is always driven from one place.

use crate::buffered::TimeRange;
use crate::engine::{playhead, reached_end, MediaEngine};
use crate::events::{
    EngineSignal, EngineStatus, InterruptionPhase, ItemStatus, PlayerEvent, TimeControlStatus,
};
use crate::seek::{SeekOutcome, SeekToken};
use crate::session::PlaybackSession;
use crate::types::{FailureKind, LoadingReason, PlaybackState};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Result of a routed seek completion, for the caller's callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekCompletion {
    pub token: SeekToken,
    pub success: bool,
    pub outcome: SeekOutcome,
}

/// Signal dispatcher
#[derive(Debug, Clone)]
pub struct EventRouter {
    resume_after_interruption: bool,
}

impl EventRouter {
    pub fn new(resume_after_interruption: bool) -> Self {
        Self {
            resume_after_interruption,
        }
    }

    pub fn resume_after_interruption(&self) -> bool {
        self.resume_after_interruption
    }

    pub fn set_resume_after_interruption(&mut self, resume: bool) {
        self.resume_after_interruption = resume;
    }

    // ===== Commands =====

    /// Start playback of the engine's active item
    ///
    /// When the engine manages stalling itself the state is left to its
    /// signals; otherwise the buffered set decides between `Playing` and
    /// `Loading`.
    pub fn play(session: &mut PlaybackSession, engine: &mut dyn MediaEngine) {
        engine.play(session.rate());

        if engine.waits_to_minimize_stalling() {
            debug!("engine manages stalling, waiting for its signals");
            return;
        }

        if session.can_play_at(playhead(engine)) {
            session.machine.transition(PlaybackState::Playing);
        } else {
            session
                .machine
                .set_loading_reason(LoadingReason::WaitingForData);
        }
    }

    /// Pause, with or without an engine to command
    pub fn pause(session: &mut PlaybackSession, engine: Option<&mut dyn MediaEngine>) {
        session.machine.transition(PlaybackState::Paused);
        if let Some(engine) = engine {
            engine.pause();
        }
    }

    /// Issue a seek, superseding any seek still in flight
    pub fn seek(
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        target: Duration,
    ) -> SeekToken {
        let token = session.seek.begin(target);
        debug!(seek_target = ?target, ?token, "seek issued");
        engine.set_rate(0.0);
        engine.seek(target, token);
        token
    }

    // ===== Signals =====

    /// Handle one signal
    ///
    /// Returns the completion details when the signal finished a seek.
    pub fn route(
        &self,
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        signal: EngineSignal,
    ) -> Option<SeekCompletion> {
        trace!(?signal, state = ?session.state(), "routing signal");

        match signal {
            EngineSignal::RateChanged { rate } => Self::on_rate_changed(session, engine, rate),
            EngineSignal::StatusChanged(status) => Self::on_status_changed(session, status),
            EngineSignal::TimeControlStatusChanged(status) => {
                Self::on_time_control_status(session, engine, status);
            }
            EngineSignal::ItemStatusChanged(status) => {
                Self::on_item_status(session, engine, status);
            }
            EngineSignal::BufferedRangesChanged { ranges } => {
                Self::on_buffered_ranges(session, engine, &ranges);
            }
            EngineSignal::ReachedEnd => Self::on_reached_end(session, engine),
            EngineSignal::NewErrorLogEntry | EngineSignal::FailedToPlayToEnd => {
                warn!(?signal, "engine reported playback failure");
                session
                    .machine
                    .transition(PlaybackState::Error(FailureKind::EngineFailed));
            }
            EngineSignal::Interruption(phase) => self.on_interruption(session, engine, phase),
            EngineSignal::SeekCompleted { token, success } => {
                return Some(Self::on_seek_completed(session, engine, token, success));
            }
            EngineSignal::PeriodicTick { position } => {
                session.notify(PlayerEvent::ProgressChanged { position });
                Self::resolve_waiting(session, engine);
            }
        }
        None
    }

    /// Rate dropped to zero: a stall unless the seek or end of media explains it
    fn on_rate_changed(session: &mut PlaybackSession, engine: &mut dyn MediaEngine, rate: f32) {
        if rate != 0.0 || !engine.has_item() {
            return;
        }

        if reached_end(engine) {
            trace!("rate dropped at end of media");
            return;
        }

        if !session.state().is_active() {
            return;
        }

        if session.seek.should_suppress_stall(&session.buffered) {
            trace!(seek_target = ?session.seek.target(), "stall caused by seek to buffered position, ignored");
            return;
        }

        session
            .machine
            .set_loading_reason(LoadingReason::WaitingForData);
    }

    fn on_status_changed(session: &mut PlaybackSession, status: EngineStatus) {
        if status == EngineStatus::Failed {
            warn!("engine entered failed state");
            session
                .machine
                .transition(PlaybackState::Error(FailureKind::EngineFailed));
        }
    }

    fn on_time_control_status(
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        status: TimeControlStatus,
    ) {
        match status {
            TimeControlStatus::WaitingToPlayAtSpecifiedRate => {
                if session.seek.should_suppress_stall(&session.buffered) {
                    trace!(seek_target = ?session.seek.target(), "wait caused by seek to buffered position, ignored");
                    return;
                }
                session
                    .machine
                    .set_loading_reason(LoadingReason::WaitingToResume);
            }
            TimeControlStatus::Playing => Self::resolve_waiting(session, engine),
            TimeControlStatus::Paused => {}
        }
    }

    fn on_item_status(
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        status: ItemStatus,
    ) {
        match status {
            ItemStatus::ReadyToPlay => {
                // a seek requested before the item was ready has to be re-issued
                let target = session.seek.target();
                if target > Duration::ZERO {
                    debug!(seek_target = ?target, "item ready, re-issuing pending seek");
                    Self::seek(session, engine, target);
                }
            }
            ItemStatus::Failed => {
                warn!("media item failed");
                session
                    .machine
                    .transition(PlaybackState::Error(FailureKind::ItemFailed));
            }
            ItemStatus::Unknown => {}
        }
    }

    fn on_buffered_ranges(
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        ranges: &[TimeRange],
    ) {
        if ranges.is_empty() {
            return;
        }
        for range in ranges {
            session.buffered.add_range(*range);
        }

        let position = playhead(engine);
        let leading_edge = session
            .buffered
            .leading_edge_from(position)
            .unwrap_or(Duration::ZERO);
        session.notify(PlayerEvent::BufferedProgressChanged {
            position: leading_edge,
        });

        if session.loading_reason() == LoadingReason::WaitingForData {
            debug!(?position, "data arrived, resuming engine");
            engine.play(session.rate());
            session
                .machine
                .set_loading_reason(LoadingReason::WaitingToResume);
        }
    }

    /// End notifications arrive early sometimes; trust only the playhead
    fn on_reached_end(session: &mut PlaybackSession, engine: &mut dyn MediaEngine) {
        if reached_end(engine) {
            session.machine.transition(PlaybackState::Ended);
        } else {
            debug!(
                position = ?engine.current_position(),
                duration = ?engine.duration(),
                "spurious end of media ignored"
            );
        }
    }

    fn on_interruption(
        &self,
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        phase: InterruptionPhase,
    ) {
        match phase {
            InterruptionPhase::Began => debug!("playback interrupted"),
            InterruptionPhase::Ended { should_resume } => {
                if self.resume_after_interruption && should_resume && engine.has_item() {
                    // the following rate change drives the state
                    debug!("interruption ended, nudging engine to resume");
                    engine.play(session.rate());
                }
            }
        }
    }

    fn on_seek_completed(
        session: &mut PlaybackSession,
        engine: &mut dyn MediaEngine,
        token: SeekToken,
        success: bool,
    ) -> SeekCompletion {
        let outcome = session.seek.complete(token);
        let completion = SeekCompletion {
            token,
            success,
            outcome,
        };

        if outcome == SeekOutcome::Superseded {
            debug!(?token, "completion of superseded seek ignored");
            return completion;
        }

        match session.state() {
            PlaybackState::Playing => engine.play(session.rate()),
            PlaybackState::Loading => {
                engine.play(session.rate());
                if session.can_play_at(playhead(engine)) {
                    session.machine.transition(PlaybackState::Playing);
                } else {
                    session
                        .machine
                        .set_loading_reason(LoadingReason::WaitingForData);
                }
            }
            // the engine sits at rate 0 after seeking
            PlaybackState::Ended | PlaybackState::Error(_) => {
                session.machine.transition(PlaybackState::Paused);
            }
            PlaybackState::Idle | PlaybackState::Paused => {}
        }
        completion
    }

    /// `Loading(WaitingToResume)` settles into `Playing` once the playhead is
    /// buffered and the engine is actually running
    fn resolve_waiting(session: &mut PlaybackSession, engine: &mut dyn MediaEngine) {
        if session.loading_reason() == LoadingReason::WaitingToResume
            && session.can_play_at(playhead(engine))
            && engine.rate() != 0.0
        {
            session.machine.transition(PlaybackState::Playing);
        }
    }
}
