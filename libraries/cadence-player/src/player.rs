//! Player - the public controller
//!
//! Owns the session, the router and the source lifecycle. Every public
//! operation and every engine signal runs to completion here, then the
//! notifications it produced are delivered to the observer and queued for
//! [`Player::drain_events`].

use crate::engine::{playhead, EngineFactory};
use crate::error::{PlayerError, Result};
use crate::events::{EngineSignal, PlayerEvent};
use crate::lifecycle::SourceLifecycle;
use crate::router::EventRouter;
use crate::seek::SeekToken;
use crate::session::PlaybackSession;
use crate::source::{SourceResolver, SourceRewriter};
use crate::types::{validate_rate, LoadingReason, PlaybackState, PlayerConfig, PlayerId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, debug_span};

/// Receives notifications synchronously, on the player's context
///
/// Every method defaults to a no-op.
pub trait PlayerObserver {
    fn on_state_changed(&mut self, _state: PlaybackState) {}

    fn on_loading_reason_changed(&mut self, _reason: LoadingReason) {}

    fn on_progress_changed(&mut self, _progress: Duration) {}

    fn on_buffered_progress_changed(&mut self, _buffered: Duration) {}
}

/// Callback fired when a seek completes, with the engine's success flag
pub type SeekCallback = Box<dyn FnOnce(bool)>;

/// Playback controller for one track at a time
pub struct Player {
    id: PlayerId,
    config: PlayerConfig,
    session: PlaybackSession,
    router: EventRouter,
    lifecycle: SourceLifecycle,
    observer: Option<Box<dyn PlayerObserver>>,
    seek_callbacks: HashMap<SeekToken, SeekCallback>,
    pending_events: Vec<PlayerEvent>,
}

impl Player {
    /// Create a player; the engine is built by `factory` on the first source
    pub fn new(config: PlayerConfig, factory: Box<dyn EngineFactory>) -> Result<Self> {
        Self::with_rewriters(config, factory, Vec::new())
    }

    /// Create a player whose sources pass through `rewriters`, in order
    pub fn with_rewriters(
        config: PlayerConfig,
        factory: Box<dyn EngineFactory>,
        rewriters: Vec<Box<dyn SourceRewriter>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut resolver = SourceResolver::new();
        for rewriter in rewriters {
            resolver.add_rewriter(rewriter);
        }

        let id = PlayerId::new();
        debug!(player_id = %id, ?config, "player created");

        Ok(Self {
            id,
            session: PlaybackSession::new(config.playback_rate),
            router: EventRouter::new(config.resume_after_interruption),
            lifecycle: SourceLifecycle::new(factory, resolver),
            config,
            observer: None,
            seek_callbacks: HashMap::new(),
            pending_events: Vec::new(),
        })
    }

    // ===== Source =====

    /// Load `source`, replacing the current one; `None` detaches
    ///
    /// Seeks still in flight on the old item are reported as failed.
    pub fn set_source(&mut self, source: Option<&str>) -> Result<()> {
        let _span = debug_span!("set_source", player_id = %self.id).entered();
        let result = self.lifecycle.set_source(
            &mut self.session,
            source,
            self.config.progress_tick_interval,
        );
        self.flush_events();
        self.fail_pending_seeks();
        result
    }

    pub fn source(&self) -> Option<&str> {
        self.session.source()
    }

    // ===== Playback Control =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        let _span = debug_span!("play", player_id = %self.id).entered();
        let engine = self
            .lifecycle
            .engine_mut()
            .filter(|engine| engine.has_item())
            .ok_or(PlayerError::NoEngine)?;

        EventRouter::play(&mut self.session, engine);
        self.flush_events();
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) {
        let _span = debug_span!("pause", player_id = %self.id).entered();
        EventRouter::pause(&mut self.session, self.lifecycle.engine_mut());
        self.flush_events();
    }

    /// Seek to `position`; `on_complete` receives the engine's success flag
    ///
    /// Returns immediately. A later `seek_to` supersedes this one: its
    /// callback still fires, but its completion no longer drives the state.
    pub fn seek_to<F>(&mut self, position: Duration, on_complete: F) -> Result<()>
    where
        F: FnOnce(bool) + 'static,
    {
        let _span = debug_span!("seek_to", player_id = %self.id).entered();
        let engine = self.lifecycle.engine_mut().ok_or(PlayerError::NoEngine)?;

        if let Some(duration) = engine.duration() {
            if position > duration {
                return Err(PlayerError::SeekBeyondDuration {
                    target: position,
                    duration,
                });
            }
        }

        let token = EventRouter::seek(&mut self.session, engine, position);
        self.seek_callbacks.insert(token, Box::new(on_complete));
        self.flush_events();
        Ok(())
    }

    // ===== Signals =====

    /// Feed one engine or environment signal
    pub fn handle_signal(&mut self, signal: EngineSignal) {
        let _span = debug_span!("signal", player_id = %self.id).entered();

        if let Some(scope) = signal.scope() {
            if !self.lifecycle.subscriptions().is_active(scope) {
                debug!(?signal, "signal for inactive subscription dropped");
                return;
            }
        }

        let Some(engine) = self.lifecycle.engine_mut() else {
            debug!(?signal, "signal without engine dropped");
            return;
        };

        let completion = self.router.route(&mut self.session, engine, signal);
        self.flush_events();

        if let Some(completion) = completion {
            if let Some(callback) = self.seek_callbacks.remove(&completion.token) {
                callback(completion.success);
            }
        }
    }

    // ===== State Queries =====

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn loading_reason(&self) -> LoadingReason {
        self.session.loading_reason()
    }

    /// Current position, zero while unknown
    pub fn progress(&self) -> Duration {
        self.lifecycle.engine().map_or(Duration::ZERO, playhead)
    }

    /// End of the loaded range covering or following the playhead
    pub fn buffered_progress(&self) -> Duration {
        self.session
            .buffered()
            .leading_edge_from(self.progress())
            .unwrap_or(Duration::ZERO)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.lifecycle.engine().and_then(|engine| engine.duration())
    }

    pub fn is_seeking(&self) -> bool {
        self.session.seek().is_seeking()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    // ===== Settings =====

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn playback_rate(&self) -> f32 {
        self.session.rate()
    }

    /// Change the playback rate
    ///
    /// Applied to the engine right away only while playing or loading, so a
    /// paused player stays paused.
    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        validate_rate(rate)?;
        self.config.playback_rate = rate;
        self.session.set_rate(rate);

        if self.session.state().is_active() {
            if let Some(engine) = self.lifecycle.engine_mut() {
                engine.set_rate(rate);
            }
        }
        Ok(())
    }

    /// Change how often progress is reported
    pub fn set_progress_tick_interval(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(PlayerError::InvalidConfig(
                "progress_tick_interval must be non-zero".to_string(),
            ));
        }
        self.config.progress_tick_interval = interval;
        self.lifecycle.update_tick_interval(interval);
        Ok(())
    }

    pub fn set_resume_after_interruption(&mut self, resume: bool) {
        self.config.resume_after_interruption = resume;
        self.router.set_resume_after_interruption(resume);
    }

    // ===== Events =====

    /// Install the synchronous observer, replacing any previous one
    pub fn set_observer(&mut self, observer: Box<dyn PlayerObserver>) {
        self.observer = Some(observer);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn fail_pending_seeks(&mut self) {
        if self.seek_callbacks.is_empty() {
            return;
        }
        let mut stale: Vec<_> = self.seek_callbacks.drain().collect();
        stale.sort_by_key(|(token, _)| *token);
        debug!(count = stale.len(), "failing seeks of the replaced source");
        for (_, callback) in stale {
            callback(false);
        }
    }

    fn flush_events(&mut self) {
        for event in self.session.take_events() {
            if let Some(observer) = self.observer.as_mut() {
                match &event {
                    PlayerEvent::StateChanged { state } => observer.on_state_changed(*state),
                    PlayerEvent::LoadingReasonChanged { reason } => {
                        observer.on_loading_reason_changed(*reason);
                    }
                    PlayerEvent::ProgressChanged { position } => {
                        observer.on_progress_changed(*position);
                    }
                    PlayerEvent::BufferedProgressChanged { position } => {
                        observer.on_buffered_progress_changed(*position);
                    }
                }
            }
            self.pending_events.push(event);
        }
    }
}
