//! Source lifecycle
//!
//! Owns the engine and every subscription made on it. Swapping sources
//! replaces subscriptions instead of stacking them, and dropping the
//! lifecycle releases whatever is still registered.

use crate::engine::{EngineFactory, MediaEngine, SubscriptionId};
use crate::error::Result;
use crate::events::{PlayerEvent, SignalScope};
use crate::router::EventRouter;
use crate::session::PlaybackSession;
use crate::source::SourceResolver;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Live registrations on the engine, one slot per scope
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    player: Option<SubscriptionId>,
    item: Option<SubscriptionId>,
    notifications: Option<SubscriptionId>,
    progress: Option<SubscriptionId>,
}

impl SubscriptionSet {
    fn slot(&mut self, scope: SignalScope) -> &mut Option<SubscriptionId> {
        match scope {
            SignalScope::Player => &mut self.player,
            SignalScope::Item => &mut self.item,
            SignalScope::Notifications => &mut self.notifications,
            SignalScope::Progress => &mut self.progress,
        }
    }

    pub fn is_active(&self, scope: SignalScope) -> bool {
        match scope {
            SignalScope::Player => self.player.is_some(),
            SignalScope::Item => self.item.is_some(),
            SignalScope::Notifications => self.notifications.is_some(),
            SignalScope::Progress => self.progress.is_some(),
        }
    }

    /// Subscribe to `scope`, dropping any previous subscription first
    fn replace(&mut self, engine: &mut dyn MediaEngine, scope: SignalScope) {
        self.release(engine, scope);
        *self.slot(scope) = Some(engine.subscribe(scope));
    }

    /// Register a periodic observer, dropping any previous one first
    fn replace_progress(&mut self, engine: &mut dyn MediaEngine, interval: Duration) {
        self.release(engine, SignalScope::Progress);
        self.progress = Some(engine.add_periodic_observer(interval));
    }

    fn release(&mut self, engine: &mut dyn MediaEngine, scope: SignalScope) {
        if let Some(id) = self.slot(scope).take() {
            if scope == SignalScope::Progress {
                engine.remove_periodic_observer(id);
            } else {
                engine.unsubscribe(id);
            }
        }
    }

    fn release_all(&mut self, engine: &mut dyn MediaEngine) {
        for scope in [
            SignalScope::Progress,
            SignalScope::Item,
            SignalScope::Notifications,
            SignalScope::Player,
        ] {
            self.release(engine, scope);
        }
    }
}

/// Engine ownership and source swapping
pub struct SourceLifecycle {
    factory: Box<dyn EngineFactory>,
    resolver: SourceResolver,
    engine: Option<Box<dyn MediaEngine>>,
    subscriptions: SubscriptionSet,
}

impl SourceLifecycle {
    pub fn new(factory: Box<dyn EngineFactory>, resolver: SourceResolver) -> Self {
        Self {
            factory,
            resolver,
            engine: None,
            subscriptions: SubscriptionSet::default(),
        }
    }

    pub fn engine(&self) -> Option<&dyn MediaEngine> {
        self.engine.as_deref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut dyn MediaEngine> {
        self.engine
            .as_deref_mut()
            .map(|engine| engine as &mut dyn MediaEngine)
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    /// Point the player at `source`, or detach it with `None` (or an empty
    /// string)
    ///
    /// A source that fails to resolve (or whose engine can't be built)
    /// detaches the player the same way `None` does, then reports the error.
    pub fn set_source(
        &mut self,
        session: &mut PlaybackSession,
        source: Option<&str>,
        tick_interval: Duration,
    ) -> Result<()> {
        let Some(raw) = source.filter(|raw| !raw.trim().is_empty()) else {
            if session.source().is_some() {
                info!("source cleared");
                self.detach(session);
            }
            return Ok(());
        };

        let item = match self.resolver.resolve(raw) {
            Ok(item) => item,
            Err(e) => {
                warn!(source = raw, error = %e, "source resolution failed, detaching");
                self.detach(session);
                return Err(e);
            }
        };

        if let Some(engine) = self.engine.as_deref_mut() {
            self.subscriptions.release(engine, SignalScope::Item);
        }
        session.reset_for_source(Some(raw.to_string()));

        match self.engine.as_deref_mut() {
            Some(engine) => {
                if self.subscriptions.is_active(SignalScope::Progress) {
                    session.notify(PlayerEvent::ProgressChanged {
                        position: Duration::ZERO,
                    });
                }
                debug!(url = %item.url, kind = ?item.kind, "replacing engine item");
                engine.replace_item(Some(item));
            }
            None => {
                debug!(url = %item.url, kind = ?item.kind, "creating engine");
                let created = match self.factory.create(item) {
                    Ok(engine) => engine,
                    Err(e) => {
                        warn!(source = raw, error = %e, "engine creation failed, detaching");
                        self.detach(session);
                        return Err(e);
                    }
                };
                let engine = self.engine.insert(created);
                self.subscriptions
                    .replace(engine.as_mut(), SignalScope::Player);
            }
        }

        self.attach(tick_interval);
        info!(source = raw, "source loaded");
        Ok(())
    }

    /// Re-register the periodic observer at a new interval, if one is live
    pub fn update_tick_interval(&mut self, interval: Duration) {
        if !self.subscriptions.is_active(SignalScope::Progress) {
            return;
        }
        if let Some(engine) = self.engine.as_deref_mut() {
            self.subscriptions.replace_progress(engine, interval);
        }
    }

    fn attach(&mut self, tick_interval: Duration) {
        let Some(engine) = self.engine.as_deref_mut() else {
            return;
        };
        self.subscriptions.replace_progress(engine, tick_interval);
        self.subscriptions
            .replace(engine, SignalScope::Notifications);
        self.subscriptions.replace(engine, SignalScope::Item);
    }

    /// Pause, stop progress reporting, drop item signals, empty the engine
    fn detach(&mut self, session: &mut PlaybackSession) {
        EventRouter::pause(session, self.engine_mut());

        if let Some(engine) = self.engine.as_deref_mut() {
            self.subscriptions.release(engine, SignalScope::Progress);
            self.subscriptions.release(engine, SignalScope::Item);
            engine.replace_item(None);
        }
        session.reset_for_source(None);
    }
}

impl Drop for SourceLifecycle {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.as_deref_mut() {
            self.subscriptions.release_all(engine);
        }
    }
}
