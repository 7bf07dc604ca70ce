//! Media engine interface
//!
//! The engine does the real work (fetch, decode, output). The player only
//! issues commands through [`MediaEngine`] and receives
//! [`crate::EngineSignal`]s back through `Player::handle_signal`, on the same
//! serialized context.

use crate::error::Result;
use crate::events::SignalScope;
use crate::seek::SeekToken;
use std::time::Duration;
use url::Url;

/// Handle for a live subscription or periodic observer on an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Where a resolved source lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `file://` URL, opened as a local asset
    Local,

    /// Streamed over the network
    Remote,
}

/// A resolved source ready to hand to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub url: Url,
    pub kind: SourceKind,
}

impl MediaItem {
    pub fn new(url: Url) -> Self {
        let kind = if url.scheme() == "file" {
            SourceKind::Local
        } else {
            SourceKind::Remote
        };
        Self { url, kind }
    }
}

/// Commands and queries the player needs from the engine
#[cfg_attr(test, mockall::automock)]
pub trait MediaEngine {
    /// Start rendering at `rate`
    fn play(&mut self, rate: f32);

    fn pause(&mut self);

    /// Change the rate without otherwise touching playback; `0.0` halts
    fn set_rate(&mut self, rate: f32);

    /// Rate the engine is currently running at
    fn rate(&self) -> f32;

    /// Start an asynchronous seek
    ///
    /// Completion must be delivered later as
    /// `EngineSignal::SeekCompleted { token, .. }`.
    fn seek(&mut self, to: Duration, token: SeekToken);

    /// Swap the active item; `None` empties the engine
    fn replace_item(&mut self, item: Option<MediaItem>);

    fn has_item(&self) -> bool;

    /// Playhead of the active item, `None` while the item isn't ready
    fn current_position(&self) -> Option<Duration>;

    /// Item duration, `None` until known
    fn duration(&self) -> Option<Duration>;

    /// The engine holds playback back by itself until enough is buffered
    fn waits_to_minimize_stalling(&self) -> bool {
        false
    }

    /// Start delivering signals of `scope`
    fn subscribe(&mut self, scope: SignalScope) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Start delivering `PeriodicTick` every `interval`
    fn add_periodic_observer(&mut self, interval: Duration) -> SubscriptionId;

    fn remove_periodic_observer(&mut self, id: SubscriptionId);
}

/// Builds the engine when the first source is set
pub trait EngineFactory {
    fn create(&mut self, item: MediaItem) -> Result<Box<dyn MediaEngine>>;
}

impl<F> EngineFactory for F
where
    F: FnMut(MediaItem) -> Result<Box<dyn MediaEngine>>,
{
    fn create(&mut self, item: MediaItem) -> Result<Box<dyn MediaEngine>> {
        self(item)
    }
}

/// Playhead, zero while unknown
pub(crate) fn playhead(engine: &dyn MediaEngine) -> Duration {
    engine.current_position().unwrap_or(Duration::ZERO)
}

/// Whether the playhead has actually reached the known duration
pub(crate) fn reached_end(engine: &dyn MediaEngine) -> bool {
    match (engine.current_position(), engine.duration()) {
        (Some(position), Some(duration)) => position >= duration,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_follows_scheme() {
        let local = MediaItem::new(Url::parse("file:///music/a.mp3").unwrap());
        assert_eq!(local.kind, SourceKind::Local);

        let remote = MediaItem::new(Url::parse("https://example.com/a.mp3").unwrap());
        assert_eq!(remote.kind, SourceKind::Remote);
    }

    #[test]
    fn reached_end_needs_known_duration() {
        let mut engine = MockMediaEngine::new();
        engine
            .expect_current_position()
            .return_const(Some(Duration::from_secs(100)));
        engine.expect_duration().return_const(None::<Duration>);

        assert!(!reached_end(&engine));
        assert_eq!(playhead(&engine), Duration::from_secs(100));
    }

    #[test]
    fn reached_end_compares_position_to_duration() {
        let mut engine = MockMediaEngine::new();
        engine
            .expect_current_position()
            .return_const(Some(Duration::from_secs(180)));
        engine
            .expect_duration()
            .return_const(Some(Duration::from_secs(180)));

        assert!(reached_end(&engine));
    }

    #[test]
    fn playhead_defaults_to_zero() {
        let mut engine = MockMediaEngine::new();
        engine.expect_current_position().return_const(None::<Duration>);

        assert_eq!(playhead(&engine), Duration::ZERO);
    }
}
