//! Collaborator contracts.
//!
//! The core never talks to a concrete store, translation engine, audio
//! backend, or OS lifecycle source. Implementations live in the
//! infrastructure layer (or in tests).

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Result;
use super::models::{AppLifecycle, PersistedState, StatePatch, Track};

/// Callback registered with a collaborator.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by `subscribe`-style calls.
///
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap an unsubscribe action.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Persisted application state.
///
/// `set` must commit before notifying, and listeners receive the committed
/// state. Implementations must not hold internal locks while notifying.
pub trait StateStore: Send + Sync {
    /// Read the current state.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read.
    fn get(&self) -> Result<PersistedState>;

    /// Apply a partial write and notify subscribers.
    ///
    /// # Errors
    /// Returns error if the write could not be committed.
    fn set(&self, patch: StatePatch) -> Result<()>;

    /// Register for post-commit notifications.
    fn subscribe(&self, listener: Listener<PersistedState>) -> Subscription;
}

/// Localization engine with a single active locale.
///
/// The active locale is a raw code: the engine may be told to use a code it
/// has no bundle for, in which case lookups use its fallback locale.
pub trait TranslationEngine: Send + Sync {
    /// Look up a key in the active locale, then the fallback locale.
    fn translate(&self, key: &str) -> Option<String>;

    /// Currently active locale code.
    fn active_locale(&self) -> String;

    /// Switch locale; notifies listeners if the code changed.
    fn set_locale(&self, code: &str);

    /// Register for locale-changed notifications.
    fn on_locale_changed(&self, listener: Listener<String>) -> Subscription;
}

/// Platform audio player.
#[async_trait]
pub trait AudioSession: Send + Sync {
    /// Prepare the player. May fail.
    async fn setup(&self) -> anyhow::Result<()>;

    /// Add a track to the queue.
    fn enqueue(&self, track: Track);

    async fn play(&self) -> anyhow::Result<()>;

    async fn pause(&self) -> anyhow::Result<()>;

    /// Release the player. Must be safe to call more than once.
    fn dispose(&self);
}

/// OS foreground/background transitions.
pub trait LifecycleSignal: Send + Sync {
    fn on_change(&self, listener: Listener<AppLifecycle>) -> Subscription;
}
