//! Language/theme synchronization between the persisted store and the
//! translation engine.
//!
//! Both sides can change independently: the store when the user picks a
//! language, the engine when something switches its locale directly. The
//! bridge owns one subscription on each side and propagates with a single
//! guarded rule: a value is never written to a side that already holds it,
//! and a notification that merely echoes what the bridge itself just
//! propagated is dropped. A change therefore settles in at most one round
//! trip, whichever side starts it.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::domain::{
    AppError, LanguageCode, LanguageInfo, Listener, PersistedState, Presentation, Result,
    StatePatch, StateStore, Subscription, ThemeVariant, TranslationEngine,
};
use crate::infrastructure::ListenerSet;

/// Outcome of [`SyncBridge::change_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageChange {
    /// The requested language was already active.
    Unchanged(LanguageCode),
    Changed { from: LanguageCode, to: LanguageCode },
}

/// Mirrored values plus the last value propagated in each direction.
#[derive(Debug, Clone, Copy)]
struct SyncGuard {
    language: LanguageCode,
    theme: ThemeVariant,
    /// Pushed store -> engine, awaiting the engine's echo.
    to_engine: Option<LanguageCode>,
    /// Pushed engine -> store, awaiting the store's echo.
    to_store: Option<LanguageCode>,
}

impl SyncGuard {
    const fn new(initial: PersistedState) -> Self {
        Self {
            language: initial.language_code,
            theme: initial.theme_variant,
            to_engine: None,
            to_store: None,
        }
    }

    const fn presentation(&self) -> Presentation {
        Presentation {
            language: self.language,
            theme: self.theme,
        }
    }
}

struct BridgeInner {
    store: Arc<dyn StateStore>,
    engine: Arc<dyn TranslationEngine>,
    guard: Mutex<SyncGuard>,
    presentation: ListenerSet<Presentation>,
}

impl BridgeInner {
    /// Store -> engine.
    fn push_to_engine(&self, code: LanguageCode) {
        if self.engine.active_locale() == code.as_str() {
            tracing::trace!(language = %code, "Engine already on language");
            return;
        }

        // Recorded before the call: engines notify synchronously.
        self.guard.lock().to_engine = Some(code);
        tracing::debug!(language = %code, "Propagating language to translation engine");
        self.engine.set_locale(code.as_str());
    }

    fn on_store_changed(&self, state: &PersistedState) {
        let code = state.language_code;
        let (echo, previous, current) = {
            let mut guard = self.guard.lock();
            let echo = guard.to_store.take() == Some(code);
            let previous = guard.presentation();
            guard.language = code;
            guard.theme = state.theme_variant;
            (echo, previous, guard.presentation())
        };

        if echo {
            tracing::trace!(language = %code, "Store echoed engine-originated language");
        } else {
            self.push_to_engine(code);
        }

        if previous != current {
            self.presentation.notify(&current);
        }
    }

    /// Engine -> store.
    fn on_engine_changed(&self, locale: &str) {
        let Some(code) = LanguageCode::parse(locale) else {
            let fallback = LanguageCode::default();
            tracing::warn!(
                locale,
                fallback = %fallback,
                "Translation engine switched to an unsupported language, forcing fallback"
            );
            // Re-enters this handler with the fallback, which syncs the store.
            self.engine.set_locale(fallback.as_str());
            return;
        };

        if self.guard.lock().to_engine.take() == Some(code) {
            tracing::trace!(language = %code, "Engine echoed store-originated language");
            return;
        }

        let stored = match self.store.get() {
            Ok(state) => state.language_code,
            Err(e) => {
                tracing::warn!(error = %e, "State store unavailable, comparing against last known language");
                self.guard.lock().language
            }
        };
        if stored == code {
            return;
        }

        self.guard.lock().to_store = Some(code);
        tracing::debug!(language = %code, "Propagating language to state store");
        if let Err(e) = self.store.set(StatePatch::language(code)) {
            tracing::warn!(error = %e, "Could not persist language; continuing with in-memory value");
            self.guard.lock().to_store = None;
            self.adopt(|guard| guard.language = code);
        }
    }

    /// Update the mirror directly (store unavailable) and notify views.
    fn adopt(&self, update: impl FnOnce(&mut SyncGuard)) {
        let (previous, current) = {
            let mut guard = self.guard.lock();
            let previous = guard.presentation();
            update(&mut *guard);
            (previous, guard.presentation())
        };
        if previous != current {
            self.presentation.notify(&current);
        }
    }
}

/// Merged language/theme/translate surface consumed by views.
pub struct SyncBridge {
    inner: Arc<BridgeInner>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SyncBridge {
    /// Subscribe to both collaborators and align the engine with the store.
    ///
    /// If the store cannot be read, the engine's locale (or the default
    /// language) seeds the in-memory mirror.
    pub fn new(store: Arc<dyn StateStore>, engine: Arc<dyn TranslationEngine>) -> Self {
        let initial = store.get().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "State store unavailable at startup, using engine locale");
            PersistedState {
                language_code: LanguageCode::from_code_or_default(&engine.active_locale()),
                ..PersistedState::default()
            }
        });

        let inner = Arc::new(BridgeInner {
            store: Arc::clone(&store),
            engine: Arc::clone(&engine),
            guard: Mutex::new(SyncGuard::new(initial)),
            presentation: ListenerSet::new(),
        });

        let weak: Weak<BridgeInner> = Arc::downgrade(&inner);
        let store_sub = store.subscribe(Arc::new(move |state: &PersistedState| {
            if let Some(inner) = weak.upgrade() {
                inner.on_store_changed(state);
            }
        }));

        let weak: Weak<BridgeInner> = Arc::downgrade(&inner);
        let engine_sub = engine.on_locale_changed(Arc::new(move |locale: &String| {
            if let Some(inner) = weak.upgrade() {
                inner.on_engine_changed(locale);
            }
        }));

        inner.push_to_engine(initial.language_code);

        Self {
            inner,
            subscriptions: Mutex::new(vec![store_sub, engine_sub]),
        }
    }

    /// Switch language on both the store and the engine.
    ///
    /// # Errors
    /// Returns `UnsupportedLanguage` (and changes nothing) if `code` is not
    /// in the supported set.
    pub fn change_language(&self, code: &str) -> Result<LanguageChange> {
        let Some(target) = LanguageCode::parse(code) else {
            tracing::warn!(code, "Ignoring unsupported language");
            return Err(AppError::UnsupportedLanguage {
                code: code.to_string(),
            });
        };

        let from = self.current_language();
        if let Err(e) = self.inner.store.set(StatePatch::language(target)) {
            tracing::warn!(error = %e, "Could not persist language; continuing with in-memory value");
            self.inner.adopt(|guard| guard.language = target);
        }
        // Normally already done by the store notification; covers stores
        // that are unavailable.
        self.inner.push_to_engine(target);

        if from == target {
            Ok(LanguageChange::Unchanged(target))
        } else {
            tracing::info!(from = %from, to = %target, "Language changed");
            Ok(LanguageChange::Changed { from, to: target })
        }
    }

    /// Translate `key` in the current language, falling back to the
    /// default language and finally to the key itself.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        self.inner.engine.translate(key).unwrap_or_else(|| {
            let missing = AppError::MissingTranslationKey {
                key: key.to_string(),
            };
            tracing::debug!(%missing, "Rendering key literally");
            key.to_string()
        })
    }

    /// The store's language, or the last known one if the store is down.
    #[must_use]
    pub fn current_language(&self) -> LanguageCode {
        match self.inner.store.get() {
            Ok(state) => state.language_code,
            Err(e) => {
                tracing::debug!(error = %e, "Using last known language");
                self.inner.guard.lock().language
            }
        }
    }

    #[must_use]
    pub fn language_info(&self) -> LanguageInfo {
        self.current_language().info()
    }

    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.current_language().is_rtl()
    }

    /// The store's theme, or the last known one if the store is down.
    #[must_use]
    pub fn theme(&self) -> ThemeVariant {
        match self.inner.store.get() {
            Ok(state) => state.theme_variant,
            Err(e) => {
                tracing::debug!(error = %e, "Using last known theme");
                self.inner.guard.lock().theme
            }
        }
    }

    /// Persist a theme selection (best effort).
    pub fn set_theme(&self, theme: ThemeVariant) {
        if let Err(e) = self.inner.store.set(StatePatch::theme(theme)) {
            tracing::warn!(error = %e, "Could not persist theme; continuing with in-memory value");
            self.inner.adopt(|guard| guard.theme = theme);
        }
    }

    /// Switch to the other theme and return it.
    pub fn toggle_theme(&self) -> ThemeVariant {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    #[must_use]
    pub fn presentation(&self) -> Presentation {
        Presentation {
            language: self.current_language(),
            theme: self.theme(),
        }
    }

    /// Register a view for language/theme changes.
    pub fn on_presentation_changed(&self, listener: Listener<Presentation>) -> Subscription {
        self.inner.presentation.subscribe(listener)
    }

    /// Drop both collaborator subscriptions. Also happens on drop.
    pub fn close(&self) {
        self.subscriptions.lock().clear();
    }
}
