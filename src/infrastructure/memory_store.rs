//! In-memory state store.
//!
//! Used for `--ephemeral` runs and as the store double in tests. It can be
//! switched unavailable to exercise the degraded paths.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::domain::{
    AppError, Listener, PersistedState, Result, StatePatch, StateStore, Subscription,
};

use super::listeners::ListenerSet;

/// Non-persistent [`StateStore`].
pub struct MemoryStateStore {
    state: Mutex<PersistedState>,
    available: AtomicBool,
    listeners: ListenerSet<PersistedState>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new(initial: PersistedState) -> Self {
        Self {
            state: Mutex::new(initial),
            available: AtomicBool::new(true),
            listeners: ListenerSet::new(),
        }
    }

    /// Simulate the backing storage going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable("in-memory store switched off"))
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new(PersistedState::default())
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self) -> Result<PersistedState> {
        self.check_available()?;
        Ok(*self.state.lock())
    }

    fn set(&self, patch: StatePatch) -> Result<()> {
        self.check_available()?;
        let committed = {
            let mut state = self.state.lock();
            *state = state.apply(patch);
            *state
        };
        self.listeners.notify(&committed);
        Ok(())
    }

    fn subscribe(&self, listener: Listener<PersistedState>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LanguageCode, ThemeVariant};
    use std::sync::Arc;

    #[test]
    fn test_set_notifies_committed_state() {
        let store = Arc::new(MemoryStateStore::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&store);
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(Arc::new(move |state: &PersistedState| {
            // The write is visible to listeners through `get` as well.
            assert_eq!(reader.get().unwrap(), *state);
            sink.lock().push(state.language_code);
        }));

        store.set(StatePatch::language(LanguageCode::Bn)).unwrap();
        store.set(StatePatch::theme(ThemeVariant::Gradient)).unwrap();

        assert_eq!(*seen.lock(), vec![LanguageCode::Bn, LanguageCode::Bn]);
        assert_eq!(store.get().unwrap().theme_variant, ThemeVariant::Gradient);
    }

    #[test]
    fn test_unavailable_store_errors() {
        let store = MemoryStateStore::default();
        store.set_available(false);
        assert!(matches!(store.get(), Err(AppError::StoreUnavailable { .. })));
        assert!(store.set(StatePatch::onboarding_complete()).is_err());

        store.set_available(true);
        assert!(!store.get().unwrap().onboarding_complete);
    }
}
