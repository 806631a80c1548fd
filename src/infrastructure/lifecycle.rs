//! Lifecycle signal driven by the caller.

use parking_lot::Mutex;

use crate::domain::{AppLifecycle, LifecycleSignal, Listener, Subscription};

use super::listeners::ListenerSet;

/// [`LifecycleSignal`] whose transitions are pushed with [`ManualLifecycle::emit`].
///
/// Repeated emissions of the current phase are dropped, matching how
/// platforms only report actual transitions.
pub struct ManualLifecycle {
    current: Mutex<AppLifecycle>,
    listeners: ListenerSet<AppLifecycle>,
}

impl ManualLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(AppLifecycle::Foreground),
            listeners: ListenerSet::new(),
        }
    }

    #[must_use]
    pub fn current(&self) -> AppLifecycle {
        *self.current.lock()
    }

    /// Report a transition.
    pub fn emit(&self, phase: AppLifecycle) {
        {
            let mut current = self.current.lock();
            if *current == phase {
                return;
            }
            *current = phase;
        }
        tracing::debug!(?phase, "App lifecycle transition");
        self.listeners.notify(&phase);
    }
}

impl Default for ManualLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSignal for ManualLifecycle {
    fn on_change(&self, listener: Listener<AppLifecycle>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_only_transitions_are_reported() {
        let lifecycle = ManualLifecycle::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = lifecycle.on_change(Arc::new(move |phase: &AppLifecycle| {
            sink.lock().push(*phase);
        }));

        lifecycle.emit(AppLifecycle::Foreground);
        lifecycle.emit(AppLifecycle::Background);
        lifecycle.emit(AppLifecycle::Background);
        lifecycle.emit(AppLifecycle::Foreground);

        assert_eq!(
            *seen.lock(),
            vec![AppLifecycle::Background, AppLifecycle::Foreground]
        );

        sub.unsubscribe();
        lifecycle.emit(AppLifecycle::Background);
        assert_eq!(seen.lock().len(), 2);
    }
}
