//! Onboarding carousel controller.
//!
//! Turns viewability reports into a slide index, decides what the primary
//! button does, commits the onboarding flag exactly once, and owns the
//! onboarding music for the lifetime of the screen.

use std::sync::Arc;

use crate::domain::{AppError, LanguageCode, Result, Slide, StatePatch, StateStore};

use super::audio_controller::AudioSessionController;
use super::sync_bridge::{LanguageChange, SyncBridge};

/// What the view should do after `advance`/`skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselAction {
    /// Scroll the list to this slide.
    ScrollTo(usize),
    /// Onboarding is over; leave the screen.
    Finished,
}

/// Callback fired when onboarding completes.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Controller behind the onboarding screen.
pub struct OnboardingCarouselController {
    slides: Vec<Slide>,
    index: usize,
    dropdown_open: bool,
    music_on: bool,
    finished: bool,
    store: Arc<dyn StateStore>,
    bridge: Arc<SyncBridge>,
    on_complete: Option<CompletionCallback>,
    audio: Option<AudioSessionController>,
}

impl OnboardingCarouselController {
    /// Create a controller positioned on the first slide.
    ///
    /// # Errors
    /// Returns error if `slides` is empty.
    pub fn new(
        slides: Vec<Slide>,
        store: Arc<dyn StateStore>,
        bridge: Arc<SyncBridge>,
        on_complete: CompletionCallback,
    ) -> Result<Self> {
        if slides.is_empty() {
            return Err(AppError::Config {
                message: "Onboarding needs at least one slide".into(),
            });
        }

        Ok(Self {
            slides,
            index: 0,
            dropdown_open: false,
            music_on: false,
            finished: false,
            store,
            bridge,
            on_complete: Some(on_complete),
            audio: None,
        })
    }

    /// Attach the onboarding music; the controller disposes it on unmount.
    #[must_use]
    pub fn with_audio(mut self, audio: AudioSessionController) -> Self {
        self.music_on = audio.intent();
        self.audio = Some(audio);
        self
    }

    /// Viewability callback from the list. Out-of-range reports are dropped.
    pub fn on_viewability_changed(&mut self, visible_index: usize) {
        if visible_index < self.slides.len() {
            self.index = visible_index;
        } else {
            tracing::debug!(
                visible_index,
                slides = self.slides.len(),
                "Ignoring out-of-range viewability report"
            );
        }
    }

    /// Primary button: next slide, or finish on the last one.
    pub fn advance(&mut self) -> CarouselAction {
        if self.is_last_slide() {
            self.finish()
        } else {
            CarouselAction::ScrollTo(self.index + 1)
        }
    }

    /// Skip the rest of onboarding.
    pub fn skip(&mut self) -> CarouselAction {
        self.finish()
    }

    /// Mark onboarding complete and notify the caller, both at most once.
    pub fn finish(&mut self) -> CarouselAction {
        let already_persisted = match self.store.get() {
            Ok(state) => state.onboarding_complete,
            Err(e) => {
                tracing::warn!(error = %e, "State store unavailable, relying on local flag");
                self.finished
            }
        };

        if !already_persisted {
            match self.store.set(StatePatch::onboarding_complete()) {
                Ok(()) => tracing::info!("Onboarding completed"),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not persist onboarding completion");
                }
            }
        }
        self.finished = true;

        if let Some(callback) = self.on_complete.take() {
            callback();
        }

        CarouselAction::Finished
    }

    /// Whether onboarding is done, in this session or a previous one.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finished
            || self
                .store
                .get()
                .is_ok_and(|state| state.onboarding_complete)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.index]
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn is_last_slide(&self) -> bool {
        self.index + 1 == self.slides.len()
    }

    /// Translation key for the primary button label.
    #[must_use]
    pub fn primary_action_key(&self) -> &'static str {
        if self.is_last_slide() {
            "common.getStarted"
        } else {
            "common.next"
        }
    }

    pub fn open_dropdown(&mut self) {
        self.dropdown_open = true;
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    #[must_use]
    pub const fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    /// Pick a language from the dropdown.
    ///
    /// # Errors
    /// Returns `UnsupportedLanguage` if `code` is not supported; the
    /// dropdown is closed either way.
    pub fn select_language(&mut self, code: &str) -> Result<LanguageChange> {
        self.close_dropdown();

        let current = self.bridge.current_language();
        if LanguageCode::parse(code) == Some(current) {
            return Ok(LanguageChange::Unchanged(current));
        }
        self.bridge.change_language(code)
    }

    /// Flip the music button. Without an attached session only the flag moves.
    pub fn toggle_music(&mut self) -> bool {
        self.music_on = !self.music_on;
        if let Some(audio) = &self.audio {
            audio.toggle(self.music_on);
        }
        self.music_on
    }

    #[must_use]
    pub const fn music_on(&self) -> bool {
        self.music_on
    }

    #[must_use]
    pub const fn audio(&self) -> Option<&AudioSessionController> {
        self.audio.as_ref()
    }

    /// Screen teardown: releases the audio session.
    pub async fn unmount(mut self) {
        if let Some(audio) = self.audio.take() {
            let state = audio.unmount().await;
            tracing::debug!(%state, "Onboarding audio released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioState, PersistedState, Track, TranslationEngine};
    use crate::infrastructure::{CatalogTranslator, MemoryStateStore, SimulatedAudioSession};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStateStore>,
        bridge: Arc<SyncBridge>,
        completions: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStateStore::new(PersistedState::default()));
            let engine = Arc::new(CatalogTranslator::builtin(LanguageCode::En).unwrap());
            let bridge = Arc::new(SyncBridge::new(store.clone(), engine));
            Self {
                store,
                bridge,
                completions: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn controller(&self, slides: usize) -> OnboardingCarouselController {
            let counter = Arc::clone(&self.completions);
            OnboardingCarouselController::new(
                (1..=slides).map(Slide::numbered).collect(),
                self.store.clone(),
                Arc::clone(&self.bridge),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap()
        }

        fn completions(&self) -> usize {
            self.completions.load(Ordering::SeqCst)
        }
    }

    /// Store double counting onboarding writes.
    struct CountingStore {
        inner: MemoryStateStore,
        writes: AtomicUsize,
    }

    impl StateStore for CountingStore {
        fn get(&self) -> Result<PersistedState> {
            self.inner.get()
        }

        fn set(&self, patch: StatePatch) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(patch)
        }

        fn subscribe(
            &self,
            listener: crate::domain::Listener<PersistedState>,
        ) -> crate::domain::Subscription {
            self.inner.subscribe(listener)
        }
    }

    #[test]
    fn test_rejects_empty_deck() {
        let fx = Fixture::new();
        let result = OnboardingCarouselController::new(
            Vec::new(),
            fx.store.clone(),
            Arc::clone(&fx.bridge),
            Box::new(|| {}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_viewability_stays_in_bounds() {
        let fx = Fixture::new();
        let mut carousel = fx.controller(3);

        for reported in [0, 2, 3, 1, 7, usize::MAX] {
            let before = carousel.current_index();
            carousel.on_viewability_changed(reported);
            assert!(carousel.current_index() < carousel.slide_count());
            if reported >= carousel.slide_count() {
                assert_eq!(carousel.current_index(), before);
            } else {
                assert_eq!(carousel.current_index(), reported);
            }
        }
    }

    #[test]
    fn test_advance_walks_then_finishes() {
        let fx = Fixture::new();
        let mut carousel = fx.controller(3);

        assert_eq!(carousel.primary_action_key(), "common.next");
        assert_eq!(carousel.advance(), CarouselAction::ScrollTo(1));
        // Index only moves once the list reports it.
        assert_eq!(carousel.current_index(), 0);
        carousel.on_viewability_changed(1);
        assert_eq!(carousel.advance(), CarouselAction::ScrollTo(2));
        carousel.on_viewability_changed(2);

        assert_eq!(carousel.primary_action_key(), "common.getStarted");
        assert_eq!(carousel.current_slide().title_key, "onboarding.slide3.title");
        assert_eq!(carousel.advance(), CarouselAction::Finished);
        assert!(carousel.is_complete());
        assert_eq!(fx.completions(), 1);
    }

    #[test]
    fn test_finish_writes_and_fires_once() {
        let store = Arc::new(CountingStore {
            inner: MemoryStateStore::default(),
            writes: AtomicUsize::new(0),
        });
        let engine = Arc::new(CatalogTranslator::builtin(LanguageCode::En).unwrap());
        let bridge = Arc::new(SyncBridge::new(store.clone(), engine));
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut carousel = OnboardingCarouselController::new(
            Slide::default_deck(),
            store.clone(),
            bridge,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        for _ in 0..5 {
            assert_eq!(carousel.finish(), CarouselAction::Finished);
        }
        carousel.skip();

        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(store.get().unwrap().onboarding_complete);
    }

    #[test]
    fn test_finish_with_unavailable_store_still_completes() {
        let fx = Fixture::new();
        let mut carousel = fx.controller(2);
        fx.store.set_available(false);

        assert_eq!(carousel.skip(), CarouselAction::Finished);
        assert!(carousel.is_complete());
        assert_eq!(fx.completions(), 1);
    }

    #[test]
    fn test_dropdown_selection() {
        let fx = Fixture::new();
        let mut carousel = fx.controller(3);

        carousel.open_dropdown();
        assert!(carousel.is_dropdown_open());
        assert_eq!(
            carousel.select_language("en").unwrap(),
            LanguageChange::Unchanged(LanguageCode::En)
        );
        assert!(!carousel.is_dropdown_open());

        carousel.toggle_dropdown();
        assert!(carousel.select_language("xx").is_err());
        assert!(!carousel.is_dropdown_open());
        assert_eq!(fx.bridge.current_language(), LanguageCode::En);
    }

    #[test]
    fn test_select_language_then_skip_scenario() {
        let fx = Fixture::new();
        let mut carousel = fx.controller(3);

        carousel.open_dropdown();
        carousel.select_language("hi").unwrap();

        let state = fx.store.get().unwrap();
        assert_eq!(state.language_code, LanguageCode::Hi);
        assert!(!state.onboarding_complete);
        assert_eq!(fx.bridge.translate("common.skip"), "छोड़ें");

        carousel.skip();
        assert!(fx.store.get().unwrap().onboarding_complete);
        assert_eq!(fx.completions(), 1);

        carousel.skip();
        assert!(fx.store.get().unwrap().onboarding_complete);
        assert_eq!(fx.completions(), 1);
    }

    #[test]
    fn test_engine_follows_selected_language() {
        let fx = Fixture::new();
        let engine = Arc::new(CatalogTranslator::builtin(LanguageCode::En).unwrap());
        let bridge = Arc::new(SyncBridge::new(fx.store.clone(), engine.clone()));
        let mut carousel = OnboardingCarouselController::new(
            Slide::default_deck(),
            fx.store.clone(),
            bridge,
            Box::new(|| {}),
        )
        .unwrap();

        carousel.select_language("bn").unwrap();
        assert_eq!(engine.active_locale(), "bn");
    }

    #[tokio::test]
    async fn test_music_toggle_and_unmount_dispose_audio() {
        let fx = Fixture::new();
        let session = Arc::new(SimulatedAudioSession::new(Duration::ZERO));
        let track = Track {
            id: "theme".into(),
            title: "Theme".into(),
            url: "asset://theme".into(),
        };
        let audio = AudioSessionController::mount(session.clone(), track, true).unwrap();
        let mut carousel = fx.controller(3).with_audio(audio);
        assert!(carousel.music_on());

        let mut changes = carousel.audio().unwrap().state_changes();
        changes
            .wait_for(|s| s.state == AudioState::Playing)
            .await
            .unwrap();
        drop(changes);

        assert!(!carousel.toggle_music());
        let mut changes = carousel.audio().unwrap().state_changes();
        changes
            .wait_for(|s| s.state == AudioState::Paused)
            .await
            .unwrap();
        drop(changes);

        carousel.unmount().await;
        assert!(session.is_disposed());
        assert_eq!(session.dispose_calls(), 1);
    }
}
