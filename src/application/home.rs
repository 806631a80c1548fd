//! Content home screen, resolved in the current language and theme.

use crate::domain::{HomeContent, LanguageCode, ThemeVariant};

use super::sync_bridge::SyncBridge;

/// A book line on the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub title: String,
    pub author: String,
}

/// A titled quote block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub title: String,
    pub content: String,
}

/// Home screen with every string translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub language: LanguageCode,
    pub theme: ThemeVariant,
    pub rtl: bool,
    pub greeting: String,
    pub title: String,
    pub categories_heading: String,
    pub categories: Vec<String>,
    pub books_heading: String,
    pub books: Vec<BookEntry>,
    pub highlights: Vec<Highlight>,
}

/// Resolve `content` through the bridge's translate surface.
#[must_use]
pub fn render_home(bridge: &SyncBridge, content: &HomeContent) -> HomeView {
    let presentation = bridge.presentation();
    let t = |key: &str| bridge.translate(key);

    HomeView {
        language: presentation.language,
        theme: presentation.theme,
        rtl: bridge.is_rtl(),
        greeting: t(content.greeting_key),
        title: t(content.title_key),
        categories_heading: t(content.categories_heading_key),
        categories: content.category_keys.iter().map(|key| t(key)).collect(),
        books_heading: t(content.books_heading_key),
        books: content
            .books
            .iter()
            .map(|book| BookEntry {
                title: t(book.title_key),
                author: t(book.author_key),
            })
            .collect(),
        highlights: content
            .highlights
            .iter()
            .map(|h| Highlight {
                title: t(h.title_key),
                content: t(h.content_key),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PersistedState, StatePatch, StateStore, TranslationEngine};
    use crate::infrastructure::{CatalogTranslator, MemoryStateStore};
    use std::sync::Arc;

    fn bridge(language: LanguageCode) -> (Arc<MemoryStateStore>, SyncBridge) {
        let store = Arc::new(MemoryStateStore::new(PersistedState {
            language_code: language,
            ..PersistedState::default()
        }));
        let engine = Arc::new(CatalogTranslator::builtin(LanguageCode::En).unwrap());
        let bridge = SyncBridge::new(store.clone(), engine);
        (store, bridge)
    }

    #[test]
    fn test_every_home_key_ships_in_every_language() {
        let home = HomeContent::standard();
        let engine = CatalogTranslator::builtin(LanguageCode::En).unwrap();
        for code in LanguageCode::ALL {
            engine.set_locale(code.as_str());
            for key in home.keys() {
                assert!(engine.translate(key).is_some(), "{key} missing for {code}");
            }
        }
    }

    #[test]
    fn test_render_in_english() {
        let (_, bridge) = bridge(LanguageCode::En);
        let view = render_home(&bridge, &HomeContent::standard());

        assert_eq!(view.greeting, "Namaste!");
        assert_eq!(view.categories.len(), 5);
        assert_eq!(view.categories[2], "Bhagabat");
        assert_eq!(
            view.books[0],
            BookEntry {
                title: "Bhagavad Gita".into(),
                author: "Ved Vyasa".into()
            }
        );
        assert_eq!(view.theme, ThemeVariant::Dark);
        assert!(!view.rtl);
    }

    #[test]
    fn test_render_follows_language_and_theme() {
        let (store, bridge) = bridge(LanguageCode::En);
        bridge.change_language("hi").unwrap();
        store.set(StatePatch::theme(ThemeVariant::Gradient)).unwrap();

        let view = render_home(&bridge, &HomeContent::standard());
        assert_eq!(view.language, LanguageCode::Hi);
        assert_eq!(view.theme, ThemeVariant::Gradient);
        assert_eq!(view.greeting, "नमस्ते!");
        assert_eq!(view.categories_heading, "श्रेणियाँ");
        // Not translated in hi; falls back to English.
        assert_eq!(
            view.highlights[1].content,
            "Words that have guided seekers for centuries."
        );
    }
}
