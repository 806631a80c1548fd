//! Domain models for the onboarding front-end.
//!
//! These models represent the persisted application state and the
//! static descriptions (languages, slides, tracks) the controllers work with.

use serde::{Deserialize, Serialize};

use super::error::AppError;

/// Languages that have RTL scripts; none of the shipped set is among them.
const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa"];

/// Supported language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    /// English (also the fallback locale).
    #[default]
    En,
    /// Hindi.
    Hi,
    /// Odia.
    Or,
    /// Bengali.
    Bn,
}

impl LanguageCode {
    /// All supported languages, in display order.
    pub const ALL: [Self; 4] = [Self::En, Self::Hi, Self::Or, Self::Bn];

    /// Parse a code, returning `None` for anything outside the supported set.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "or" => Some(Self::Or),
            "bn" => Some(Self::Bn),
            _ => None,
        }
    }

    /// Parse a code, mapping unsupported input to the default language.
    #[must_use]
    pub fn from_code_or_default(code: &str) -> Self {
        Self::parse(code).unwrap_or_default()
    }

    /// The wire code (`"en"`, `"hi"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Or => "or",
            Self::Bn => "bn",
        }
    }

    /// Whether this language is written right-to-left.
    #[must_use]
    pub fn is_rtl(self) -> bool {
        RTL_LANGUAGES.contains(&self.as_str())
    }

    /// Display metadata for this language.
    #[must_use]
    pub const fn info(self) -> LanguageInfo {
        match self {
            Self::En => LanguageInfo {
                code: self,
                name: "English",
                native_name: "English",
                icon: "🇬🇧",
                country_code: "En",
            },
            Self::Hi => LanguageInfo {
                code: self,
                name: "Hindi",
                native_name: "हिंदी",
                icon: "🇮🇳",
                country_code: "Hi",
            },
            Self::Or => LanguageInfo {
                code: self,
                name: "Odia",
                native_name: "ଓଡ଼ିଆ",
                icon: "🇮🇳",
                country_code: "Od",
            },
            Self::Bn => LanguageInfo {
                code: self,
                name: "Bengali",
                native_name: "বাংলা",
                icon: "🇧🇩",
                country_code: "Bn",
            },
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AppError::UnsupportedLanguage { code: s.to_string() })
    }
}

/// Display metadata for a supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: LanguageCode,
    /// English name.
    pub name: &'static str,
    /// Name in the language itself.
    pub native_name: &'static str,
    /// Flag emoji.
    pub icon: &'static str,
    /// Short label shown in the dropdown button.
    pub country_code: &'static str,
}

impl LanguageInfo {
    /// Pick the native or English name.
    #[must_use]
    pub const fn display_name(&self, native: bool) -> &'static str {
        if native {
            self.native_name
        } else {
            self.name
        }
    }
}

/// Visual style selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Gradient,
}

impl ThemeVariant {
    /// The persisted name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Gradient => "gradient",
        }
    }

    /// The other variant.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Gradient,
            Self::Gradient => Self::Dark,
        }
    }
}

impl std::fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeVariant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "gradient" => Ok(Self::Gradient),
            _ => Err(AppError::UnsupportedTheme { name: s.to_string() }),
        }
    }
}

/// The state owned by the persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub language_code: LanguageCode,
    pub theme_variant: ThemeVariant,
    pub onboarding_complete: bool,
}

impl PersistedState {
    /// Apply a partial write.
    ///
    /// The onboarding flag is monotonic: a patch can raise it, never lower it.
    #[must_use]
    pub fn apply(mut self, patch: StatePatch) -> Self {
        if let Some(code) = patch.language_code {
            self.language_code = code;
        }
        if let Some(theme) = patch.theme_variant {
            self.theme_variant = theme;
        }
        if let Some(done) = patch.onboarding_complete {
            self.onboarding_complete |= done;
        }
        self
    }
}

/// Partial update for [`PersistedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatePatch {
    pub language_code: Option<LanguageCode>,
    pub theme_variant: Option<ThemeVariant>,
    pub onboarding_complete: Option<bool>,
}

impl StatePatch {
    /// Patch that only sets the language.
    #[must_use]
    pub const fn language(code: LanguageCode) -> Self {
        Self {
            language_code: Some(code),
            theme_variant: None,
            onboarding_complete: None,
        }
    }

    /// Patch that only sets the theme.
    #[must_use]
    pub const fn theme(theme: ThemeVariant) -> Self {
        Self {
            language_code: None,
            theme_variant: Some(theme),
            onboarding_complete: None,
        }
    }

    /// Patch that marks onboarding complete.
    #[must_use]
    pub const fn onboarding_complete() -> Self {
        Self {
            language_code: None,
            theme_variant: None,
            onboarding_complete: Some(true),
        }
    }
}

/// What views render from: the merged language/theme surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub language: LanguageCode,
    pub theme: ThemeVariant,
}

/// App foreground/background transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycle {
    Foreground,
    Background,
}

/// One onboarding slide, described by translation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub id: String,
    pub title_key: String,
    pub description_key: String,
}

impl Slide {
    /// Slide whose keys follow `onboarding.slide{n}.title|description`.
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        Self {
            id: n.to_string(),
            title_key: format!("onboarding.slide{n}.title"),
            description_key: format!("onboarding.slide{n}.description"),
        }
    }

    /// The three slides shipped with the app.
    #[must_use]
    pub fn default_deck() -> Vec<Self> {
        (1..=3).map(Self::numbered).collect()
    }
}

/// A book listed on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookKeys {
    pub title_key: &'static str,
    pub author_key: &'static str,
}

/// A titled quote block on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightKeys {
    pub title_key: &'static str,
    pub content_key: &'static str,
}

/// Translation keys that make up the content home screen, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeContent {
    pub greeting_key: &'static str,
    pub title_key: &'static str,
    pub categories_heading_key: &'static str,
    pub category_keys: Vec<&'static str>,
    pub books_heading_key: &'static str,
    pub books: Vec<BookKeys>,
    pub highlights: Vec<HighlightKeys>,
}

impl HomeContent {
    /// The home screen shipped with the app.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            greeting_key: "home.greeting",
            title_key: "home.title",
            categories_heading_key: "home.categories",
            category_keys: vec![
                "categories.shlokas",
                "categories.vedas",
                "categories.bhagbat",
                "categories.stories",
                "categories.mantras",
            ],
            books_heading_key: "home.books",
            books: vec![
                BookKeys {
                    title_key: "books.book1.title",
                    author_key: "books.book1.author",
                },
                BookKeys {
                    title_key: "books.book2.title",
                    author_key: "books.book2.author",
                },
                BookKeys {
                    title_key: "books.book3.title",
                    author_key: "books.book3.author",
                },
            ],
            highlights: vec![
                HighlightKeys {
                    title_key: "carousel.item1.title1",
                    content_key: "carousel.item1.content",
                },
                HighlightKeys {
                    title_key: "carousel.item2.title1",
                    content_key: "carousel.item2.content",
                },
            ],
        }
    }

    /// Every key the screen renders.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = vec![
            self.greeting_key,
            self.title_key,
            self.categories_heading_key,
        ];
        keys.extend(&self.category_keys);
        keys.push(self.books_heading_key);
        keys.extend(self.books.iter().flat_map(|b| [b.title_key, b.author_key]));
        keys.extend(
            self.highlights
                .iter()
                .flat_map(|h| [h.title_key, h.content_key]),
        );
        keys
    }
}

/// Background music track handed to the audio session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(LanguageCode::parse("hi"), Some(LanguageCode::Hi));
        assert_eq!(LanguageCode::parse(" BN "), Some(LanguageCode::Bn));
        assert_eq!(LanguageCode::parse("fr"), None);
        assert_eq!(LanguageCode::from_code_or_default("fr"), LanguageCode::En);
    }

    #[test]
    fn test_language_info() {
        let info = LanguageCode::Or.info();
        assert_eq!(info.country_code, "Od");
        assert_eq!(info.display_name(false), "Odia");
        assert!(!LanguageCode::ALL.iter().any(|c| c.is_rtl()));
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("Gradient".parse::<ThemeVariant>().unwrap(), ThemeVariant::Gradient);
        assert!("neon".parse::<ThemeVariant>().is_err());
        assert_eq!(ThemeVariant::Dark.toggled(), ThemeVariant::Gradient);
    }

    #[test]
    fn test_onboarding_flag_is_monotonic() {
        let done = PersistedState::default().apply(StatePatch::onboarding_complete());
        assert!(done.onboarding_complete);

        let patch = StatePatch {
            onboarding_complete: Some(false),
            ..StatePatch::default()
        };
        assert!(done.apply(patch).onboarding_complete);
    }

    #[test]
    fn test_persisted_state_json_shape() {
        let state = PersistedState {
            language_code: LanguageCode::Hi,
            theme_variant: ThemeVariant::Gradient,
            onboarding_complete: true,
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["languageCode"], "hi");
        assert_eq!(json["themeVariant"], "gradient");
    }

    #[test]
    fn test_default_deck() {
        let deck = Slide::default_deck();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck[2].title_key, "onboarding.slide3.title");
    }

    #[test]
    fn test_home_content_keys_are_unique() {
        let home = HomeContent::standard();
        let keys = home.keys();
        assert_eq!(keys.len(), 3 + 5 + 1 + 6 + 4);
        assert_eq!(keys[0], "home.greeting");

        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
