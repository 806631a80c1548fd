//! Application layer - controllers and presentation.
//!
//! This layer wires the domain ports together: language sync, the
//! onboarding music session, the carousel screen, and the home screen.

pub mod audio_controller;
pub mod carousel;
pub mod formatter;
pub mod home;
pub mod sync_bridge;

pub use audio_controller::{AudioSessionController, AudioSnapshot};
pub use carousel::{CarouselAction, CompletionCallback, OnboardingCarouselController};
pub use formatter::{
    format_config, format_home, format_languages_table, format_state, format_translations,
};
pub use home::{render_home, BookEntry, Highlight, HomeView};
pub use sync_bridge::{LanguageChange, SyncBridge};
