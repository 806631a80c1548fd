//! Domain layer - core types, state machine, and collaborator contracts.
//!
//! This layer contains pure domain models, the audio state machine, and
//! the port traits, without any concrete IO.

pub mod audio;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use audio::{AudioEffect, AudioEvent, AudioMachine, AudioState};
pub use config::{AppConfig, AudioConfig, LocaleConfig, PathConfig};
pub use error::{AppError, Result};
pub use models::{
    AppLifecycle, BookKeys, HighlightKeys, HomeContent, LanguageCode, LanguageInfo,
    PersistedState, Presentation, Slide, StatePatch, ThemeVariant, Track,
};
pub use ports::{AudioSession, LifecycleSignal, Listener, StateStore, Subscription, TranslationEngine};
