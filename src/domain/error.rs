//! Domain-level error types for onboarding-core.
//!
//! All errors are typed with `thiserror`. None of them is fatal: callers
//! either get an `Err` back (unsupported input) or the component logs and
//! degrades.

use thiserror::Error;

/// Boxed error source for collaborator failures.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested language code is not in the supported set.
    #[error("Unsupported language: {code}")]
    UnsupportedLanguage { code: String },

    /// Requested theme name is not a declared variant.
    #[error("Unsupported theme: {name}")]
    UnsupportedTheme { name: String },

    /// Audio session setup (or playback) failed.
    #[error("Audio setup failed: {message}")]
    AudioSetup {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// No translation for a key in the active or fallback locale.
    #[error("Missing translation key: {key}")]
    MissingTranslationKey { key: String },

    /// The persisted state store could not be reached.
    #[error("State store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Failed to open or query the database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Invalid or corrupted data.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Wrap an audio backend failure.
    pub fn audio_setup(err: anyhow::Error) -> Self {
        Self::AudioSetup {
            message: format!("{err:#}"),
            source: Some(err.into()),
        }
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
