//! Application configuration model.
//!
//! Every field has a default so a missing or partial config file still
//! yields a usable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::models::{LanguageCode, Track};

/// Locale settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Language used when nothing has been persisted yet.
    #[serde(default)]
    pub default: LanguageCode,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: LanguageCode::En,
        }
    }
}

/// Onboarding music settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Whether music starts on (initial intent).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_track_title")]
    pub track_title: String,

    #[serde(default = "default_track_url")]
    pub track_url: String,

    /// Artificial setup latency of the simulated backend.
    #[serde(default = "default_setup_delay_ms")]
    pub setup_delay_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            track_title: default_track_title(),
            track_url: default_track_url(),
            setup_delay_ms: default_setup_delay_ms(),
        }
    }
}

impl AudioConfig {
    /// The configured onboarding track.
    #[must_use]
    pub fn track(&self) -> Track {
        Track {
            id: "onboarding".to_string(),
            title: self.track_title.clone(),
            url: self.track_url.clone(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

fn default_track_title() -> String {
    "Onboarding Theme".to_string()
}

fn default_track_url() -> String {
    "asset://audio/onboarding.mp3".to_string()
}

const fn default_setup_delay_ms() -> u64 {
    150
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".onboarding-core")
    }

    /// Get the persisted state database path.
    #[must_use]
    pub fn state_db_path(&self) -> PathBuf {
        self.data_dir().join("state.db")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.locale.default, LanguageCode::En);
        assert!(config.audio.enabled);
        assert_eq!(config.audio.setup_delay_ms, 150);
        assert_eq!(config.audio.track().title, "Onboarding Theme");
    }

    #[test]
    fn test_custom_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/onboarding")),
            },
            ..AppConfig::default()
        };
        assert_eq!(config.state_db_path(), PathBuf::from("/tmp/onboarding/state.db"));
    }
}
