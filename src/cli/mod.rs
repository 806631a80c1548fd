//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Onboarding Core - drive the localized onboarding flow from the terminal.
#[derive(Parser, Debug)]
#[command(name = "onboarding-core")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Keep state in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Use this configuration file instead of the default one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show persisted state and the active locale.
    Status,

    /// List supported languages.
    Languages,

    /// Change the app language.
    Language {
        /// Language code: en, hi, or, bn.
        code: String,
    },

    /// Set the theme, or toggle it when no value is given.
    Theme {
        /// Theme variant: dark or gradient.
        variant: Option<String>,
    },

    /// Translate keys in the current language.
    Translate {
        /// Dotted translation keys, e.g. common.skip.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Walk through the onboarding carousel.
    Onboard {
        /// Skip straight to the end.
        #[arg(long)]
        skip: bool,

        /// Start with the music off.
        #[arg(long)]
        mute: bool,

        /// Make the simulated audio setup fail.
        #[arg(long)]
        fail_audio: bool,

        /// Send the app to the background when this slide is shown (1-based).
        #[arg(long)]
        background_at: Option<usize>,
    },

    /// Show the content home screen in the current language and theme.
    Home,

    /// Show configuration file path and effective values, optionally updating them.
    Config {
        /// Save a new default language: en, hi, or, bn.
        #[arg(long)]
        default_language: Option<String>,

        /// Save whether onboarding music starts on.
        #[arg(long, value_parser = ["on", "off"])]
        music: Option<String>,
    },
}
