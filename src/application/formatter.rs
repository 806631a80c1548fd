//! Output formatting for the CLI.
//!
//! Tables use `comfy_table`, summaries use `colored`.

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{AppConfig, LanguageCode, LanguageInfo, PersistedState, ThemeVariant};

use super::home::HomeView;

/// Formats the persisted state next to the engine's active locale.
pub fn format_state(
    state: &PersistedState,
    language: &LanguageInfo,
    rtl: bool,
    active_locale: &str,
    updated_at: Option<DateTime<Utc>>,
) -> String {
    let onboarding = if state.onboarding_complete {
        "complete".green()
    } else {
        "pending".yellow()
    };
    let direction = if rtl { "right-to-left" } else { "left-to-right" };
    let updated = updated_at.map_or_else(
        || "-".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    format!(
        "{}\n  Language: {} {} ({}, {})\n  Engine locale: {}\n  Theme: {}\n  Onboarding: {}\n  Updated: {}",
        "📋 Onboarding State".bold(),
        language.icon,
        language.display_name(true).cyan(),
        language.code,
        direction,
        active_locale.cyan(),
        state.theme_variant.to_string().blue(),
        onboarding,
        updated.dimmed()
    )
}

/// Formats the supported languages, marking the current one and whether the
/// catalog ships a bundle for it.
pub fn format_languages_table(current: LanguageCode, bundled: &[&str]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["", "Code", "Language", "Native", "Region", "RTL", "Bundle"]);

    for code in LanguageCode::ALL {
        let info = code.info();
        let marker = if code == current { "●" } else { "" };
        let rtl = if code.is_rtl() { "yes" } else { "no" };
        let bundle = if bundled.contains(&code.as_str()) {
            "yes"
        } else {
            "fallback"
        };

        table.add_row(vec![
            marker,
            code.as_str(),
            info.name,
            info.native_name,
            info.country_code,
            rtl,
            bundle,
        ]);
    }

    table.to_string()
}

/// Formats the content home screen in its theme's colors.
pub fn format_home(view: &HomeView) -> String {
    let accent = |s: &str| match view.theme {
        ThemeVariant::Dark => s.bright_white().bold(),
        ThemeVariant::Gradient => s.bright_yellow().bold(),
    };
    let chip = |s: &str| match view.theme {
        ThemeVariant::Dark => s.cyan(),
        ThemeVariant::Gradient => s.magenta(),
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", accent(&view.greeting)));
    out.push_str(&format!("{}\n\n", view.title.bold()));

    out.push_str(&format!("{}\n", accent(&view.categories_heading)));
    let chips: Vec<String> = view
        .categories
        .iter()
        .map(|c| format!("[{}]", chip(c)))
        .collect();
    out.push_str(&format!("  {}\n\n", chips.join(" ")));

    out.push_str(&format!("{}\n", accent(&view.books_heading)));
    for book in &view.books {
        out.push_str(&format!("  {}\n    {}\n", book.title.bold(), book.author.dimmed()));
    }

    for highlight in &view.highlights {
        out.push_str(&format!(
            "\n{}\n  │ {}\n",
            accent(&highlight.title),
            highlight.content.italic()
        ));
    }

    out
}

/// Formats key/translation pairs.
pub fn format_translations(locale: &str, entries: &[(String, String)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Key", &format!("Text ({locale})")]);

    for (key, text) in entries {
        let shown = if text == key {
            format!("{} (missing)", truncate(text, 40))
        } else {
            truncate(text, 60)
        };
        table.add_row(vec![key.as_str(), &shown]);
    }

    table.to_string()
}

/// Formats the effective configuration.
pub fn format_config(config: &AppConfig, source: &Path) -> String {
    format!(
        "{}\n  File: {}\n  Data dir: {}\n  Default language: {}\n  Music: {}\n  Track: {} ({})\n  Setup delay: {} ms",
        "⚙ Configuration".bold(),
        source.display(),
        config.data_dir().display(),
        config.locale.default.to_string().cyan(),
        if config.audio.enabled {
            "on".green()
        } else {
            "off".red()
        },
        config.audio.track_title,
        config.audio.track_url.dimmed(),
        config.audio.setup_delay_ms
    )
}

/// Truncates to `max_chars` characters with an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
