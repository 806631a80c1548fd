//! Onboarding Core CLI - drive the onboarding front-end core from a terminal.
//!
//! Persists state in `~/.onboarding-core/state.db` and plays the onboarding
//! music through a simulated audio backend.
//!
//!   onboarding-core status                 # Persisted state + engine locale
//!   onboarding-core language hi            # Switch language
//!   onboarding-core translate common.skip  # Look up a key
//!   onboarding-core onboard --mute         # Walk the carousel
//!   onboarding-core home                   # Content home screen

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use onboarding_core::application::{
    format_config, format_home, format_languages_table, format_state, format_translations,
    render_home, AudioSessionController, CarouselAction, LanguageChange,
    OnboardingCarouselController, SyncBridge,
};
use onboarding_core::cli::{Cli, Commands};
use onboarding_core::domain::{
    self, AppConfig, AppError, AppLifecycle, AudioState, HomeContent, LanguageCode,
    PersistedState, Slide, StateStore, ThemeVariant, TranslationEngine,
};
use onboarding_core::infrastructure::{
    config_file_path, ensure_config_exists, load_config, load_config_from_file, save_config,
    save_config_to_file, CatalogTranslator, ManualLifecycle, MemoryStateStore,
    SimulatedAudioSession, SqliteStateStore,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Concrete collaborators for one CLI invocation.
struct Session {
    config: AppConfig,
    config_path: PathBuf,
    store: Arc<dyn StateStore>,
    sqlite: Option<Arc<SqliteStateStore>>,
    engine: Arc<CatalogTranslator>,
    bridge: Arc<SyncBridge>,
}

impl Session {
    fn open(cli: &Cli) -> domain::Result<Self> {
        let (config, config_path) = match &cli.config {
            Some(path) => (load_config_from_file(path)?, path.clone()),
            None => (load_config()?, config_file_path()),
        };

        let defaults = PersistedState {
            language_code: config.locale.default,
            ..PersistedState::default()
        };

        let sqlite = if cli.ephemeral {
            None
        } else {
            Some(Arc::new(SqliteStateStore::open(
                &config.state_db_path(),
                defaults,
            )?))
        };
        let store: Arc<dyn StateStore> = match &sqlite {
            Some(sqlite) => Arc::clone(sqlite) as Arc<dyn StateStore>,
            None => Arc::new(MemoryStateStore::new(defaults)),
        };

        let engine = Arc::new(CatalogTranslator::builtin(config.locale.default)?);
        let bridge = Arc::new(SyncBridge::new(store.clone(), engine.clone()));

        Ok(Self {
            config,
            config_path,
            store,
            sqlite,
            engine,
            bridge,
        })
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let session = Session::open(&cli)?;

    match cli.command {
        Commands::Status => cmd_status(&session)?,
        Commands::Languages => cmd_languages(&session),
        Commands::Language { code } => cmd_language(&session, &code)?,
        Commands::Theme { variant } => cmd_theme(&session, variant.as_deref())?,
        Commands::Translate { keys } => cmd_translate(&session, &keys),
        Commands::Onboard {
            skip,
            mute,
            fail_audio,
            background_at,
        } => {
            let options = OnboardOptions {
                skip,
                mute,
                fail_audio,
                background_at,
            };
            cmd_onboard(&session, &options)?;
        }
        Commands::Home => cmd_home(&session),
        Commands::Config {
            default_language,
            music,
        } => {
            let update = ConfigUpdate {
                default_language: default_language.as_deref(),
                music: music.as_deref(),
            };
            cmd_config(&session, cli.config.is_none(), &update)?;
        }
    }

    session.bridge.close();
    Ok(())
}

/// Show persisted state command.
fn cmd_status(session: &Session) -> domain::Result<()> {
    let state = session.store.get()?;
    let updated = match &session.sqlite {
        Some(sqlite) => sqlite.last_updated()?,
        None => None,
    };

    println!(
        "{}",
        format_state(
            &state,
            &session.bridge.language_info(),
            session.bridge.is_rtl(),
            &session.engine.active_locale(),
            updated
        )
    );
    Ok(())
}

/// List languages command.
fn cmd_languages(session: &Session) {
    println!(
        "{}",
        format_languages_table(session.bridge.current_language(), &session.engine.locales())
    );
}

/// Change language command.
fn cmd_language(session: &Session, code: &str) -> domain::Result<()> {
    match session.bridge.change_language(code)? {
        LanguageChange::Unchanged(current) => {
            println!(
                "{} Already using {}",
                "•".blue(),
                current.info().display_name(true)
            );
        }
        LanguageChange::Changed { from, to } => {
            println!(
                "{} {} → {}",
                "✓".green().bold(),
                from.info().display_name(true),
                to.info().display_name(true).cyan()
            );
        }
    }
    Ok(())
}

/// Set or toggle theme command.
fn cmd_theme(session: &Session, variant: Option<&str>) -> domain::Result<()> {
    let theme = match variant {
        Some(name) => {
            let theme: ThemeVariant = name.parse()?;
            session.bridge.set_theme(theme);
            theme
        }
        None => session.bridge.toggle_theme(),
    };

    println!("{} Theme: {}", "✓".green().bold(), theme.to_string().cyan());
    Ok(())
}

/// Translate keys command.
fn cmd_translate(session: &Session, keys: &[String]) {
    let entries: Vec<(String, String)> = keys
        .iter()
        .map(|key| (key.clone(), session.bridge.translate(key)))
        .collect();

    println!(
        "{}",
        format_translations(session.bridge.current_language().as_str(), &entries)
    );
}

/// Show the content home screen command.
fn cmd_home(session: &Session) {
    let view = render_home(&session.bridge, &HomeContent::standard());
    println!("{}", format_home(&view));
}

/// Settings passed to `config`.
struct ConfigUpdate<'a> {
    default_language: Option<&'a str>,
    music: Option<&'a str>,
}

/// Show (and optionally update) configuration command.
fn cmd_config(
    session: &Session,
    default_location: bool,
    update: &ConfigUpdate<'_>,
) -> domain::Result<()> {
    let mut config = session.config.clone();
    let changed = update.default_language.is_some() || update.music.is_some();

    if let Some(code) = update.default_language {
        config.locale.default = code.parse::<LanguageCode>()?;
    }
    if let Some(music) = update.music {
        config.audio.enabled = music == "on";
    }

    let path = match (changed, default_location) {
        (true, true) => {
            save_config(&config)?;
            config_file_path()
        }
        (true, false) => {
            save_config_to_file(&config, &session.config_path)?;
            session.config_path.clone()
        }
        (false, true) => ensure_config_exists()?,
        (false, false) => session.config_path.clone(),
    };

    if changed {
        println!("{} Configuration saved", "✓".green().bold());
    }
    println!("{}", format_config(&config, &path));
    Ok(())
}

struct OnboardOptions {
    skip: bool,
    mute: bool,
    fail_audio: bool,
    background_at: Option<usize>,
}

/// Walk the onboarding carousel command.
fn cmd_onboard(session: &Session, options: &OnboardOptions) -> domain::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| AppError::io("Failed to start async runtime", e))?;

    runtime.block_on(run_onboarding(session, options))
}

async fn run_onboarding(session: &Session, options: &OnboardOptions) -> domain::Result<()> {
    let audio_config = &session.config.audio;
    let mut backend = SimulatedAudioSession::new(Duration::from_millis(audio_config.setup_delay_ms));
    if options.fail_audio {
        backend = backend.failing();
    }
    let backend = Arc::new(backend);

    let lifecycle = ManualLifecycle::new();
    let mut audio = AudioSessionController::mount(
        backend.clone(),
        audio_config.track(),
        audio_config.enabled && !options.mute,
    )?;
    audio.attach_lifecycle(&lifecycle);

    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    let mut carousel = OnboardingCarouselController::new(
        Slide::default_deck(),
        session.store.clone(),
        Arc::clone(&session.bridge),
        Box::new(move || flag.store(true, Ordering::SeqCst)),
    )?
    .with_audio(audio);

    if carousel.is_complete() {
        println!("{} Onboarding was already completed", "•".blue());
    }

    if let Some(audio) = carousel.audio() {
        let mut changes = audio.state_changes();
        let settled = changes
            .wait_for(|s| !matches!(s.state, AudioState::Uninitialized | AudioState::SettingUp))
            .await
            .map(|s| s.state)
            .unwrap_or(AudioState::Disposed);
        // Let the first play/pause call reach the backend.
        tokio::task::yield_now().await;
        let queued = backend.queued();
        if queued.is_empty() {
            println!("{} Music: {}", "♪".magenta(), settled);
        } else {
            println!("{} Music: {} ({})", "♪".magenta(), settled, queued.join(", "));
        }
    }

    let bridge = &session.bridge;
    loop {
        let slide = carousel.current_slide();
        let position = carousel.current_index() + 1;
        println!();
        println!(
            "{} {}",
            format!("[{position}/{}]", carousel.slide_count()).dimmed(),
            bridge.translate(&slide.title_key).bold()
        );
        println!("  {}", bridge.translate(&slide.description_key));
        println!(
            "  {} · {}",
            bridge.translate(carousel.primary_action_key()).green(),
            bridge.translate("common.skip").dimmed()
        );

        if options.background_at == Some(position) {
            lifecycle.emit(AppLifecycle::Background);
            let sound = if backend.is_playing() {
                "music keeps playing"
            } else {
                "music silent"
            };
            println!("  {} app backgrounded, {}", "↓".yellow(), sound);
            lifecycle.emit(AppLifecycle::Foreground);
            println!("  {} app foregrounded", "↑".yellow());
        }

        let action = if options.skip {
            carousel.skip()
        } else {
            carousel.advance()
        };

        match action {
            CarouselAction::ScrollTo(next) => carousel.on_viewability_changed(next),
            CarouselAction::Finished => break,
        }
    }

    carousel.unmount().await;

    if finished.load(Ordering::SeqCst) {
        println!();
        println!("{} Onboarding complete", "✓".green().bold());
    }
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
