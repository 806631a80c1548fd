//! Local SQLite storage for the persisted application state.
//!
//! A single-row table holds the language code, theme variant, and
//! onboarding flag, so the state survives restarts.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{
    AppError, LanguageCode, Listener, PersistedState, Result, StatePatch, StateStore,
    Subscription, ThemeVariant,
};

use super::listeners::ListenerSet;

/// Persistent [`StateStore`] using SQLite.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
    listeners: ListenerSet<PersistedState>,
}

impl SqliteStateStore {
    /// Opens or creates the state database.
    ///
    /// `defaults` seeds the row on first open only.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path, defaults: PersistedState) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;
        Self::with_connection(conn, defaults)
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory(defaults: PersistedState) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        Self::with_connection(conn, defaults)
    }

    fn with_connection(conn: Connection, defaults: PersistedState) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let store = Self {
            conn: Mutex::new(conn),
            listeners: ListenerSet::new(),
        };
        store.init_schema(defaults)?;

        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self, defaults: PersistedState) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS app_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                language_code TEXT NOT NULL,
                theme_variant TEXT NOT NULL,
                onboarding_complete INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT
            );
            ",
        )
        .map_err(AppError::database)?;

        conn.execute(
            "INSERT OR IGNORE INTO app_state (id, language_code, theme_variant, onboarding_complete)
             VALUES (1, ?1, ?2, ?3)",
            params![
                defaults.language_code.as_str(),
                defaults.theme_variant.as_str(),
                i32::from(defaults.onboarding_complete),
            ],
        )
        .map_err(AppError::database)?;

        Ok(())
    }

    fn read_state(conn: &Connection) -> Result<PersistedState> {
        conn.query_row(
            "SELECT language_code, theme_variant, onboarding_complete FROM app_state WHERE id = 1",
            [],
            |row| {
                let language: String = row.get(0)?;
                let theme: String = row.get(1)?;
                let complete: i32 = row.get(2)?;
                Ok((language, theme, complete))
            },
        )
        .map(|(language, theme, complete)| PersistedState {
            // Rows written by older builds may carry codes we no longer ship.
            language_code: LanguageCode::from_code_or_default(&language),
            theme_variant: theme.parse::<ThemeVariant>().unwrap_or_default(),
            onboarding_complete: complete != 0,
        })
        .map_err(AppError::database)
    }

    /// When the state was last written, if ever.
    pub fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .lock()
            .query_row("SELECT updated_at FROM app_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(AppError::database)?
            .flatten();

        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self) -> Result<PersistedState> {
        Self::read_state(&self.conn.lock())
    }

    fn set(&self, patch: StatePatch) -> Result<()> {
        let committed = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction().map_err(AppError::database)?;

            let next = Self::read_state(&tx)?.apply(patch);
            tx.execute(
                r"
                UPDATE app_state SET
                    language_code = ?1,
                    theme_variant = ?2,
                    onboarding_complete = ?3,
                    updated_at = ?4
                WHERE id = 1
                ",
                params![
                    next.language_code.as_str(),
                    next.theme_variant.as_str(),
                    i32::from(next.onboarding_complete),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(AppError::database)?;

            tx.commit().map_err(AppError::database)?;
            next
        };

        tracing::debug!(
            language = %committed.language_code,
            theme = %committed.theme_variant,
            onboarding_complete = committed.onboarding_complete,
            "State committed"
        );
        self.listeners.notify(&committed);

        Ok(())
    }

    fn subscribe(&self, listener: Listener<PersistedState>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_open_seeds_defaults() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db");
        let defaults = PersistedState {
            language_code: LanguageCode::Or,
            ..PersistedState::default()
        };

        let store = SqliteStateStore::open(&db_path, defaults).unwrap();
        assert_eq!(store.get().unwrap(), defaults);
        assert!(store.last_updated().unwrap().is_none());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db");

        {
            let store = SqliteStateStore::open(&db_path, PersistedState::default()).unwrap();
            store.set(StatePatch::language(LanguageCode::Hi)).unwrap();
            store.set(StatePatch::onboarding_complete()).unwrap();
            assert!(store.last_updated().unwrap().is_some());
        }

        // Defaults are ignored once a row exists.
        let reopened = SqliteStateStore::open(
            &db_path,
            PersistedState {
                language_code: LanguageCode::Bn,
                ..PersistedState::default()
            },
        )
        .unwrap();
        let state = reopened.get().unwrap();
        assert_eq!(state.language_code, LanguageCode::Hi);
        assert!(state.onboarding_complete);
    }

    #[test]
    fn test_unknown_persisted_code_maps_to_default() {
        let store = SqliteStateStore::open_in_memory(PersistedState::default()).unwrap();
        store
            .conn
            .lock()
            .execute("UPDATE app_state SET language_code = 'fr', theme_variant = 'neon'", [])
            .unwrap();

        let state = store.get().unwrap();
        assert_eq!(state.language_code, LanguageCode::En);
        assert_eq!(state.theme_variant, ThemeVariant::Dark);
    }

    #[test]
    fn test_listener_sees_committed_row() {
        let store = Arc::new(SqliteStateStore::open_in_memory(PersistedState::default()).unwrap());
        let reader = Arc::clone(&store);
        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);

        let _sub = store.subscribe(Arc::new(move |state: &PersistedState| {
            assert_eq!(reader.get().unwrap(), *state);
            *sink.lock() += 1;
        }));

        store.set(StatePatch::theme(ThemeVariant::Gradient)).unwrap();
        assert_eq!(*hits.lock(), 1);
    }
}
