//! Per-video audio language preferences.
//!
//! Keys are `audioTrackPreference_<videoId>`, values a lowercased primary
//! language subtag. Preference I/O never fails a caller: use
//! [`load_preference`] / [`save_preference`], which log and swallow errors.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::PolyglotError;
use crate::language;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_preferences.sql");

/// Storage key for a video's audio preference.
pub fn preference_key(video_id: &str) -> String {
    format!("audioTrackPreference_{video_id}")
}

/// A persistent string-keyed preference store.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PolyglotError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PolyglotError>;
}

/// Load the saved audio language for a video. Errors are logged, not returned.
pub fn load_preference(store: &dyn PreferenceStore, video_id: &str) -> Option<String> {
    if video_id.is_empty() {
        return None;
    }
    match store.get(&preference_key(video_id)) {
        Ok(Some(lang)) => {
            tracing::debug!(video_id, language = %lang, "Loaded audio preference");
            Some(lang)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(video_id, error = %e, "Failed to load audio preference");
            None
        }
    }
}

/// Save the audio language chosen for a video. Errors are logged, not returned.
pub fn save_preference(store: &dyn PreferenceStore, video_id: &str, language_code: &str) {
    let lang = language::primary_subtag(language_code);
    if video_id.is_empty() || lang.is_empty() {
        return;
    }
    match store.set(&preference_key(video_id), &lang) {
        Ok(()) => tracing::debug!(video_id, language = %lang, "Saved audio preference"),
        Err(e) => tracing::warn!(video_id, error = %e, "Failed to save audio preference"),
    }
}

// ── SQLite ────────────────────────────────────────────────────────────

/// SQLite-backed preference store.
pub struct SqlitePreferences {
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, PolyglotError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, PolyglotError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PolyglotError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PolyglotError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> Result<(), PolyglotError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

// ── In-memory ─────────────────────────────────────────────────────────

/// Volatile preference store, for tests and sessions without a data directory.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PolyglotError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PolyglotError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PolyglotError> {
            Err(PolyglotError::Config("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), PolyglotError> {
            Err(PolyglotError::Config("unavailable".into()))
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(preference_key("abc123"), "audioTrackPreference_abc123");
    }

    #[test]
    fn test_sqlite_roundtrip_and_overwrite() {
        let store = SqlitePreferences::open_memory().unwrap();
        assert_eq!(load_preference(&store, "vid"), None);

        save_preference(&store, "vid", "de-DE");
        assert_eq!(load_preference(&store, "vid").as_deref(), Some("de"));

        save_preference(&store, "vid", "ES");
        assert_eq!(load_preference(&store, "vid").as_deref(), Some("es"));
        assert_eq!(
            store.get("audioTrackPreference_vid").unwrap().as_deref(),
            Some("es")
        );
    }

    #[test]
    fn test_sqlite_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        {
            let store = SqlitePreferences::open(&path).unwrap();
            save_preference(&store, "vid", "pl");
        }
        let reopened = SqlitePreferences::open(&path).unwrap();
        assert_eq!(load_preference(&reopened, "vid").as_deref(), Some("pl"));
    }

    #[test]
    fn test_empty_inputs_are_ignored() {
        let store = MemoryPreferences::default();
        save_preference(&store, "", "en");
        save_preference(&store, "vid", "");
        assert_eq!(load_preference(&store, ""), None);
        assert_eq!(load_preference(&store, "vid"), None);
    }

    #[test]
    fn test_errors_are_swallowed() {
        save_preference(&BrokenStore, "vid", "en");
        assert_eq!(load_preference(&BrokenStore, "vid"), None);
    }
}
