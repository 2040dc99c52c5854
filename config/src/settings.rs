//! Persistent key/value settings store (§6.3 "Persistent settings").
//!
//! Backed by `rusqlite`, mirroring the teacher's own use of a SQLite-backed
//! store for small persisted state. Defaults are applied whenever a key is
//! missing from the table, so a fresh database behaves identically to the
//! documented defaults.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings db: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("home directory not found")]
    NoHomeDir,
}

/// One persisted setting, with its documented default (§6.3).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub include_system_prompt: bool,
    pub system_prompt: String,
    pub include_history: bool,
    pub debug_logging: bool,
    pub debug_full_request_log: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_system_prompt: false,
            system_prompt: String::new(),
            include_history: true,
            debug_logging: false,
            debug_full_request_log: false,
        }
    }
}

/// The SQLite-backed key/value settings store.
pub struct SettingsStore {
    conn: Connection,
}

const KEYS: &[&str] = &[
    "includeSystemPrompt",
    "systemPrompt",
    "includeHistory",
    "debugLogging",
    "debugFullRequestLog",
];

impl SettingsStore {
    /// Opens (creating if necessary) the settings database at `path`.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Opens the default database at `~/.pi-gateway/settings.db`.
    pub fn open_default() -> Result<Self, SettingsError> {
        let home = dirs::home_dir().ok_or(SettingsError::NoHomeDir)?;
        Self::open(&default_path(&home))
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .ok()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Loads all known settings, applying defaults (§6.3) for any key not
    /// yet present in the table.
    pub fn load(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            include_system_prompt: self
                .get_raw("includeSystemPrompt")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.include_system_prompt),
            system_prompt: self
                .get_raw("systemPrompt")
                .unwrap_or(defaults.system_prompt),
            include_history: self
                .get_raw("includeHistory")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.include_history),
            debug_logging: self
                .get_raw("debugLogging")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debug_logging),
            debug_full_request_log: self
                .get_raw("debugFullRequestLog")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debug_full_request_log),
        }
    }

    /// Persists `settings`, writing every known key.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        self.set_raw(
            "includeSystemPrompt",
            &settings.include_system_prompt.to_string(),
        )?;
        self.set_raw("systemPrompt", &settings.system_prompt)?;
        self.set_raw("includeHistory", &settings.include_history.to_string())?;
        self.set_raw("debugLogging", &settings.debug_logging.to_string())?;
        self.set_raw(
            "debugFullRequestLog",
            &settings.debug_full_request_log.to_string(),
        )?;
        Ok(())
    }

    /// The known setting keys (for introspection/debug endpoints).
    pub fn known_keys() -> &'static [&'static str] {
        KEYS
    }
}

fn default_path(home: &Path) -> PathBuf {
    home.join(".pi-gateway").join("settings.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_returns_documented_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();
        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert!(!settings.include_system_prompt);
        assert!(settings.include_history);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();
        let mut settings = store.load();
        settings.include_system_prompt = true;
        settings.system_prompt = "Be concise.".to_string();
        settings.debug_logging = true;
        store.save(&settings).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn reopening_the_same_path_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");
        {
            let store = SettingsStore::open(&path).unwrap();
            let mut s = store.load();
            s.include_history = false;
            store.save(&s).unwrap();
        }
        let store2 = SettingsStore::open(&path).unwrap();
        assert!(!store2.load().include_history);
    }
}
