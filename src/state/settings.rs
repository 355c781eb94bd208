use rusqlite::{Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Errors from reading or writing persisted settings
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("settings database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("settings value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Key-value settings that survive restarts.
///
/// Values are stored as JSON text; use [`load`] and [`store`] for typed
/// access.
pub trait SettingsStore {
    fn read(&self, key: &str) -> SettingsResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> SettingsResult<()>;
}

/// Read and deserialize a setting. Ok(None) if it was never written.
pub fn load<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> SettingsResult<Option<T>> {
    match store.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize and write a setting
pub fn store<T: Serialize>(store: &mut dyn SettingsStore, key: &str, value: &T) -> SettingsResult<()> {
    let json = serde_json::to_string(value)?;
    store.write(key, &json)
}

/// Settings persisted in a SQLite database
pub struct SqliteSettings {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteSettings {
    /// Open (or create) the settings database at `db_path`.
    /// The parent directory is created if needed.
    pub fn open(db_path: &Path) -> SettingsResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        log::info!("📁 Settings database opened at: {}", db_path.display());

        let settings = SqliteSettings {
            conn,
            db_path: db_path.to_path_buf(),
        };
        settings.init_schema()?;

        Ok(settings)
    }

    /// Create the settings table if it doesn't exist
    fn init_schema(&self) -> SettingsResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

impl SettingsStore for SqliteSettings {
    fn read(&self, key: &str) -> SettingsResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, chrono::Utc::now().timestamp()],
        )?;

        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSettings")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Settings kept only for the lifetime of the process.
/// Used when the database can't be opened, and in tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl SettingsStore for MemorySettings {
    fn read(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
