//src/db.rs
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;

const DB_FILE_NAME: &str = "workout-plan.sqlite";
pub(crate) const APP_DATA_DIR: &str = "workout-plan-tracker";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Failed to encode store '{0}': {1}")]
    Encode(String, serde_json::Error),
    #[error("Failed to decode store '{0}': {1}")]
    Decode(String, serde_json::Error),
}

/// The logical stores the tracker persists, each loaded and saved on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum StoreName {
    Progress,
    Notes,
    History,
    PlanOverlay,
}

/// Named-blob persistence.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when nothing has been saved under `name` yet.
    fn load(&self, name: &str) -> Result<Option<String>, Error>;
    fn save(&mut self, name: &str, value: &str) -> Result<(), Error>;
}

/// Blobs kept in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps an open connection, creating the table if needed.
    pub fn new(conn: Connection) -> Result<Self, Error> {
        init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::new(open_db(path)?)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::new(Connection::open_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, name: &str) -> Result<Option<String>, Error> {
        self.conn
            .query_row(
                "SELECT value FROM stores WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::QueryFailed)
    }

    fn save(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.conn
            .execute(
                "INSERT INTO stores (name, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![name, value, Utc::now().to_rfc3339()],
            )
            .map_err(Error::WriteFailed)?;
        Ok(())
    }
}

/// Non-persistent store, for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.blobs.get(name).cloned())
    }

    fn save(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.blobs.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and decodes a JSON store. Missing stores come back as `None`.
pub fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    name: StoreName,
) -> Result<Option<T>, Error> {
    match store.load(name.as_ref())? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Decode(name.to_string(), e)),
        None => Ok(None),
    }
}

pub fn save_json<T: serde::Serialize>(
    store: &mut dyn KeyValueStore,
    name: StoreName,
    value: &T,
) -> Result<(), Error> {
    let raw =
        serde_json::to_string(value).map_err(|e| Error::Encode(name.to_string(), e))?;
    store.save(name.as_ref(), &raw)
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    Ok(app_data_dir()?.join(DB_FILE_NAME))
}

pub(crate) fn app_data_dir() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir)
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Initializes the database tables if they don't exist.
pub fn init(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stores (
            name TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,              -- JSON blob
            updated_at TEXT NOT NULL          -- RFC3339
        )",
        [],
    )
    .map_err(Error::Connection)?;
    Ok(())
}
