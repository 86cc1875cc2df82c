use std::path::Path;

use log::{debug, info, trace};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Durable key-value storage the stores persist into.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

/// Build the database.
impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Database, StorageError> {
        let path = path.as_ref();
        trace!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Database::init_db(conn)
    }

    pub fn in_memory() -> Result<Database, StorageError> {
        trace!("Opening in-memory database");
        let conn = Connection::open_in_memory()?;
        Database::init_db(conn)
    }

    fn init_db(conn: Connection) -> Result<Database, StorageError> {
        trace!("Initializing database...");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;

        info!("Finished initializing database");

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }
}

impl Storage for Database {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!("Reading {} from database", key);
        let value = self
            .conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key=?1", (key,), |row| {
                row.get::<usize, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!("Writing {} to database", key);
        self.conn.lock().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            (key, value),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        debug!("Removing {} from database", key);
        self.conn
            .lock()
            .execute("DELETE FROM kv WHERE key=?1", (key,))?;
        Ok(())
    }
}
