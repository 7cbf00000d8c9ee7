use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::item::Item;
use crate::store::{decode, encode, ItemStore, DEFAULT_RECORD_KEY};

/// SQLite-backed store keeping the collection under one named record.
pub struct SqliteItemStore {
    conn: Mutex<Connection>,
    record_key: String,
}

impl SqliteItemStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Backend(format!("open: {}", e)))?;
        Self::init_with_connection(conn, DEFAULT_RECORD_KEY)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Backend(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn, DEFAULT_RECORD_KEY)
    }

    /// Store the collection under a different record name.
    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = key.into();
        self
    }

    fn init_with_connection(conn: Connection, record_key: &str) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| StoreError::Backend(format!("init_schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            record_key: record_key.to_string(),
        })
    }

    fn read_record(&self) -> Result<Option<String>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        conn.query_row(
            "SELECT value FROM records WHERE key = ?1",
            params![self.record_key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::Backend(format!("read record: {}", e)))
    }
}

impl ItemStore for SqliteItemStore {
    fn load_all(&self) -> Result<Vec<Item>, StoreError> {
        match self.read_record()? {
            Some(text) => decode(&text),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        let text = encode(items)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Backend(format!("begin tx: {}", e)))?;
        tx.execute(
            "INSERT INTO records (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![self.record_key, text],
        )
        .map_err(|e| StoreError::Backend(format!("write record: {}", e)))?;
        tx.commit()
            .map_err(|e| StoreError::Backend(format!("commit: {}", e)))?;
        Ok(())
    }

    fn size_estimate(&self) -> Result<u64, StoreError> {
        Ok(self.read_record()?.map_or(0, |t| t.len() as u64))
    }
}
