use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::connection::{create_tables, ensure_schema};

/// Failures raised by a key-value backend. The record store surfaces these to
/// the user rather than dropping writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Opaque string-keyed persistence, the same shape as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Key-value store kept in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = ensure_schema(path)?;
        Ok(Self { conn })
    }

    /// Throwaway database, handy for tests and demos.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Non-persistent store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
        store.remove("theme").unwrap();
    }

    #[test]
    fn sqlite_store_round_trips_values() {
        let store = SqliteStore::in_memory().unwrap();
        exercise(&store);
    }

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        exercise(&store);
        assert!(!store.contains("theme"));
    }

    #[test]
    fn keys_are_independent() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
