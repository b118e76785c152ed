//! Persistent key-value state.
//!
//! # Invariants
//! - Values are opaque strings; callers own their encoding.
//! - `set` replaces any previous value for the key.

use crate::repo::entity_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

const STATE_COLLECTION: &str = "state";

pub trait StateStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    fn delete(&self, key: &str) -> RepoResult<()>;
}

/// State store backed by the `key_value` table, `state` collection.
pub struct SqliteStateStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateStore for SqliteStateStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM key_value WHERE collection = ?1 AND name = ?2;",
                params![STATE_COLLECTION, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO key_value (collection, name, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, name) DO UPDATE SET value = excluded.value;",
            params![STATE_COLLECTION, key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM key_value WHERE collection = ?1 AND name = ?2;",
            params![STATE_COLLECTION, key],
        )?;
        Ok(())
    }
}
