//! Path alias lookups.

use crate::repo::entity_repo::RepoResult;
use rusqlite::{Connection, OptionalExtension};

/// Resolves system paths (`/node/3`) to their public alias.
pub trait AliasResolver {
    /// Returns the newest alias for `path`, or `path` itself when none exists.
    fn alias_by_path(&self, path: &str) -> RepoResult<String>;
}

pub struct SqlitePathAliasRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePathAliasRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AliasResolver for SqlitePathAliasRepository<'_> {
    fn alias_by_path(&self, path: &str) -> RepoResult<String> {
        let alias: Option<String> = self
            .conn
            .query_row(
                "SELECT alias
                 FROM path_alias
                 WHERE path = ?1
                 ORDER BY id DESC
                 LIMIT 1;",
                [path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(alias.unwrap_or_else(|| path.to_string()))
    }
}
