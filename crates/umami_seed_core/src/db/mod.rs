//! SQLite content store bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing the content store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Seeder code must not read/write entities before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A migration script failed; nothing from the pending batch was applied.
    Migration {
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The schema version claims to be current but a content store table
    /// is absent.
    MissingTable {
        table: &'static str,
        db_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "content store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Migration { name, source } => {
                write!(f, "content store migration `{name}` failed: {source}")
            }
            Self::MissingTable { table, db_version } => write!(
                f,
                "content store at schema version {db_version} has no `{table}` table"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
