//! Content store schema migrations.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - After migrating, every table the repositories touch exists.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "0001_entities",
        sql: include_str!("0001_entities.sql"),
    },
    Migration {
        version: 2,
        name: "0002_key_value",
        sql: include_str!("0002_key_value.sql"),
    },
];

/// Tables read or written by the entity, alias and state repositories.
pub const CONTENT_TABLES: [&str; 3] = ["entities", "path_alias", "key_value"];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies pending migrations in one transaction, then checks that the
/// content store tables are present.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS
            .iter()
            .filter(|migration| migration.version > current_version)
        {
            tx.execute_batch(migration.sql)
                .and_then(|()| {
                    tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
                })
                .map_err(|source| DbError::Migration {
                    name: migration.name,
                    source,
                })?;
            info!(
                "event=db_migrate module=db status=ok migration={} version={}",
                migration.name, migration.version
            );
        }
        tx.commit()?;
    }

    verify_content_tables(conn, latest)
}

fn verify_content_tables(conn: &Connection, db_version: u32) -> DbResult<()> {
    for table in CONTENT_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::MissingTable { table, db_version });
        }
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
