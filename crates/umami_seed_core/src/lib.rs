//! Demo content seeding for the Umami content store.
//!
//! Imports a fixed set of articles, press releases, pages, block content and
//! their supporting users, terms and files, and records what it created so
//! `delete_imported_content` can remove exactly that set again.

pub mod db;
pub mod files;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod source;

pub use files::{FileStoreError, PublicFiles};
pub use ledger::{ContentLedger, LedgerError, LEDGER_STATE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::entity::{Entity, EntityId, EntityPayload, EntityType};
pub use repo::alias_repo::{AliasResolver, SqlitePathAliasRepository};
pub use repo::entity_repo::{
    EntityQuery, EntityStorage, RepoError, RepoResult, SqliteEntityStorage,
};
pub use repo::state_repo::{SqliteStateStore, StateStore};
pub use service::seeder::{
    ContentSeeder, DeleteFailure, DeleteSummary, ImportStep, ImportSummary, RowErrorPolicy,
    SeedError, SeedResult, StepReport,
};
pub use source::locator::ContentLocator;

/// Seeder built on SQLite repositories sharing one connection.
pub type SqliteContentSeeder<'conn> = ContentSeeder<
    SqliteEntityStorage<'conn>,
    SqlitePathAliasRepository<'conn>,
    SqliteStateStore<'conn>,
>;

/// Wires a seeder whose storage, aliases and ledger all live in `conn`.
pub fn sqlite_seeder(
    conn: &rusqlite::Connection,
    locator: ContentLocator,
    files: PublicFiles,
) -> SqliteContentSeeder<'_> {
    ContentSeeder::new(
        SqliteEntityStorage::new(conn),
        SqlitePathAliasRepository::new(conn),
        ContentLedger::new(SqliteStateStore::new(conn)),
        locator,
        files,
    )
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
