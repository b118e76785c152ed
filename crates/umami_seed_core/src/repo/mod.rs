//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage seams the seeder depends on (entities, aliases,
//!   state).
//! - Isolate SQL details from seeding orchestration.

pub mod alias_repo;
pub mod entity_repo;
pub mod state_repo;
