//! Seeding use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, ledger and file calls into the import and
//!   teardown operations.
//! - Stay storage-agnostic: everything goes through the repository traits.

pub mod blocks;
pub mod seeder;
