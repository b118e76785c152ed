//! Domain model for seeded content.
//!
//! # Responsibility
//! - Define the typed records the seeder builds (nodes, users, terms, files,
//!   block content).
//! - Wrap them in one `Entity` envelope carrying storage identity.
//!
//! # Invariants
//! - Every record is identified by a stable uuid.
//! - Field-level defaults (moderation state, mail, term alias) are derived
//!   in constructors, not by callers.

pub mod block_content;
pub mod entity;
pub mod file;
pub mod node;
pub mod term;
pub mod user;
