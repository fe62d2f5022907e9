//! SQLite storage layer for orq project files.
//!
//! A project is a single SQLite file holding requirements, solutions, their
//! version lineage, labels and media.
//!
//! # Submodules
//!
//! - [`schema`] - Table definitions and schema creation
//! - [`sqlite`] - Engine handle: open, close, statements, transactions
//! - [`items`] - Item reads and graph navigation
//! - [`versioning`] - Amend-or-fork update controller
//! - [`projects`] - Project info and project versions
//! - [`labels`] - Labels and label links
//! - [`media`] - Media blobs attached to solutions
//! - [`uid`] - Random item uid generation

pub mod items;
pub mod labels;
pub mod media;
pub mod projects;
pub mod schema;
pub mod sqlite;
pub mod uid;
pub mod versioning;

pub use sqlite::SqliteStorage;
pub use uid::{RandomUid, UidGenerator, UidSource};
pub use versioning::UpdateOutcome;
