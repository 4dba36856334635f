//! Storage Module
//!
//! Persistence for [`VocabularyProgress`](crate::progress::VocabularyProgress):
//! - `ProgressStore` contract (load / create / save / due / delete)
//! - Optimistic concurrency through a per-record version
//! - SQLite implementation with versioned migrations

mod migrations;
mod sqlite;
mod store;

pub use migrations::MIGRATIONS;
pub use sqlite::{SqliteStore, DB_FILE_NAME};
pub use store::{ProgressStore, Result, StorageError};
