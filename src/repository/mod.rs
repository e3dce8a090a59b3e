//! Repository layer for transient persistence.
//!
//! The pipeline needs three capabilities from the store: the
//! existence/completion check and the insert/update writers. They live
//! behind a trait so a fake can stand in for the store under test.

mod sqlite;

pub use sqlite::SqliteTransientRepository;

use thiserror::Error;

use crate::models::{TransientRecord, TransientStatus};

/// Store-level failure: connection or statement error.
///
/// Any variant aborts the run before a write is attempted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Persistence operations for transient records.
pub trait TransientRepository {
    /// Report the persistence state of a transient id.
    fn status(&self, id: &str) -> Result<TransientStatus, StoreError>;

    /// Insert a brand-new row with every column.
    fn insert(&self, record: &TransientRecord) -> Result<(), StoreError>;

    /// Overwrite only the path and artifact flag columns of an existing row.
    fn update_artifacts(&self, record: &TransientRecord) -> Result<(), StoreError>;
}
