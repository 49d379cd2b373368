//! Storage trait definitions

use thiserror::Error;

use super::document::LevelDocument;
use crate::pipeline::{RunOutcome, RunReport};
use crate::reuse::ReuseLedger;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Run outcome '{0}' cannot be committed")]
    NotCommittable(RunOutcome),

    #[error("Level document is malformed: {0}")]
    Malformed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for committed levels and the cross-run reuse ledger
///
/// `commit` is all-or-nothing per artifact: a report that is not
/// [`RunOutcome::Committed`] is refused before anything is written.
pub trait LevelStore {
    /// Write the level document and ledger for a committed run
    fn commit(&self, report: &RunReport, ledger: &ReuseLedger) -> StorageResult<LevelDocument>;

    /// Load the current level document, if one has been written
    fn load_levels(&self) -> StorageResult<Option<LevelDocument>>;

    /// Load the reuse ledger; an absent ledger is empty
    fn load_ledger(&self) -> StorageResult<ReuseLedger>;
}
