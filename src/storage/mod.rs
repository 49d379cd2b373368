//! Persistence for committed levels and the reuse ledger
//!
//! Storage backends implement the `LevelStore` trait. `JsonFileStore`
//! writes pretty JSON and replaces files atomically.

mod document;
mod json;
mod traits;

pub use document::{DocumentConfig, DocumentSummary, LevelDocument, LevelEntry, LevelPhrase, LevelStats};
pub use json::{write_json_atomic, JsonFileStore};
pub use traits::{LevelStore, StorageError, StorageResult};
