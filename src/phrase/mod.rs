//! Phrase records and the catalog they are loaded from

mod catalog;
mod record;

pub use catalog::{Catalog, CatalogError, CatalogResult, RawPhraseRow};
pub use record::{normalize_text, normalize_word, PhraseId, PhraseRecord};
