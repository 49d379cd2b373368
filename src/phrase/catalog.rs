//! Catalog loading: the single conversion boundary from raw tabular rows

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use super::record::{PhraseId, PhraseRecord};

/// Errors raised while converting raw rows into phrase records
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Phrase '{0}' has an empty word")]
    EmptyWord(String),

    #[error("Phrase '{0}' is not exactly two words")]
    NotTwoWords(String),

    #[error("Phrase '{phrase}' does not match words '{word1}' + '{word2}'")]
    WordMismatch {
        phrase: String,
        word1: String,
        word2: String,
    },

    #[error("Phrase '{0}' has ambiguity score 0 (must be >= 1)")]
    InvalidAmbiguity(String),

    #[error("Phrase '{0}' has a non-finite frequency score")]
    InvalidFrequency(String),

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// One row of the phrase table as it arrives from upstream
///
/// Accepts the legacy column names used by the scoring scripts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPhraseRow {
    pub phrase: String,
    #[serde(default)]
    pub word1: Option<String>,
    #[serde(default)]
    pub word2: Option<String>,
    #[serde(alias = "PFS", alias = "pfs")]
    pub frequency: f64,
    #[serde(alias = "CES_estimate", alias = "ces", default = "default_ambiguity")]
    pub ambiguity: u32,
    #[serde(alias = "category_tag", default)]
    pub category: Option<String>,
    #[serde(alias = "tone_tag", default)]
    pub tone: Option<String>,
    #[serde(alias = "level_tier", default)]
    pub tier: Option<String>,
}

fn default_ambiguity() -> u32 {
    1
}

impl TryFrom<RawPhraseRow> for PhraseRecord {
    type Error = CatalogError;

    fn try_from(row: RawPhraseRow) -> CatalogResult<Self> {
        let mut record = match (row.word1.as_deref(), row.word2.as_deref()) {
            (Some(w1), Some(w2)) => {
                PhraseRecord::new(row.phrase.as_str(), w1, w2, row.frequency, row.ambiguity)?
            }
            _ => PhraseRecord::from_phrase(&row.phrase, row.frequency, row.ambiguity)?,
        };
        if let Some(category) = row.category.filter(|c| !c.trim().is_empty()) {
            record = record.with_category(category);
        }
        if let Some(tone) = row.tone.filter(|t| !t.trim().is_empty()) {
            record = record.with_tone(tone);
        }
        if let Some(tier) = row.tier {
            record = record.with_tier_label(tier);
        }
        Ok(record)
    }
}

/// Deduplicated, validated set of phrase records in input order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<PhraseRecord>,
    duplicates: Vec<PhraseId>,
}

impl Catalog {
    /// Build a catalog from already-constructed records
    ///
    /// Later records whose identity was already seen are dropped.
    pub fn from_records(records: impl IntoIterator<Item = PhraseRecord>) -> Self {
        let mut seen: HashSet<PhraseId> = HashSet::new();
        let mut catalog = Self::default();

        for record in records {
            if seen.insert(record.id().clone()) {
                catalog.records.push(record);
            } else {
                catalog.duplicates.push(record.id().clone());
            }
        }

        if !catalog.duplicates.is_empty() {
            tracing::debug!(
                duplicates = catalog.duplicates.len(),
                "dropped duplicate phrases from catalog"
            );
        }
        catalog
    }

    /// Convert raw rows, failing on the first malformed row
    pub fn from_rows(rows: impl IntoIterator<Item = RawPhraseRow>) -> CatalogResult<Self> {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                PhraseRecord::try_from(row).map_err(|e| CatalogError::Row {
                    row: i + 1,
                    source: Box::new(e),
                })
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    /// Parse a JSON array of row objects
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let rows: Vec<RawPhraseRow> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    /// Load a JSON array of row objects from disk
    pub fn load_json(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            records = catalog.len(),
            duplicates = catalog.duplicates.len(),
            "loaded phrase catalog"
        );
        Ok(catalog)
    }

    pub fn records(&self) -> &[PhraseRecord] {
        &self.records
    }

    /// Identities dropped as duplicates, in encounter order
    pub fn duplicates(&self) -> &[PhraseId] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
