//! Authoritative phrase frequency lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::phrase::{CatalogResult, PhraseId, PhraseRecord};

/// Highest discrete frequency score
pub const MAX_FREQUENCY_SCORE: u8 = 5;

/// Map a percentile rank (0-100) onto the discrete 1-5 scale
pub fn percentile_to_score(percentile: f64) -> u8 {
    if percentile >= 90.0 {
        5
    } else if percentile >= 70.0 {
        4
    } else if percentile >= 40.0 {
        3
    } else if percentile >= 20.0 {
        2
    } else {
        1
    }
}

/// Discrete frequency scores keyed by normalized phrase identity
///
/// A phrase absent from the table is "not attested"; there is no default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    scores: HashMap<PhraseId, u8>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-discrete scores (clamped to the 1-5 scale)
    pub fn from_scores<K: AsRef<str>>(scores: impl IntoIterator<Item = (K, u8)>) -> Self {
        let scores = scores
            .into_iter()
            .map(|(phrase, score)| {
                (
                    PhraseId::normalize(phrase.as_ref()),
                    score.clamp(1, MAX_FREQUENCY_SCORE),
                )
            })
            .collect();
        Self { scores }
    }

    /// Band raw corpus counts by percentile rank within the given set
    ///
    /// A count's percentile is the share of counts strictly below it.
    pub fn from_counts<K: AsRef<str>>(counts: impl IntoIterator<Item = (K, u64)>) -> Self {
        let counts: Vec<(PhraseId, u64)> = counts
            .into_iter()
            .map(|(phrase, count)| (PhraseId::normalize(phrase.as_ref()), count))
            .collect();

        let mut sorted: Vec<u64> = counts.iter().map(|(_, c)| *c).collect();
        sorted.sort_unstable();
        let total = sorted.len() as f64;

        let scores = counts
            .into_iter()
            .map(|(id, count)| {
                let below = sorted.partition_point(|&c| c < count) as f64;
                (id, percentile_to_score(below / total * 100.0))
            })
            .collect();
        Self { scores }
    }

    /// Derive a table from the catalog's own frequency column
    ///
    /// Scores are rounded to the nearest integer on the 1-5 scale.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PhraseRecord>) -> Self {
        let scores = records
            .into_iter()
            .map(|r| {
                let score = r.frequency().round().clamp(1.0, MAX_FREQUENCY_SCORE as f64) as u8;
                (r.id().clone(), score)
            })
            .collect();
        Self { scores }
    }

    /// Load a JSON object mapping phrase text to score
    pub fn load_json(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let raw: HashMap<String, u8> = serde_json::from_str(&text)?;
        let table = Self::from_scores(raw);
        tracing::info!(
            path = %path.as_ref().display(),
            entries = table.len(),
            "loaded frequency table"
        );
        Ok(table)
    }

    pub fn insert(&mut self, phrase: &str, score: u8) {
        self.scores.insert(
            PhraseId::normalize(phrase),
            score.clamp(1, MAX_FREQUENCY_SCORE),
        );
    }

    /// Score for a phrase, `None` when not attested
    pub fn get(&self, id: &PhraseId) -> Option<u8> {
        self.scores.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_bands() {
        assert_eq!(percentile_to_score(95.0), 5);
        assert_eq!(percentile_to_score(90.0), 5);
        assert_eq!(percentile_to_score(75.0), 4);
        assert_eq!(percentile_to_score(40.0), 3);
        assert_eq!(percentile_to_score(20.0), 2);
        assert_eq!(percentile_to_score(0.0), 1);
    }

    #[test]
    fn counts_are_banded_by_rank() {
        // Ten distinct counts: rank i has i values strictly below it
        let counts: Vec<(String, u64)> = (0..10)
            .map(|i| (format!("word{} thing", i), (i as u64 + 1) * 100))
            .collect();
        let table = FrequencyTable::from_counts(counts);

        assert_eq!(table.get(&PhraseId::normalize("word0 thing")), Some(1));
        assert_eq!(table.get(&PhraseId::normalize("word2 thing")), Some(2));
        assert_eq!(table.get(&PhraseId::normalize("word5 thing")), Some(3));
        assert_eq!(table.get(&PhraseId::normalize("word7 thing")), Some(4));
        assert_eq!(table.get(&PhraseId::normalize("word9 thing")), Some(5));
    }

    #[test]
    fn tied_counts_share_a_score() {
        let table = FrequencyTable::from_counts([("a b", 7u64), ("c d", 7), ("e f", 7)]);
        assert_eq!(table.get(&PhraseId::normalize("a b")), Some(1));
        assert_eq!(table.get(&PhraseId::normalize("e f")), Some(1));
    }

    #[test]
    fn lookup_is_normalized_and_absent_is_none() {
        let table = FrequencyTable::from_scores([("Hot Dog", 5u8)]);
        assert_eq!(table.get(&PhraseId::normalize("hot dog")), Some(5));
        assert_eq!(table.get(&PhraseId::normalize("cold dog")), None);
    }

    #[test]
    fn scores_are_clamped() {
        let table = FrequencyTable::from_scores([("a b", 9u8), ("c d", 0)]);
        assert_eq!(table.get(&PhraseId::normalize("a b")), Some(5));
        assert_eq!(table.get(&PhraseId::normalize("c d")), Some(1));
    }

    #[test]
    fn derived_from_records_rounds() {
        let records = vec![
            PhraseRecord::from_phrase("hot dog", 4.6, 1).unwrap(),
            PhraseRecord::from_phrase("dog house", 2.2, 1).unwrap(),
        ];
        let table = FrequencyTable::from_records(&records);
        assert_eq!(table.get(records[0].id()), Some(5));
        assert_eq!(table.get(records[1].id()), Some(2));
    }
}
