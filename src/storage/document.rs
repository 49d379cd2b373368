//! The committed level document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::traits::{StorageError, StorageResult};
use crate::eligibility::{FrequencyTable, Tier};
use crate::phrase::PhraseRecord;
use crate::pipeline::{RunOutcome, RunReport};

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Parameters the levels were generated with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub levels: usize,
    pub phrases_per_level: usize,
    pub seed: u64,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub levels_generated: usize,
    pub total_phrases_used: usize,
    pub eligible_phrases: usize,
    /// Percent of eligible phrases placed in a level, one decimal
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPhrase {
    pub phrase: String,
    pub word1: String,
    pub word2: String,
    pub frequency: f64,
    pub ambiguity: u32,
    pub quality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub branches_explored: usize,
    pub backtracks: usize,
    pub dead_ends: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub level: usize,
    pub start_word: String,
    pub phrases: Vec<LevelPhrase>,
    pub score: f64,
    #[serde(default)]
    pub stats: LevelStats,
}

/// Output artifact of a committed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub config: DocumentConfig,
    pub summary: DocumentSummary,
    pub levels: Vec<LevelEntry>,
}

impl LevelDocument {
    /// Render a committed run; any other outcome is refused
    pub fn from_report(report: &RunReport) -> StorageResult<Self> {
        if report.outcome != RunOutcome::Committed {
            return Err(StorageError::NotCommittable(report.outcome));
        }

        let weight = report.config.search.ambiguity_weight;
        let levels = report
            .levels
            .iter()
            .map(|generated| LevelEntry {
                level: generated.level,
                start_word: generated.result.start_word.clone(),
                phrases: generated
                    .result
                    .chain
                    .iter()
                    .map(|record| LevelPhrase {
                        phrase: record.phrase().to_string(),
                        word1: record.word1().to_string(),
                        word2: record.word2().to_string(),
                        frequency: record.frequency(),
                        ambiguity: record.ambiguity(),
                        quality: round_to(record.quality(weight), 2),
                    })
                    .collect(),
                score: round_to(generated.result.score, 2),
                stats: LevelStats {
                    branches_explored: generated.result.stats.branches_explored,
                    backtracks: generated.result.stats.backtracks,
                    dead_ends: generated.result.stats.dead_ends,
                },
            })
            .collect();

        Ok(Self {
            generated_at: report.generated_at,
            run_id: report.run_id,
            config: DocumentConfig {
                levels: report.config.levels,
                phrases_per_level: report.config.chain_length,
                seed: report.config.seed,
                tier: report.tier,
            },
            summary: DocumentSummary {
                levels_generated: report.levels.len(),
                total_phrases_used: report.phrases_used(),
                eligible_phrases: report.graph.edge_count,
                coverage: round_to(report.coverage(), 1),
            },
            levels,
        })
    }

    pub fn from_json_str(json: &str) -> StorageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Rebuild `(level, chain)` pairs for re-validation
    pub fn chains(&self) -> StorageResult<Vec<(usize, Vec<PhraseRecord>)>> {
        self.levels
            .iter()
            .map(|entry| {
                let chain = entry
                    .phrases
                    .iter()
                    .map(|p| {
                        PhraseRecord::new(&p.phrase, &p.word1, &p.word2, p.frequency, p.ambiguity)
                            .map_err(|e| {
                                StorageError::Malformed(format!("level {}: {}", entry.level, e))
                            })
                    })
                    .collect::<StorageResult<Vec<_>>>()?;
                Ok((entry.level, chain))
            })
            .collect()
    }

    /// Frequency scores as recorded in the document
    pub fn frequency_table(&self) -> StorageResult<FrequencyTable> {
        let chains = self.chains()?;
        Ok(FrequencyTable::from_records(
            chains.iter().flat_map(|(_, chain)| chain.iter()),
        ))
    }
}
