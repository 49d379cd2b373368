//! Batch validation that gates every commit
//!
//! Hard errors discard the whole batch. Warnings are reported but never
//! block a commit.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::eligibility::FrequencyTable;
use crate::phrase::{PhraseId, PhraseRecord};
use crate::reuse::ReuseLedger;

/// A single finding, tagged with the level it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    NoChains,
    TooShort {
        level: usize,
        length: usize,
        min: usize,
    },
    BrokenLink {
        level: usize,
        position: usize,
        previous: String,
        next: String,
    },
    DuplicateInChain {
        level: usize,
        phrase: String,
    },
    ReusedAcrossChains {
        phrase: String,
        first_level: usize,
        level: usize,
    },
    ReuseGapViolated {
        phrase: String,
        used_at: usize,
        level: usize,
    },
    LowFrequency {
        level: usize,
        phrase: String,
        frequency: u8,
        floor: u8,
    },
    Unattested {
        level: usize,
        phrase: String,
    },
    MissingLevels {
        requested: usize,
        generated: usize,
    },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::NoChains => write!(f, "no chains to validate"),
            ValidationIssue::TooShort { level, length, min } => {
                write!(f, "level {}: {} phrases, need at least {}", level, length, min)
            }
            ValidationIssue::BrokenLink {
                level,
                position,
                previous,
                next,
            } => write!(
                f,
                "level {}: broken link at {} ('{}' -> '{}')",
                level, position, previous, next
            ),
            ValidationIssue::DuplicateInChain { level, phrase } => {
                write!(f, "level {}: '{}' appears twice", level, phrase)
            }
            ValidationIssue::ReusedAcrossChains {
                phrase,
                first_level,
                level,
            } => write!(
                f,
                "'{}' used in both level {} and level {}",
                phrase, first_level, level
            ),
            ValidationIssue::ReuseGapViolated {
                phrase,
                used_at,
                level,
            } => write!(
                f,
                "level {}: '{}' is too close to its use at level {}",
                level, phrase, used_at
            ),
            ValidationIssue::LowFrequency {
                level,
                phrase,
                frequency,
                floor,
            } => write!(
                f,
                "level {}: '{}' frequency {} below floor {}",
                level, phrase, frequency, floor
            ),
            ValidationIssue::Unattested { level, phrase } => {
                write!(f, "level {}: '{}' has no frequency entry", level, phrase)
            }
            ValidationIssue::MissingLevels {
                requested,
                generated,
            } => write!(f, "generated {} of {} requested levels", generated, requested),
        }
    }
}

/// Outcome of validating a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub chains_checked: usize,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks a whole batch of chains before commit
#[derive(Debug, Clone)]
pub struct ChainValidator<'a> {
    min_phrases: usize,
    frequency_floor: u8,
    requested_levels: Option<usize>,
    prior: Option<&'a ReuseLedger>,
}

impl<'a> ChainValidator<'a> {
    pub fn new(min_phrases: usize) -> Self {
        Self {
            min_phrases,
            frequency_floor: 0,
            requested_levels: None,
            prior: None,
        }
    }

    /// Warn about phrases scoring below `floor`
    pub fn with_frequency_floor(mut self, floor: u8) -> Self {
        self.frequency_floor = floor;
        self
    }

    /// Warn when fewer than `levels` chains were produced
    pub fn expecting_levels(mut self, levels: usize) -> Self {
        self.requested_levels = Some(levels);
        self
    }

    /// Re-check each phrase against usage recorded by earlier runs
    pub fn with_prior_ledger(mut self, ledger: &'a ReuseLedger) -> Self {
        self.prior = Some(ledger);
        self
    }

    /// Validate `(level, chain)` pairs against a frequency table
    pub fn validate<'c, I>(&self, chains: I, frequencies: &FrequencyTable) -> ValidationReport
    where
        I: IntoIterator<Item = (usize, &'c [PhraseRecord])>,
    {
        let mut report = ValidationReport::default();
        let mut owner: HashMap<PhraseId, usize> = HashMap::new();

        for (level, chain) in chains {
            report.chains_checked += 1;
            self.check_chain(level, chain, &mut owner, frequencies, &mut report);
        }

        if report.chains_checked == 0 {
            report.errors.push(ValidationIssue::NoChains);
        }
        if let Some(requested) = self.requested_levels {
            if report.chains_checked < requested {
                report.warnings.push(ValidationIssue::MissingLevels {
                    requested,
                    generated: report.chains_checked,
                });
            }
        }

        for warning in &report.warnings {
            tracing::warn!(%warning, "validation warning");
        }
        if report.is_valid() {
            tracing::info!(
                chains = report.chains_checked,
                warnings = report.warnings.len(),
                "validation passed"
            );
        } else {
            for error in &report.errors {
                tracing::warn!(%error, "validation error");
            }
        }
        report
    }

    fn check_chain(
        &self,
        level: usize,
        chain: &[PhraseRecord],
        owner: &mut HashMap<PhraseId, usize>,
        frequencies: &FrequencyTable,
        report: &mut ValidationReport,
    ) {
        if chain.len() < self.min_phrases {
            report.errors.push(ValidationIssue::TooShort {
                level,
                length: chain.len(),
                min: self.min_phrases,
            });
        }

        for (position, pair) in chain.windows(2).enumerate() {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.word2().to_lowercase() != next.word1().to_lowercase() {
                report.errors.push(ValidationIssue::BrokenLink {
                    level,
                    position: position + 1,
                    previous: previous.phrase().to_string(),
                    next: next.phrase().to_string(),
                });
            }
        }

        let mut in_chain: HashSet<&PhraseId> = HashSet::new();
        for record in chain {
            let id = record.id();
            if !in_chain.insert(id) {
                report.errors.push(ValidationIssue::DuplicateInChain {
                    level,
                    phrase: id.to_string(),
                });
                continue;
            }

            match owner.get(id) {
                Some(&first_level) => report.errors.push(ValidationIssue::ReusedAcrossChains {
                    phrase: id.to_string(),
                    first_level,
                    level,
                }),
                None => {
                    owner.insert(id.clone(), level);
                }
            }

            if let Some(ledger) = self.prior {
                if let Some(used_at) = ledger.conflict(id, level) {
                    report.errors.push(ValidationIssue::ReuseGapViolated {
                        phrase: id.to_string(),
                        used_at,
                        level,
                    });
                }
            }

            if self.frequency_floor > 0 {
                match frequencies.get(id) {
                    None => report.warnings.push(ValidationIssue::Unattested {
                        level,
                        phrase: id.to_string(),
                    }),
                    Some(score) if score < self.frequency_floor => {
                        report.warnings.push(ValidationIssue::LowFrequency {
                            level,
                            phrase: id.to_string(),
                            frequency: score,
                            floor: self.frequency_floor,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }
}
