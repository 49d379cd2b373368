//! Search configuration and result structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::phrase::PhraseRecord;

/// Tunables for chain search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-attempt cap on how often a word may appear as a phrase endpoint
    pub max_reuse: usize,
    /// Score deduction per repeated word use
    pub reuse_penalty: f64,
    /// Weight of ambiguity in a phrase's quality score
    pub ambiguity_weight: f64,
    /// Exploration budget per attempt, as a multiple of chain length
    pub budget_factor: usize,
    /// Minimum out-degree for a word to be used as a chain start
    pub min_start_out_degree: usize,
    /// Attempts allowed per requested level
    pub attempts_per_level: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_reuse: 2,
            reuse_penalty: 0.3,
            ambiguity_weight: 0.1,
            budget_factor: 500,
            min_start_out_degree: 2,
            attempts_per_level: 10,
        }
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Reached the target length
    Complete,
    /// Every alternative was tried
    Exhausted,
    /// Exploration budget ran out
    BudgetExhausted,
}

/// Per-attempt search statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub branches_explored: usize,
    pub backtracks: usize,
    pub dead_ends: usize,
    /// Multiset of words where the search got stuck
    pub dead_end_words: BTreeMap<String, usize>,
    /// Longest chain reached during the attempt
    pub max_depth: usize,
}

impl SearchStats {
    pub(crate) fn record_dead_end(&mut self, word: &str) {
        self.dead_ends += 1;
        *self.dead_end_words.entry(word.to_string()).or_default() += 1;
    }
}

/// Result of one chain search attempt
#[derive(Debug, Clone, Serialize)]
pub struct ChainResult {
    pub start_word: String,
    /// Full chain on success, deepest partial chain otherwise
    pub chain: Vec<PhraseRecord>,
    pub score: f64,
    pub stats: SearchStats,
    pub outcome: SearchOutcome,
}

impl ChainResult {
    pub fn is_complete(&self) -> bool {
        self.outcome == SearchOutcome::Complete
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Totals across every attempt of a multi-chain run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub attempts: usize,
    pub failed_attempts: usize,
    pub branches_explored: usize,
    pub backtracks: usize,
    pub dead_ends: usize,
    pub dead_end_words: BTreeMap<String, usize>,
}

impl SearchSummary {
    pub(crate) fn absorb(&mut self, result: &ChainResult) {
        self.attempts += 1;
        if !result.is_complete() {
            self.failed_attempts += 1;
        }
        self.branches_explored += result.stats.branches_explored;
        self.backtracks += result.stats.backtracks;
        self.dead_ends += result.stats.dead_ends;
        for (word, count) in &result.stats.dead_end_words {
            *self.dead_end_words.entry(word.clone()).or_default() += count;
        }
    }

    /// Most frequent dead-end words, highest count first
    pub fn top_dead_ends(&self, n: usize) -> Vec<(&str, usize)> {
        let mut words: Vec<(&str, usize)> = self
            .dead_end_words
            .iter()
            .map(|(w, c)| (w.as_str(), *c))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        words.truncate(n);
        words
    }
}
