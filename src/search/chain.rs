//! Backtracking chain search over a phrase graph

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{ChainResult, SearchConfig, SearchOutcome, SearchStats};
use crate::graph::{EdgeId, PhraseGraph};
use crate::phrase::{normalize_word, PhraseId, PhraseRecord};

/// Extra admissibility check applied to every candidate edge
pub type EdgePredicate<'a> = &'a dyn Fn(&PhraseRecord) -> bool;

/// Query for one fixed-length chain starting at a word
///
/// Depth-first with an explicit stack of choice frames: each frame holds the
/// ranked alternatives not yet tried at that depth. Backtracking pops to the
/// deepest frame with an alternative left; the attempt ends when the chain is
/// complete, no frame has alternatives, or the exploration budget is spent.
#[derive(Clone)]
pub struct ChainQuery<'a> {
    /// Word the chain starts from
    pub start_word: String,
    /// Number of phrases wanted
    pub target_length: usize,
    /// Seed for tie-breaking among equal-quality candidates
    pub seed: u64,
    pub config: SearchConfig,
    /// Phrases owned by previously accepted chains
    pub excluded: Option<&'a HashSet<PhraseId>>,
    pub predicate: Option<EdgePredicate<'a>>,
}

/// Remaining ranked alternatives at one depth
#[derive(Debug)]
struct ChoiceFrame {
    remaining: VecDeque<EdgeId>,
}

/// Mutable state of an attempt in progress
struct Walk<'g> {
    graph: &'g PhraseGraph,
    chain: Vec<EdgeId>,
    in_chain: HashSet<PhraseId>,
    word_usage: HashMap<String, usize>,
}

impl<'g> Walk<'g> {
    fn new(graph: &'g PhraseGraph, start: &str) -> Self {
        let mut word_usage = HashMap::new();
        word_usage.insert(start.to_string(), 1);
        Self {
            graph,
            chain: Vec::new(),
            in_chain: HashSet::new(),
            word_usage,
        }
    }

    fn usage(&self, word: &str) -> usize {
        self.word_usage.get(word).copied().unwrap_or(0)
    }

    fn push(&mut self, id: EdgeId) -> &'g str {
        let graph = self.graph;
        let record = graph.edge(id);
        self.chain.push(id);
        self.in_chain.insert(record.id().clone());
        *self.word_usage.entry(record.word1().to_string()).or_default() += 1;
        *self.word_usage.entry(record.word2().to_string()).or_default() += 1;
        record.word2()
    }

    fn pop(&mut self) {
        if let Some(id) = self.chain.pop() {
            let record = self.graph.edge(id);
            self.in_chain.remove(record.id());
            for word in [record.word1(), record.word2()] {
                if let Some(count) = self.word_usage.get_mut(word) {
                    *count = count.saturating_sub(1);
                }
            }
        }
    }
}

impl<'a> ChainQuery<'a> {
    /// Create a query starting from `start_word`
    pub fn from(start_word: impl Into<String>) -> Self {
        Self {
            start_word: start_word.into(),
            target_length: 16,
            seed: 0,
            config: SearchConfig::default(),
            excluded: None,
            predicate: None,
        }
    }

    /// Set the number of phrases wanted
    pub fn length(mut self, target_length: usize) -> Self {
        self.target_length = target_length;
        self
    }

    /// Set the tie-breaking seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use the given search tunables
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Never use phrases in `excluded`
    pub fn excluding(mut self, excluded: &'a HashSet<PhraseId>) -> Self {
        self.excluded = Some(excluded);
        self
    }

    /// Only use phrases accepted by `predicate`
    pub fn with_predicate(mut self, predicate: EdgePredicate<'a>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Maximum loop iterations before the attempt is abandoned
    pub fn budget(&self) -> usize {
        self.target_length
            .saturating_mul(self.config.budget_factor)
            .max(1)
    }

    /// Run the search against a graph
    pub fn execute(&self, graph: &PhraseGraph) -> ChainResult {
        let start = normalize_word(&self.start_word);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut stats = SearchStats::default();
        let mut walk = Walk::new(graph, &start);
        let mut frames: Vec<ChoiceFrame> = Vec::new();
        let mut deepest: Vec<EdgeId> = Vec::new();
        let mut current: &str = &start;
        let mut outcome = SearchOutcome::Complete;
        let budget = self.budget();

        while walk.chain.len() < self.target_length {
            if stats.branches_explored >= budget {
                tracing::warn!(
                    start = %start,
                    length = walk.chain.len(),
                    budget,
                    "exploration budget exhausted"
                );
                outcome = SearchOutcome::BudgetExhausted;
                break;
            }
            stats.branches_explored += 1;

            let mut ranked = self.rank_candidates(&walk, current, &mut rng);
            if let Some(chosen) = ranked.pop_front() {
                frames.push(ChoiceFrame { remaining: ranked });
                current = walk.push(chosen);
            } else {
                stats.record_dead_end(current);

                let Some(depth) = frames.iter().rposition(|f| !f.remaining.is_empty()) else {
                    tracing::debug!(
                        start = %start,
                        length = walk.chain.len(),
                        "all alternatives exhausted"
                    );
                    outcome = SearchOutcome::Exhausted;
                    break;
                };

                while walk.chain.len() > depth {
                    walk.pop();
                }
                frames.truncate(depth + 1);
                let Some(next) = frames[depth].remaining.pop_front() else {
                    outcome = SearchOutcome::Exhausted;
                    break;
                };
                stats.backtracks += 1;
                current = walk.push(next);
            }

            stats.max_depth = stats.max_depth.max(walk.chain.len());
            if walk.chain.len() > deepest.len() {
                deepest.clone_from(&walk.chain);
            }
        }

        let chosen = if outcome == SearchOutcome::Complete {
            walk.chain
        } else {
            deepest
        };
        let chain: Vec<PhraseRecord> = chosen.iter().map(|&id| graph.edge(id).clone()).collect();
        let score = self.score(&start, &chain);

        ChainResult {
            start_word: start,
            chain,
            score,
            stats,
            outcome,
        }
    }

    /// Admissible out-edges of `word`, best first
    ///
    /// Ordered by descending quality; equal quality is ordered by a seeded
    /// random key so results are reproducible for a given seed.
    fn rank_candidates(&self, walk: &Walk<'_>, word: &str, rng: &mut StdRng) -> VecDeque<EdgeId> {
        let max_reuse = self.config.max_reuse;
        let mut candidates: Vec<(EdgeId, f64, u64)> = walk
            .graph
            .out_ids(word)
            .iter()
            .copied()
            .filter(|&id| {
                let record = walk.graph.edge(id);
                !self.excluded.is_some_and(|ex| ex.contains(record.id()))
                    && !walk.in_chain.contains(record.id())
                    && walk.usage(record.word1()) < max_reuse
                    && walk.usage(record.word2()) < max_reuse
                    && self.predicate.map_or(true, |accept| accept(record))
            })
            .map(|id| {
                let quality = walk.graph.edge(id).quality(self.config.ambiguity_weight);
                (id, quality, rng.gen::<u64>())
            })
            .collect();

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)));
        candidates.into_iter().map(|(id, _, _)| id).collect()
    }

    /// Sum of qualities minus the penalty for repeated word use
    fn score(&self, start: &str, chain: &[PhraseRecord]) -> f64 {
        if chain.is_empty() {
            return 0.0;
        }
        let mut usage: HashMap<&str, usize> = HashMap::new();
        usage.insert(start, 1);
        for record in chain {
            *usage.entry(record.word1()).or_default() += 1;
            *usage.entry(record.word2()).or_default() += 1;
        }
        let repeats: usize = usage.values().map(|&c| c.saturating_sub(1)).sum();
        let quality: f64 = chain
            .iter()
            .map(|r| r.quality(self.config.ambiguity_weight))
            .sum();
        quality - self.config.reuse_penalty * repeats as f64
    }
}
