//! Multi-chain orchestration: start-word ranking and attempt rotation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::chain::{ChainQuery, EdgePredicate};
use super::types::{ChainResult, SearchConfig, SearchSummary};
use crate::graph::PhraseGraph;
use crate::phrase::{PhraseId, PhraseRecord};
use crate::reuse::ReuseLedger;

/// A candidate start word and its connectivity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWord {
    pub word: String,
    pub out_degree: usize,
    pub in_degree: usize,
}

impl StartWord {
    /// `2 x out-degree + in-degree`
    pub fn rank_score(&self) -> usize {
        2 * self.out_degree + self.in_degree
    }
}

/// What to generate in one planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRequest {
    pub levels: usize,
    pub chain_length: usize,
    pub seed: u64,
    /// Level index assigned to the first accepted chain
    pub first_level: usize,
}

/// An accepted chain and the level it was assigned
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedChain {
    pub level: usize,
    pub result: ChainResult,
}

/// Everything a planning run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub chains: Vec<GeneratedChain>,
    pub summary: SearchSummary,
}

/// Drives repeated chain searches until the requested count is reached
///
/// Each attempt sees every phrase of every previously accepted chain as
/// excluded, plus whatever the ledger forbids for the level being searched.
/// Failed attempts contribute statistics only.
pub struct ChainPlanner<'g> {
    graph: &'g PhraseGraph,
    config: SearchConfig,
}

impl<'g> ChainPlanner<'g> {
    pub fn new(graph: &'g PhraseGraph, config: SearchConfig) -> Self {
        Self { graph, config }
    }

    /// Start candidates, most connected first
    ///
    /// Words below the minimum out-degree are skipped. Ties are broken by
    /// word so the order is stable.
    pub fn rank_start_words(&self) -> Vec<StartWord> {
        let mut starts: Vec<StartWord> = self
            .graph
            .words()
            .into_iter()
            .map(|word| StartWord {
                word: word.to_string(),
                out_degree: self.graph.out_degree(word),
                in_degree: self.graph.in_degree(word),
            })
            .filter(|s| s.out_degree >= self.config.min_start_out_degree.max(1))
            .collect();

        starts.sort_by(|a, b| {
            b.rank_score()
                .cmp(&a.rank_score())
                .then_with(|| a.word.cmp(&b.word))
        });
        starts
    }

    /// Generate up to `request.levels` chains
    ///
    /// The ledger is marked as each chain is accepted. `extra` is applied to
    /// every candidate edge in addition to the exclusion and ledger checks.
    pub fn plan(
        &self,
        request: PlanRequest,
        ledger: &mut ReuseLedger,
        extra: Option<EdgePredicate<'_>>,
    ) -> Plan {
        let mut plan = Plan::default();
        let starts = self.rank_start_words();
        if starts.is_empty() {
            tracing::error!(
                min_out_degree = self.config.min_start_out_degree,
                "no valid start words"
            );
            return plan;
        }

        let max_attempts = request
            .levels
            .saturating_mul(self.config.attempts_per_level);
        let mut used: HashSet<PhraseId> = HashSet::new();

        for attempt in 1..=max_attempts {
            if plan.chains.len() >= request.levels {
                break;
            }
            let start = &starts[(attempt - 1) % starts.len()];
            let level = request.first_level + plan.chains.len();

            let result = {
                let ledger_ref: &ReuseLedger = ledger;
                let admissible = |record: &PhraseRecord| {
                    ledger_ref.can_use(record.id(), level) && extra.map_or(true, |f| f(record))
                };
                ChainQuery::from(start.word.as_str())
                    .length(request.chain_length)
                    .seed(request.seed.wrapping_add(attempt as u64))
                    .with_config(self.config)
                    .excluding(&used)
                    .with_predicate(&admissible)
                    .execute(self.graph)
            };
            plan.summary.absorb(&result);

            if result.is_complete() {
                for record in &result.chain {
                    used.insert(record.id().clone());
                    ledger.mark_used(record.id(), level);
                }
                tracing::info!(
                    level,
                    start = %result.start_word,
                    score = result.score,
                    backtracks = result.stats.backtracks,
                    "chain accepted"
                );
                plan.chains.push(GeneratedChain { level, result });
            } else {
                tracing::debug!(
                    attempt,
                    start = %result.start_word,
                    length = result.len(),
                    dead_ends = result.stats.dead_ends,
                    "partial chain discarded"
                );
            }
        }

        if plan.chains.len() < request.levels {
            tracing::warn!(
                requested = request.levels,
                generated = plan.chains.len(),
                attempts = plan.summary.attempts,
                "attempt limit reached before all levels were generated"
            );
        }
        plan
    }
}
