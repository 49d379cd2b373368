//! End-to-end generation run
//!
//! Filter, graph, sufficiency gate, planned search and batch validation, in
//! that order. The caller's ledger is only replaced when the run commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::eligibility::{EligibilityFilter, FilterStats, FrequencyTable, Lexicon, Tier};
use crate::graph::{GraphStats, PhraseGraph, SufficiencyGate, SufficiencyVerdict};
use crate::phrase::Catalog;
use crate::reuse::ReuseLedger;
use crate::search::{ChainPlanner, GeneratedChain, PlanRequest, SearchSummary};
use crate::validate::{ChainValidator, ValidationReport};

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Chains generated and validated; safe to persist
    Committed,
    /// Graph failed the sufficiency gate; no search ran
    Aborted,
    /// Search ran but the batch failed validation
    ValidationFailed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Committed => write!(f, "committed"),
            RunOutcome::Aborted => write!(f, "aborted"),
            RunOutcome::ValidationFailed => write!(f, "validation failed"),
        }
    }
}

/// Diagnostics and output of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub tier: Tier,
    pub config: GenerationConfig,
    pub filter: FilterStats,
    pub graph: GraphStats,
    pub sufficiency: SufficiencyVerdict,
    /// Accepted chains; empty when the run aborted
    pub levels: Vec<GeneratedChain>,
    pub search: SearchSummary,
    /// Absent when the run aborted before search
    pub validation: Option<ValidationReport>,
}

impl RunReport {
    pub fn is_committed(&self) -> bool {
        self.outcome == RunOutcome::Committed
    }

    /// Distinct phrases across all accepted chains
    pub fn phrases_used(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|c| c.result.chain.iter().map(|r| r.id()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Share of eligible phrases placed in a level, as a percentage
    pub fn coverage(&self) -> f64 {
        if self.graph.edge_count == 0 {
            return 0.0;
        }
        self.phrases_used() as f64 / self.graph.edge_count as f64 * 100.0
    }
}

/// A configured generation run over injected lexicon and frequency data
pub struct Pipeline<'a> {
    config: GenerationConfig,
    lexicon: &'a Lexicon,
    frequencies: &'a FrequencyTable,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: GenerationConfig, lexicon: &'a Lexicon, frequencies: &'a FrequencyTable) -> Self {
        Self {
            config,
            lexicon,
            frequencies,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run every stage over `catalog`
    ///
    /// `ledger` carries usage from earlier runs. It is left untouched unless
    /// the outcome is [`RunOutcome::Committed`].
    pub fn run(&self, catalog: &Catalog, ledger: &mut ReuseLedger) -> RunReport {
        let config = &self.config;
        let tier = config.tier();
        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            %tier,
            levels = config.levels,
            chain_length = config.chain_length,
            first_level = config.first_level,
            seed = config.seed,
            "starting generation run"
        );

        let filter = EligibilityFilter::new(tier.config(), self.lexicon, self.frequencies);
        let (accepted, filter_stats) = filter.partition(catalog.records());

        let graph = PhraseGraph::from_records(accepted);
        let graph_stats = graph.stats();
        tracing::info!(
            nodes = graph_stats.node_count,
            edges = graph_stats.edge_count,
            avg_out_degree = graph_stats.avg_out_degree,
            dead_ends = graph_stats.dead_end_words,
            isolated = graph_stats.isolated_words,
            "phrase graph built"
        );

        let sufficiency = SufficiencyGate::new(config.sufficiency).check(
            &graph_stats,
            config.levels,
            config.chain_length,
        );

        let mut report = RunReport {
            run_id,
            generated_at: Utc::now(),
            outcome: RunOutcome::Aborted,
            tier,
            config: config.clone(),
            filter: filter_stats,
            graph: graph_stats,
            sufficiency,
            levels: Vec::new(),
            search: SearchSummary::default(),
            validation: None,
        };

        if !report.sufficiency.proceed {
            tracing::warn!(
                reasons = report.sufficiency.reasons.len(),
                "generation aborted before search"
            );
            return report;
        }

        let mut prior = ledger.clone();
        prior.set_policy(config.reuse);
        let mut working = prior.clone();

        let plan = ChainPlanner::new(&graph, config.search).plan(
            PlanRequest {
                levels: config.levels,
                chain_length: config.chain_length,
                seed: config.seed,
                first_level: config.first_level,
            },
            &mut working,
            None,
        );

        let validation = ChainValidator::new(config.min_phrases())
            .with_frequency_floor(tier.config().min_frequency)
            .expecting_levels(config.levels)
            .with_prior_ledger(&prior)
            .validate(
                plan.chains
                    .iter()
                    .map(|c| (c.level, c.result.chain.as_slice())),
                self.frequencies,
            );

        report.outcome = if validation.is_valid() {
            RunOutcome::Committed
        } else {
            RunOutcome::ValidationFailed
        };
        report.levels = plan.chains;
        report.search = plan.summary;
        report.validation = Some(validation);

        if report.is_committed() {
            *ledger = working;
        }

        tracing::info!(
            %run_id,
            outcome = %report.outcome,
            levels = report.levels.len(),
            attempts = report.search.attempts,
            "generation run finished"
        );
        report
    }
}
