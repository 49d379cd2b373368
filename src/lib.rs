//! Phrasechain: tier-gated word-chain level generator
//!
//! Turns a bank of scored two-word phrases into playable word-chain levels,
//! where the second word of each phrase starts the next one.
//!
//! # Core Concepts
//!
//! - **Eligibility**: per-tier gate over ambiguity, frequency, category and
//!   curated word lists
//! - **Phrase graph**: words as nodes, each admissible phrase a directed edge
//! - **Chain search**: seeded backtracking search for fixed-length chains
//! - **Validation**: all-or-nothing batch check before anything is written
//!
//! # Example
//!
//! ```
//! use phrasechain::{ChainQuery, PhraseGraph, PhraseRecord};
//!
//! let graph = PhraseGraph::from_records([
//!     PhraseRecord::from_phrase("hot dog", 5.0, 1).unwrap(),
//!     PhraseRecord::from_phrase("dog house", 4.0, 1).unwrap(),
//! ]);
//! let result = ChainQuery::from("hot").length(2).execute(&graph);
//! assert!(result.is_complete());
//! ```

pub mod config;
pub mod eligibility;
mod graph;
pub mod phrase;
pub mod pipeline;
pub mod reuse;
pub mod search;
pub mod storage;
pub mod validate;

pub use config::{ConfigError, ConfigResult, GenerationConfig, ValidationSettings};
pub use eligibility::{
    Decision, EligibilityFilter, FilterStats, FrequencyTable, Lexicon, RejectionReason, Tier,
    TierConfig,
};
pub use graph::{
    AbortReason, EdgeId, GraphStats, PhraseGraph, SufficiencyGate, SufficiencyThresholds,
    SufficiencyVerdict,
};
pub use phrase::{Catalog, CatalogError, CatalogResult, PhraseId, PhraseRecord, RawPhraseRow};
pub use pipeline::{Pipeline, RunOutcome, RunReport};
pub use reuse::{ReuseLedger, ReusePolicy};
pub use search::{
    ChainPlanner, ChainQuery, ChainResult, GeneratedChain, PlanRequest, SearchConfig,
    SearchOutcome, SearchStats, SearchSummary,
};
pub use storage::{JsonFileStore, LevelDocument, LevelStore, StorageError, StorageResult};
pub use validate::{ChainValidator, ValidationIssue, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
