//! Chain search: single backtracking attempts and multi-chain planning
//!
//! [`ChainQuery`] assembles one fixed-length chain from a start word.
//! [`ChainPlanner`] repeats queries across ranked start words until the
//! requested number of levels is reached or the attempt limit runs out.

mod chain;
mod planner;
mod types;

pub use chain::{ChainQuery, EdgePredicate};
pub use planner::{ChainPlanner, GeneratedChain, Plan, PlanRequest, StartWord};
pub use types::{ChainResult, SearchConfig, SearchOutcome, SearchStats, SearchSummary};
