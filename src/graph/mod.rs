//! Phrase graph and the sufficiency gate in front of search

mod edge;
mod phrase_graph;
mod sufficiency;


pub use edge::EdgeId;
pub use phrase_graph::{GraphStats, PhraseGraph};
pub use sufficiency::{AbortReason, SufficiencyGate, SufficiencyThresholds, SufficiencyVerdict};
