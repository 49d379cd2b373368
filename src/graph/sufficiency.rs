//! Pre-search check that a graph can plausibly support the requested output

use serde::{Deserialize, Serialize};

use super::phrase_graph::GraphStats;

/// Absolute floors a graph must clear before search begins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SufficiencyThresholds {
    pub min_edges: usize,
    pub min_nodes: usize,
    pub min_avg_out_degree: f64,
}

impl Default for SufficiencyThresholds {
    fn default() -> Self {
        Self {
            min_edges: 50,
            min_nodes: 30,
            min_avg_out_degree: 0.8,
        }
    }
}

/// One triggered abort condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    TooFewEdges { edges: usize, min: usize },
    TooFewNodes { nodes: usize, min: usize },
    SparseConnectivity { avg_out_degree: f64, min: f64 },
    BelowRequiredVolume { edges: usize, required: usize },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::TooFewEdges { edges, min } => {
                write!(f, "edge count {} below minimum {}", edges, min)
            }
            AbortReason::TooFewNodes { nodes, min } => {
                write!(f, "node count {} below minimum {}", nodes, min)
            }
            AbortReason::SparseConnectivity { avg_out_degree, min } => write!(
                f,
                "average out-degree {:.2} below minimum {:.2}",
                avg_out_degree, min
            ),
            AbortReason::BelowRequiredVolume { edges, required } => write!(
                f,
                "edge count {} below half of the {} phrases requested",
                edges, required
            ),
        }
    }
}

/// Gate verdict with every triggered reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyVerdict {
    pub proceed: bool,
    pub reasons: Vec<AbortReason>,
}

/// Decides abort vs proceed from graph statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct SufficiencyGate {
    thresholds: SufficiencyThresholds,
}

impl SufficiencyGate {
    pub fn new(thresholds: SufficiencyThresholds) -> Self {
        Self { thresholds }
    }

    /// Check `stats` against the floors and a `levels x length` request
    ///
    /// All conditions are evaluated; the verdict lists each one that fired.
    pub fn check(&self, stats: &GraphStats, levels: usize, length: usize) -> SufficiencyVerdict {
        let t = &self.thresholds;
        let mut reasons = Vec::new();

        if stats.edge_count < t.min_edges {
            reasons.push(AbortReason::TooFewEdges {
                edges: stats.edge_count,
                min: t.min_edges,
            });
        }
        if stats.node_count < t.min_nodes {
            reasons.push(AbortReason::TooFewNodes {
                nodes: stats.node_count,
                min: t.min_nodes,
            });
        }
        if stats.avg_out_degree < t.min_avg_out_degree {
            reasons.push(AbortReason::SparseConnectivity {
                avg_out_degree: stats.avg_out_degree,
                min: t.min_avg_out_degree,
            });
        }

        let required = levels.saturating_mul(length);
        if (stats.edge_count as f64) < required as f64 / 2.0 {
            reasons.push(AbortReason::BelowRequiredVolume {
                edges: stats.edge_count,
                required,
            });
        }

        if reasons.is_empty() {
            tracing::info!(
                edges = stats.edge_count,
                nodes = stats.node_count,
                avg_out_degree = stats.avg_out_degree,
                "graph sufficient for generation"
            );
        } else {
            for reason in &reasons {
                tracing::warn!(%reason, "graph insufficient");
            }
        }

        SufficiencyVerdict {
            proceed: reasons.is_empty(),
            reasons,
        }
    }
}
