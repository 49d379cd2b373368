//! Directed word graph whose edges are admissible phrases

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::edge::EdgeId;
use crate::phrase::{normalize_word, PhraseId, PhraseRecord};

/// Aggregate shape of a phrase graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Edges per node
    pub avg_out_degree: f64,
    /// Words with no outgoing phrase
    pub dead_end_words: usize,
    /// Words with no phrase to or from any other word
    pub isolated_words: usize,
}

/// Directed multigraph: words are nodes, each phrase an edge `word1 -> word2`
///
/// Grows monotonically; edges are never removed. Adjacency lists keep
/// insertion order so traversal is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PhraseGraph {
    edges: Vec<PhraseRecord>,
    by_id: HashMap<PhraseId, EdgeId>,
    outgoing: HashMap<String, Vec<EdgeId>>,
    incoming: HashMap<String, Vec<EdgeId>>,
}

impl PhraseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records that have already passed the eligibility filter
    pub fn from_records(records: impl IntoIterator<Item = PhraseRecord>) -> Self {
        let mut graph = Self::new();
        for record in records {
            graph.add_edge(record);
        }
        graph
    }

    /// Add a phrase edge
    ///
    /// A phrase whose identity is already present is not added twice; the
    /// existing edge id is returned.
    pub fn add_edge(&mut self, record: PhraseRecord) -> EdgeId {
        if let Some(&existing) = self.by_id.get(record.id()) {
            return existing;
        }

        let id = EdgeId::new(self.edges.len());
        self.outgoing
            .entry(record.word1().to_string())
            .or_default()
            .push(id);
        self.incoming
            .entry(record.word2().to_string())
            .or_default()
            .push(id);
        self.by_id.insert(record.id().clone(), id);
        self.edges.push(record);
        id
    }

    pub fn edge(&self, id: EdgeId) -> &PhraseRecord {
        &self.edges[id.index()]
    }

    pub fn edges(&self) -> &[PhraseRecord] {
        &self.edges
    }

    pub fn contains(&self, id: &PhraseId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Phrases whose first word is `word`, in insertion order
    pub fn outgoing(&self, word: &str) -> Vec<&PhraseRecord> {
        self.out_ids(&normalize_word(word))
            .iter()
            .map(|&id| self.edge(id))
            .collect()
    }

    /// Phrases whose second word is `word`, in insertion order
    pub fn incoming(&self, word: &str) -> Vec<&PhraseRecord> {
        self.in_ids(&normalize_word(word))
            .iter()
            .map(|&id| self.edge(id))
            .collect()
    }

    /// Edge ids leaving an already-normalized word
    pub(crate) fn out_ids(&self, word: &str) -> &[EdgeId] {
        self.outgoing.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    fn in_ids(&self, word: &str) -> &[EdgeId] {
        self.incoming.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, word: &str) -> usize {
        self.out_ids(&normalize_word(word)).len()
    }

    pub fn in_degree(&self, word: &str) -> usize {
        self.in_ids(&normalize_word(word)).len()
    }

    /// Every word touched by an edge, sorted
    pub fn words(&self) -> BTreeSet<&str> {
        self.outgoing
            .keys()
            .chain(self.incoming.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.words().len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let words = self.words();
        let node_count = words.len();
        let edge_count = self.edges.len();

        let dead_end_words = words
            .iter()
            .filter(|w| self.out_ids(w).is_empty())
            .count();

        let isolated_words = words
            .iter()
            .filter(|w| {
                let out_other = self.out_ids(w).iter().any(|&e| self.edge(e).word2() != **w);
                let in_other = self.in_ids(w).iter().any(|&e| self.edge(e).word1() != **w);
                !out_other && !in_other
            })
            .count();

        let avg_out_degree = if node_count == 0 {
            0.0
        } else {
            edge_count as f64 / node_count as f64
        };

        GraphStats {
            node_count,
            edge_count,
            avg_out_degree,
            dead_end_words,
            isolated_words,
        }
    }
}
