//! Cross-chain phrase reuse bookkeeping

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::phrase::PhraseId;

/// Reuse gap rules between levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReusePolicy {
    /// Levels `1..=exclusive_window` never share a phrase with each other
    pub exclusive_window: usize,
    /// Minimum level distance before a phrase may reappear
    pub min_gap: usize,
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self {
            exclusive_window: 20,
            min_gap: 10,
        }
    }
}

impl ReusePolicy {
    /// Whether a phrase used at `used` may also appear at level `level`
    ///
    /// Symmetric in its arguments: runs may generate levels out of order.
    pub fn permits(&self, used: usize, level: usize) -> bool {
        if used == level {
            return false;
        }
        let (earlier, later) = if used < level { (used, level) } else { (level, used) };
        if later <= self.exclusive_window {
            return false;
        }
        later - earlier >= self.min_gap
    }
}

/// Every level index at which each phrase was used
///
/// Updated only when a level is accepted, never during exploratory search.
/// A candidate level is checked against all recorded uses, so levels
/// generated below an existing one are held to the same window and gap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReuseLedger {
    #[serde(default)]
    policy: ReusePolicy,
    used_at: BTreeMap<PhraseId, BTreeSet<usize>>,
}

impl ReuseLedger {
    pub fn new(policy: ReusePolicy) -> Self {
        Self {
            policy,
            used_at: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> &ReusePolicy {
        &self.policy
    }

    /// Replace the policy, keeping recorded usage
    pub fn set_policy(&mut self, policy: ReusePolicy) {
        self.policy = policy;
    }

    pub fn can_use(&self, phrase: &PhraseId, level: usize) -> bool {
        self.conflict(phrase, level).is_none()
    }

    /// The nearest recorded use that forbids placing `phrase` at `level`
    pub fn conflict(&self, phrase: &PhraseId, level: usize) -> Option<usize> {
        let levels = self.used_at.get(phrase)?;
        levels
            .iter()
            .copied()
            .filter(|&used| !self.policy.permits(used, level))
            .min_by_key(|&used| used.abs_diff(level))
    }

    pub fn mark_used(&mut self, phrase: &PhraseId, level: usize) {
        self.used_at.entry(phrase.clone()).or_default().insert(level);
    }

    pub fn last_used(&self, phrase: &PhraseId) -> Option<usize> {
        self.used_at.get(phrase).and_then(|levels| levels.last().copied())
    }

    /// Recorded levels for `phrase`, ascending
    pub fn levels_used(&self, phrase: &PhraseId) -> Vec<usize> {
        self.used_at
            .get(phrase)
            .map(|levels| levels.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.used_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_at.is_empty()
    }
}
