//! Per-tier admissibility gate over phrase records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::frequency::FrequencyTable;
use super::lexicon::Lexicon;
use super::tier::TierConfig;
use crate::phrase::PhraseRecord;

/// Machine-readable rejection category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    Blocklisted,
    AmbiguityExceeded,
    FrequencyInsufficient,
    CategoryMismatch,
    ArchaicCombination,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::Blocklisted => "blocklisted",
            RejectionReason::AmbiguityExceeded => "ambiguity-exceeded",
            RejectionReason::FrequencyInsufficient => "frequency-insufficient",
            RejectionReason::CategoryMismatch => "category-mismatch",
            RejectionReason::ArchaicCombination => "archaic-combination",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one record under one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub passed: bool,
    /// Human-readable explanation
    pub reason: String,
    /// Set exactly when `passed` is false
    pub rejection: Option<RejectionReason>,
}

impl Decision {
    fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
            rejection: None,
        }
    }

    fn fail(rejection: RejectionReason, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
            rejection: Some(rejection),
        }
    }
}

/// Filter-stage counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub input: usize,
    pub accepted: usize,
    pub rejected_by: BTreeMap<RejectionReason, usize>,
}

impl FilterStats {
    pub fn rejected(&self) -> usize {
        self.rejected_by.values().sum()
    }

    fn record(&mut self, decision: &Decision) {
        self.input += 1;
        match decision.rejection {
            None => self.accepted += 1,
            Some(reason) => *self.rejected_by.entry(reason).or_default() += 1,
        }
    }
}

/// Pure admissibility predicate for a tier
///
/// Checks run in a fixed order and the first decisive check wins:
/// blocklist, allowlist, ambiguity, frequency, category, archaic words.
/// A phrase on both lists is rejected.
#[derive(Debug, Clone)]
pub struct EligibilityFilter<'a> {
    tier: TierConfig,
    lexicon: &'a Lexicon,
    frequencies: &'a FrequencyTable,
}

impl<'a> EligibilityFilter<'a> {
    pub fn new(tier: TierConfig, lexicon: &'a Lexicon, frequencies: &'a FrequencyTable) -> Self {
        Self {
            tier,
            lexicon,
            frequencies,
        }
    }

    pub fn tier(&self) -> &TierConfig {
        &self.tier
    }

    pub fn evaluate(&self, record: &PhraseRecord) -> Decision {
        let id = record.id();

        if self.lexicon.is_blocked(id) {
            return Decision::fail(RejectionReason::Blocklisted, "blocklisted");
        }
        if self.lexicon.is_allowed(id) {
            return Decision::pass("allowlisted");
        }

        if record.ambiguity() > self.tier.entropy_cap {
            return Decision::fail(
                RejectionReason::AmbiguityExceeded,
                format!(
                    "ambiguity {} exceeds cap {}",
                    record.ambiguity(),
                    self.tier.entropy_cap
                ),
            );
        }

        let frequency = self.frequencies.get(id);
        match frequency {
            None if self.tier.min_frequency > 0 => {
                return Decision::fail(RejectionReason::FrequencyInsufficient, "not attested");
            }
            Some(score) if score < self.tier.min_frequency => {
                return Decision::fail(
                    RejectionReason::FrequencyInsufficient,
                    format!(
                        "frequency {} below floor {}",
                        score, self.tier.min_frequency
                    ),
                );
            }
            _ => {}
        }

        if self.tier.enforce_categories && !self.lexicon.is_safe_category(record.category()) {
            return Decision::fail(
                RejectionReason::CategoryMismatch,
                format!("category '{}' not allowed", record.category()),
            );
        }

        let (word1, word2) = (record.word1(), record.word2());
        if self.lexicon.is_archaic(word2) {
            let reason = if self.lexicon.is_suspicious(word1) {
                format!("'{}' + '{}' is an archaic combination", word1, word2)
            } else {
                format!("archaic second word '{}'", word2)
            };
            return Decision::fail(RejectionReason::ArchaicCombination, reason);
        }

        match frequency {
            Some(score) => Decision::pass(format!("passed (frequency {})", score)),
            None => Decision::pass("passed (frequency unattested, no floor)"),
        }
    }

    /// Convenience wrapper over [`evaluate`](Self::evaluate)
    pub fn accepts(&self, record: &PhraseRecord) -> bool {
        self.evaluate(record).passed
    }

    /// Split records into the admissible subset (input order kept) and stats
    pub fn partition<'r>(
        &self,
        records: impl IntoIterator<Item = &'r PhraseRecord>,
    ) -> (Vec<PhraseRecord>, FilterStats) {
        let mut stats = FilterStats::default();
        let mut accepted = Vec::new();

        for record in records {
            let decision = self.evaluate(record);
            stats.record(&decision);
            if decision.passed {
                accepted.push(record.clone());
            } else {
                tracing::trace!(phrase = record.phrase(), reason = %decision.reason, "rejected");
            }
        }

        tracing::info!(
            input = stats.input,
            accepted = stats.accepted,
            rejected = stats.rejected(),
            "eligibility filter applied"
        );
        (accepted, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::Tier;

    fn record(phrase: &str, ambiguity: u32, category: &str) -> PhraseRecord {
        PhraseRecord::from_phrase(phrase, 4.0, ambiguity)
            .unwrap()
            .with_category(category)
    }

    fn table(entries: &[(&str, u8)]) -> FrequencyTable {
        FrequencyTable::from_scores(entries.iter().copied())
    }

    #[test]
    fn blocklist_wins_over_allowlist() {
        let lexicon = Lexicon::empty()
            .with_blocked(["hot dog"])
            .with_allowed(["hot dog"]);
        let freq = table(&[("hot dog", 5)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let decision = filter.evaluate(&record("hot dog", 1, "food"));
        assert!(!decision.passed);
        assert_eq!(decision.rejection, Some(RejectionReason::Blocklisted));
        assert_eq!(decision.reason, "blocklisted");
    }

    #[test]
    fn allowlist_bypasses_downstream_checks() {
        let lexicon = Lexicon::empty().with_allowed(["pack horse"]).with_archaic(["horse"]);
        // No frequency entry, ambiguity over cap, unsafe category
        let freq = FrequencyTable::new();
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let decision = filter.evaluate(&record("pack horse", 9, "abstract"));
        assert!(decision.passed);
        assert_eq!(decision.reason, "allowlisted");
    }

    #[test]
    fn tier_one_rejects_ambiguity_three() {
        let lexicon = Lexicon::default();
        let freq = table(&[("red ball", 5)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let decision = filter.evaluate(&record("red ball", 3, "toys"));
        assert!(!decision.passed);
        assert_eq!(decision.rejection, Some(RejectionReason::AmbiguityExceeded));
        assert_eq!(
            decision.rejection.map(RejectionReason::as_str),
            Some("ambiguity-exceeded")
        );
    }

    #[test]
    fn unattested_phrase_fails_when_floor_is_set() {
        let lexicon = Lexicon::default();
        let freq = FrequencyTable::new();

        for tier in [Tier::One, Tier::Two] {
            let filter = EligibilityFilter::new(tier.config(), &lexicon, &freq);
            let decision = filter.evaluate(&record("red ball", 1, "toys"));
            assert_eq!(decision.rejection, Some(RejectionReason::FrequencyInsufficient));
            assert_eq!(decision.reason, "not attested");
        }

        let filter = EligibilityFilter::new(Tier::Three.config(), &lexicon, &freq);
        assert!(filter.accepts(&record("red ball", 1, "toys")));
    }

    #[test]
    fn frequency_below_floor_fails() {
        let lexicon = Lexicon::default();
        let freq = table(&[("red ball", 3)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let decision = filter.evaluate(&record("red ball", 1, "toys"));
        assert_eq!(decision.rejection, Some(RejectionReason::FrequencyInsufficient));

        let filter = EligibilityFilter::new(Tier::Two.config(), &lexicon, &freq);
        assert!(filter.accepts(&record("red ball", 1, "toys")));
    }

    #[test]
    fn category_enforced_only_when_tier_requires() {
        let lexicon = Lexicon::default();
        let freq = table(&[("red tape", 5)]);

        let strict = EligibilityFilter::new(Tier::Two.config(), &lexicon, &freq);
        assert_eq!(
            strict.evaluate(&record("red tape", 1, "bureaucracy")).rejection,
            Some(RejectionReason::CategoryMismatch)
        );

        let relaxed = EligibilityFilter::new(Tier::Three.config(), &lexicon, &freq);
        assert!(relaxed.accepts(&record("red tape", 1, "bureaucracy")));
    }

    #[test]
    fn archaic_words_are_rejected() {
        let lexicon = Lexicon::empty()
            .with_suspicious(["pack"])
            .with_archaic(["mule"])
            .with_safe_categories(["animals"]);
        let freq = table(&[("pack mule", 5), ("grey mule", 5), ("pack ice", 5)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let combo = filter.evaluate(&record("pack mule", 1, "animals"));
        assert_eq!(combo.rejection, Some(RejectionReason::ArchaicCombination));
        assert!(combo.reason.contains("combination"));

        let lone = filter.evaluate(&record("grey mule", 1, "animals"));
        assert_eq!(lone.rejection, Some(RejectionReason::ArchaicCombination));

        // A suspicious first word alone is fine
        assert!(filter.accepts(&record("pack ice", 1, "animals")));
    }

    #[test]
    fn pass_reason_reports_frequency() {
        let lexicon = Lexicon::default();
        let freq = table(&[("fire pit", 4)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let decision = filter.evaluate(&record("fire pit", 1, "outdoor"));
        assert!(decision.passed);
        assert!(decision.reason.contains("frequency 4"));
    }

    #[test]
    fn known_early_game_cases() {
        let lexicon = Lexicon::default();
        let freq = table(&[
            ("pack horse", 5),
            ("tone arm", 5),
            ("game bird", 5),
            ("draft horse", 5),
            ("hot dog", 5),
            ("fire truck", 5),
            ("ice cream", 5),
            ("school bus", 5),
        ]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        for phrase in ["pack horse", "tone arm", "game bird", "draft horse"] {
            assert!(!filter.accepts(&record(phrase, 1, "animals")), "{phrase} should fail");
        }
        for phrase in ["hot dog", "fire truck", "ice cream", "school bus"] {
            assert!(filter.accepts(&record(phrase, 1, "food")), "{phrase} should pass");
        }
    }

    #[test]
    fn partition_counts_reasons() {
        let lexicon = Lexicon::default();
        let freq = table(&[("red ball", 5), ("blue ball", 2)]);
        let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &freq);

        let records = vec![
            record("red ball", 1, "toys"),
            record("blue ball", 1, "toys"),
            record("green ball", 1, "toys"),
            record("pack horse", 1, "animals"),
            record("big ball", 4, "toys"),
        ];
        let (accepted, stats) = filter.partition(&records);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].phrase(), "red ball");
        assert_eq!(stats.input, 5);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected(), 4);
        assert_eq!(stats.rejected_by[&RejectionReason::FrequencyInsufficient], 2);
        assert_eq!(stats.rejected_by[&RejectionReason::Blocklisted], 1);
        assert_eq!(stats.rejected_by[&RejectionReason::AmbiguityExceeded], 1);
    }
}
