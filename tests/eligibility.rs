//! Filter behaviour across tiers on the fixture catalog

mod common;

use common::{fixture_catalog, fixture_frequencies};
use phrasechain::{EligibilityFilter, Lexicon, PhraseGraph, PhraseId, RejectionReason, Tier};
use std::collections::HashSet;

fn accepted(tier: Tier) -> HashSet<PhraseId> {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let filter = EligibilityFilter::new(tier.config(), &lexicon, &frequencies);
    let catalog = fixture_catalog();
    let (records, _) = filter.partition(catalog.records());
    records.into_iter().map(|r| r.id().clone()).collect()
}

#[test]
fn stricter_tiers_accept_subsets() {
    for stricter in Tier::ALL {
        for looser in Tier::ALL {
            if !stricter.config().is_stricter_or_equal(&looser.config()) {
                continue;
            }
            let a = accepted(stricter);
            let b = accepted(looser);
            assert!(a.is_subset(&b), "{} accepts phrases {} rejects", stricter, looser);
        }
    }
}

#[test]
fn acceptance_grows_as_tiers_relax() {
    let counts: Vec<usize> = Tier::ALL.iter().map(|&t| accepted(t).len()).collect();
    assert_eq!(counts, vec![81, 83, 85]);
}

#[test]
fn rejection_histogram_for_tier_one() {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let filter = EligibilityFilter::new(Tier::One.config(), &lexicon, &frequencies);
    let catalog = fixture_catalog();
    let (_, stats) = filter.partition(catalog.records());

    assert_eq!(stats.input, 88);
    assert_eq!(stats.accepted, 81);
    assert_eq!(stats.rejected(), 7);
    assert_eq!(stats.rejected_by[&RejectionReason::Blocklisted], 1);
    assert_eq!(stats.rejected_by[&RejectionReason::AmbiguityExceeded], 2);
    assert_eq!(stats.rejected_by[&RejectionReason::FrequencyInsufficient], 2);
    assert_eq!(stats.rejected_by[&RejectionReason::CategoryMismatch], 1);
    assert_eq!(stats.rejected_by[&RejectionReason::ArchaicCombination], 1);
}

#[test]
fn graph_contains_exactly_the_accepted_phrases() {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let catalog = fixture_catalog();

    for tier in Tier::ALL {
        let filter = EligibilityFilter::new(tier.config(), &lexicon, &frequencies);
        let (records, _) = filter.partition(catalog.records());
        let graph = PhraseGraph::from_records(records);

        for record in catalog.records() {
            let passed = filter.accepts(record);
            assert_eq!(graph.contains(record.id()), passed, "{} under {}", record.phrase(), tier);
            if passed {
                assert!(graph
                    .outgoing(record.word1())
                    .iter()
                    .any(|e| e.word2() == record.word2()));
            }
        }
    }
}
