//! End-to-end generation runs over the fixture catalog

mod common;

use common::{
    fixture_catalog, fixture_frequencies, legacy_catalog_json, levels_by_phrase, placements,
    small_config,
};
use phrasechain::{
    Catalog, ChainValidator, JsonFileStore, LevelDocument, LevelStore, Lexicon, PhraseId,
    Pipeline, ReuseLedger, RunOutcome, StorageError, Tier,
};
use std::collections::HashSet;

fn run_and_commit(
    store: &JsonFileStore,
    levels: usize,
    length: usize,
    first_level: usize,
) -> LevelDocument {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let mut ledger = store.load_ledger().unwrap();

    let pipeline = Pipeline::new(small_config(levels, length, first_level), &lexicon, &frequencies);
    let report = pipeline.run(&fixture_catalog(), &mut ledger);
    assert_eq!(report.outcome, RunOutcome::Committed, "{:?}", report.validation);

    store.commit(&report, &ledger).unwrap()
}

#[test]
fn committed_chains_are_linked_and_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"));
    let document = run_and_commit(&store, 4, 6, 1);

    assert_eq!(document.summary.levels_generated, 4);
    assert_eq!(document.summary.total_phrases_used, 24);
    assert_eq!(document.config.tier, Tier::One);

    let mut across: HashSet<String> = HashSet::new();
    for entry in &document.levels {
        assert_eq!(entry.phrases.len(), 6);
        assert_eq!(entry.phrases[0].word1, entry.start_word);
        for pair in entry.phrases.windows(2) {
            assert_eq!(pair[0].word2.to_lowercase(), pair[1].word1.to_lowercase());
        }

        let within: HashSet<&str> = entry.phrases.iter().map(|p| p.phrase.as_str()).collect();
        assert_eq!(within.len(), entry.phrases.len(), "duplicate in level {}", entry.level);
        for p in &entry.phrases {
            assert!(across.insert(p.phrase.clone()), "{} reused", p.phrase);
        }
    }

    let levels: Vec<usize> = document.levels.iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 4]);
}

#[test]
fn committed_document_reloads_and_revalidates() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"));
    let written = run_and_commit(&store, 3, 5, 1);

    let loaded = store.load_levels().unwrap().expect("document written");
    assert_eq!(loaded, written);

    let chains = loaded.chains().unwrap();
    let report = ChainValidator::new(5)
        .with_frequency_floor(Tier::One.config().min_frequency)
        .validate(
            chains.iter().map(|(level, chain)| (*level, chain.as_slice())),
            &loaded.frequency_table().unwrap(),
        );
    assert!(report.is_valid(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[test]
fn rejected_phrases_never_reach_output() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"));
    let document = run_and_commit(&store, 5, 8, 1);

    let tier_one_rejects = ["hot shot", "mill horse", "w0 x1", "w1 x2", "w2 x3", "w3 x4", "w4 x5"];
    for (phrase, _) in placements(&document) {
        assert!(!tier_one_rejects.contains(&phrase.as_str()), "{} placed", phrase);
    }
}

#[test]
fn reuse_gap_holds_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"))
        .with_ledger(dir.path().join("ledger.json"));

    let mut documents = Vec::new();
    for first_level in [1, 11, 22, 30] {
        documents.push(run_and_commit(&store, 3, 5, first_level));
    }

    let ledger: ReuseLedger =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ledger.json")).unwrap())
            .unwrap();
    assert!(!ledger.is_empty());

    for (phrase, levels) in levels_by_phrase(&documents) {
        for pair in levels.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            assert!(j > 20, "'{}' reused inside the exclusive window ({} and {})", phrase, i, j);
            assert!(j - i >= 10, "'{}' reused after only {} levels", phrase, j - i);
        }
    }
}

#[test]
fn out_of_order_runs_respect_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"))
        .with_ledger(dir.path().join("ledger.json"));

    let mut documents = Vec::new();
    for first_level in [1, 40, 10] {
        documents.push(run_and_commit(&store, 3, 5, first_level));
    }

    let ledger = store.load_ledger().unwrap();
    for (phrase, levels) in levels_by_phrase(&documents) {
        let id = PhraseId::normalize(&phrase);
        assert_eq!(ledger.levels_used(&id), levels, "ledger lost a use of '{}'", phrase);
        for pair in levels.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            assert!(j > 20, "'{}' reused inside the exclusive window ({} and {})", phrase, i, j);
            assert!(j - i >= 10, "'{}' reused after only {} levels", phrase, j - i);
        }
    }
}

#[test]
fn same_seed_reproduces_levels() {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let catalog = fixture_catalog();

    let phrases = |seed: u64| {
        let mut config = small_config(3, 6, 1);
        config.seed = seed;
        let mut ledger = ReuseLedger::default();
        let report = Pipeline::new(config, &lexicon, &frequencies).run(&catalog, &mut ledger);
        report
            .levels
            .iter()
            .map(|c| {
                c.result
                    .chain
                    .iter()
                    .map(|r| r.phrase().to_string())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(phrases(7), phrases(7));
}

#[test]
fn validation_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let levels_path = dir.path().join("levels.json");
    let ledger_path = dir.path().join("ledger.json");
    std::fs::write(&levels_path, b"{\"previous\": true}\n").unwrap();
    let before = std::fs::read(&levels_path).unwrap();

    let store = JsonFileStore::new(&levels_path).with_ledger(&ledger_path);
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let mut config = small_config(2, 5, 1);
    config.validation.min_phrases = Some(12);

    let mut ledger = store.load_ledger().unwrap();
    let report = Pipeline::new(config, &lexicon, &frequencies).run(&fixture_catalog(), &mut ledger);

    assert_eq!(report.outcome, RunOutcome::ValidationFailed);
    assert!(!report.levels.is_empty());
    assert!(ledger.is_empty());

    let err = store.commit(&report, &ledger).unwrap_err();
    assert!(matches!(err, StorageError::NotCommittable(RunOutcome::ValidationFailed)));
    assert_eq!(std::fs::read(&levels_path).unwrap(), before);
    assert!(!ledger_path.exists());
}

#[test]
fn failed_ledger_write_leaves_levels_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let levels_path = dir.path().join("levels.json");
    let ledger_path = dir.path().join("ledger.json");
    std::fs::write(&levels_path, b"{\"previous\": true}\n").unwrap();
    // a directory where the ledger file should go cannot be replaced
    std::fs::create_dir(&ledger_path).unwrap();
    let before = std::fs::read(&levels_path).unwrap();

    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let mut ledger = ReuseLedger::default();
    let report = Pipeline::new(small_config(2, 5, 1), &lexicon, &frequencies)
        .run(&fixture_catalog(), &mut ledger);
    assert_eq!(report.outcome, RunOutcome::Committed);

    let store = JsonFileStore::new(&levels_path).with_ledger(&ledger_path);
    let err = store.commit(&report, &ledger).unwrap_err();
    assert!(matches!(err, StorageError::Persist { .. }), "{err}");
    assert_eq!(std::fs::read(&levels_path).unwrap(), before);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 2, "temp files left behind: {:?}", leftovers);
}

#[test]
fn sparse_catalog_aborts_before_search() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("levels.json"));
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let catalog = Catalog::from_records(common::edge_case_records());

    let mut ledger = ReuseLedger::default();
    let report = Pipeline::new(small_config(3, 5, 1), &lexicon, &frequencies).run(&catalog, &mut ledger);

    assert_eq!(report.outcome, RunOutcome::Aborted);
    assert!(report.sufficiency.reasons.len() >= 3);
    assert_eq!(report.search.attempts, 0);
    assert!(report.levels.is_empty());
    assert!(matches!(
        store.commit(&report, &ledger),
        Err(StorageError::NotCommittable(RunOutcome::Aborted))
    ));
    assert!(!dir.path().join("levels.json").exists());
}

#[test]
fn legacy_json_catalog_drives_a_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("phrases.json");
    std::fs::write(&catalog_path, legacy_catalog_json()).unwrap();

    let catalog = Catalog::load_json(&catalog_path).unwrap();
    assert_eq!(catalog.len(), fixture_catalog().len());

    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let mut ledger = ReuseLedger::default();
    let report = Pipeline::new(small_config(2, 4, 1), &lexicon, &frequencies).run(&catalog, &mut ledger);

    assert_eq!(report.outcome, RunOutcome::Committed);
    assert_eq!(report.filter.input, catalog.len());
    assert_eq!(report.filter.accepted, 81);
}

#[test]
fn run_report_serializes_with_outcome() {
    let lexicon = Lexicon::default();
    let frequencies = fixture_frequencies();
    let mut ledger = ReuseLedger::default();
    let report = Pipeline::new(small_config(1, 3, 1), &lexicon, &frequencies)
        .run(&fixture_catalog(), &mut ledger);

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "committed");
    assert_eq!(json["tier"], 1);
    assert_eq!(json["filter"]["rejected_by"]["blocklisted"], 1);
    assert!(json["validation"]["errors"].as_array().unwrap().is_empty());
}
