//! Shared fixtures for phrasechain integration tests
//!
//! The fixture catalog is a ring of 40 words where every word links to the
//! next word and to the word three places ahead, plus a handful of rows
//! that exercise each filter rule.

#![allow(dead_code)]

use phrasechain::{
    Catalog, FrequencyTable, GenerationConfig, LevelDocument, PhraseRecord, Tier,
};
use std::collections::HashMap;

pub const RING_SIZE: usize = 40;

fn record(phrase: &str, frequency: f64, ambiguity: u32, category: &str) -> PhraseRecord {
    PhraseRecord::from_phrase(phrase, frequency, ambiguity)
        .expect("fixture phrase")
        .with_category(category)
}

/// Ring edges `wi -> w(i+1)` and `wi -> w(i+3)`, all Tier 1 material
pub fn ring_records() -> Vec<PhraseRecord> {
    let mut records = Vec::new();
    for i in 0..RING_SIZE {
        for step in [1, 3] {
            let j = (i + step) % RING_SIZE;
            records.push(record(&format!("w{} w{}", i, j), 5.0, 1, "food"));
        }
    }
    records
}

/// Rows that only some tiers accept, or none do
pub fn edge_case_records() -> Vec<PhraseRecord> {
    vec![
        // blocklisted even though it would otherwise pass
        record("hot shot", 5.0, 1, "food"),
        // allowlisted despite high ambiguity
        record("ice cream", 5.0, 5, "food"),
        // ambiguity 3: tier 2 and up
        record("w0 x1", 5.0, 3, "food"),
        // frequency 3: tier 2 and up
        record("w1 x2", 3.0, 1, "food"),
        // unattested: tier 3 only
        record("w2 x3", 5.0, 1, "food"),
        // unsafe category: tier 3 only
        record("w3 x4", 5.0, 1, "abstract"),
        // archaic combination: never
        record("mill horse", 5.0, 1, "household"),
        // ambiguity above every cap: never
        record("w4 x5", 5.0, 5, "food"),
    ]
}

pub fn fixture_catalog() -> Catalog {
    let mut records = ring_records();
    records.extend(edge_case_records());
    Catalog::from_records(records)
}

/// Frequency scores for the fixture catalog; "w2 x3" is left unattested
pub fn fixture_frequencies() -> FrequencyTable {
    let catalog = fixture_catalog();
    FrequencyTable::from_scores(
        catalog
            .records()
            .iter()
            .filter(|r| r.phrase() != "w2 x3")
            .map(|r| (r.phrase(), r.frequency().round() as u8)),
    )
}

/// Small run that the fixture graph comfortably supports
pub fn small_config(levels: usize, chain_length: usize, first_level: usize) -> GenerationConfig {
    GenerationConfig {
        levels,
        chain_length,
        first_level,
        tier: Some(Tier::One),
        ..GenerationConfig::default()
    }
}

/// Fixture catalog as a JSON array using the legacy column names
pub fn legacy_catalog_json() -> String {
    catalog_json(fixture_catalog().records())
}

/// Records as a JSON catalog array using the legacy column names
pub fn catalog_json(records: &[PhraseRecord]) -> String {
    let rows: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "phrase": r.phrase(),
                "PFS": r.frequency(),
                "CES_estimate": r.ambiguity(),
                "category_tag": r.category(),
                "tone_tag": "neutral",
            })
        })
        .collect();
    serde_json::to_string(&rows).expect("fixture json")
}

/// Every `(phrase, level)` placement in a document
pub fn placements(document: &LevelDocument) -> Vec<(String, usize)> {
    document
        .levels
        .iter()
        .flat_map(|entry| {
            entry
                .phrases
                .iter()
                .map(move |p| (p.phrase.to_lowercase(), entry.level))
        })
        .collect()
}

/// Levels at which each phrase appears, across several documents
pub fn levels_by_phrase(documents: &[LevelDocument]) -> HashMap<String, Vec<usize>> {
    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    for document in documents {
        for (phrase, level) in placements(document) {
            map.entry(phrase).or_default().push(level);
        }
    }
    for levels in map.values_mut() {
        levels.sort_unstable();
    }
    map
}
