//! Curated word lists injected into the eligibility filter

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{ConfigError, ConfigResult};
use crate::phrase::{normalize_text, normalize_word, PhraseId};

const BLOCKLIST: &[&str] = &[
    // archaic or technical
    "pack horse", "pack mule", "pack animal", "pack saddle",
    "tone arm", "tone dial", "tone wood",
    "game bird", "game fish", "game hen",
    "draft horse", "draft animal", "draft beer",
    "gun carriage", "gun metal", "gun boat",
    "horse blanket", "horse collar", "horse drawn",
    "seed drill", "seed bed", "seed pod",
    "milk wagon", "coal scuttle", "ink well",
    "blotting paper", "powder horn", "flint lock",
    "match lock", "wheel lock", "wheel wright",
    "plough horse", "plow horse", "dray horse",
    "cart horse", "shire horse", "harness horse",
    "beast burden", "pack beast",
    // double meanings
    "hot shot", "big shot", "moon shine",
    "bar fly", "bar tender", "pool shark",
    "ball buster", "heart break", "cold shoulder",
    "dead beat", "dead end", "dead weight",
    "low life", "low blow", "low ball",
    "high ball", "high horse", "high brow",
    // regional
    "lorry driver", "tram stop", "car park",
    "lift shaft", "boot sale", "bonnet catch",
    // abstract
    "time warp", "mind set", "mind game",
    "brain storm", "brain wave", "brain drain",
    "heart felt", "soul mate", "soul food",
    "gut feeling", "gut instinct", "gut punch",
    // violent
    "gun shot", "knife edge", "blood bath",
    "death trap", "war zone", "fight club",
    "punch line", "hit man", "cut throat",
];

const ALLOWLIST: &[&str] = &[
    // food
    "hot dog", "ice cream", "apple pie", "french fries",
    "peanut butter", "orange juice", "birthday cake",
    "pizza box", "lunch box", "candy bar", "chocolate chip",
    "milk shake", "tea cup", "coffee cup", "water bottle",
    // transport
    "fire truck", "school bus", "bus stop", "stop sign",
    "car seat", "car wash", "seat belt", "air plane",
    "train station", "gas station", "traffic light",
    "parking lot", "race car", "taxi cab", "fire engine",
    // household
    "front door", "back door", "bed room", "bath room",
    "living room", "dining room", "bath tub", "door bell",
    "door mat", "alarm clock", "book shelf", "night stand",
    "coffee table", "dish washer", "light bulb", "window sill",
    // school and play
    "high school", "school yard", "class room", "lunch room",
    "home work", "note book", "text book", "back pack",
    "play ground", "play time", "game day", "card game",
    "board game", "ball game", "video game",
    // nature
    "rain coat", "sun shine", "day light", "tree house",
    "bird house", "dog house", "cat food", "dog food",
    "flower pot", "grass land", "sand box", "beach ball",
];

const SUSPICIOUS_WORD1: &[&str] = &[
    "pack", "tone", "game", "draft", "gun", "wheel",
    "mill", "forge", "kiln", "anvil", "loom",
    "plow", "plough", "harness", "yoke", "cart",
    "barrel", "cask", "keg", "vat", "trough",
];

const ARCHAIC_WORD2: &[&str] = &[
    "horse", "mule", "oxen", "wagon", "carriage",
    "wright", "monger", "scuttle", "yoke",
];

const SAFE_CATEGORIES: &[&str] = &[
    "food", "drink", "household", "home", "transport", "outdoor",
    "school", "nature", "animals", "clothing", "toys", "sports", "everyday",
];

/// Static lookup tables consulted by the filter
///
/// Phrases are stored as normalized identities and words lowercased, so
/// lookups are case and whitespace insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    blocklist: BTreeSet<PhraseId>,
    allowlist: BTreeSet<PhraseId>,
    suspicious_word1: BTreeSet<String>,
    archaic_word2: BTreeSet<String>,
    safe_categories: BTreeSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::empty()
            .with_blocked(BLOCKLIST.iter().copied())
            .with_allowed(ALLOWLIST.iter().copied())
            .with_suspicious(SUSPICIOUS_WORD1.iter().copied())
            .with_archaic(ARCHAIC_WORD2.iter().copied())
            .with_safe_categories(SAFE_CATEGORIES.iter().copied())
    }
}

impl Lexicon {
    /// A lexicon with every list empty
    pub fn empty() -> Self {
        Self {
            blocklist: BTreeSet::new(),
            allowlist: BTreeSet::new(),
            suspicious_word1: BTreeSet::new(),
            archaic_word2: BTreeSet::new(),
            safe_categories: BTreeSet::new(),
        }
    }

    /// Load a lexicon from a YAML file with the same field names
    pub fn load_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let raw: Self = serde_yaml::from_str(&text)?;
        // Re-normalize: hand-written files may use mixed case
        let lexicon = Self::empty()
            .with_blocked(raw.blocklist.iter().map(|p| p.as_str()))
            .with_allowed(raw.allowlist.iter().map(|p| p.as_str()))
            .with_suspicious(raw.suspicious_word1.iter().map(String::as_str))
            .with_archaic(raw.archaic_word2.iter().map(String::as_str))
            .with_safe_categories(raw.safe_categories.iter().map(String::as_str));
        if lexicon.safe_categories.is_empty() {
            return Err(ConfigError::Invalid(
                "lexicon must list at least one safe category".into(),
            ));
        }
        Ok(lexicon)
    }

    pub fn with_blocked<'a>(mut self, phrases: impl IntoIterator<Item = &'a str>) -> Self {
        self.blocklist.extend(phrases.into_iter().map(PhraseId::normalize));
        self
    }

    pub fn with_allowed<'a>(mut self, phrases: impl IntoIterator<Item = &'a str>) -> Self {
        self.allowlist.extend(phrases.into_iter().map(PhraseId::normalize));
        self
    }

    pub fn with_suspicious<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.suspicious_word1.extend(words.into_iter().map(normalize_word));
        self
    }

    pub fn with_archaic<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.archaic_word2.extend(words.into_iter().map(normalize_word));
        self
    }

    pub fn with_safe_categories<'a>(mut self, categories: impl IntoIterator<Item = &'a str>) -> Self {
        self.safe_categories
            .extend(categories.into_iter().map(normalize_text));
        self
    }

    pub fn is_blocked(&self, id: &PhraseId) -> bool {
        self.blocklist.contains(id)
    }

    pub fn is_allowed(&self, id: &PhraseId) -> bool {
        self.allowlist.contains(id)
    }

    pub fn is_suspicious(&self, word1: &str) -> bool {
        self.suspicious_word1.contains(word1)
    }

    pub fn is_archaic(&self, word2: &str) -> bool {
        self.archaic_word2.contains(word2)
    }

    pub fn is_safe_category(&self, category: &str) -> bool {
        self.safe_categories.contains(category)
    }
}
