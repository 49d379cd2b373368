//! Phrase record: the atomic content unit

use serde::{Deserialize, Serialize};

use super::catalog::{CatalogError, CatalogResult};

/// Normalized phrase identity
///
/// Lowercased, trimmed, with internal whitespace collapsed to single spaces.
/// Two records with equal `PhraseId` are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseId(String);

impl PhraseId {
    /// Normalize arbitrary phrase text into an identity
    pub fn normalize(text: &str) -> Self {
        Self(normalize_text(text))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhraseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PhraseId {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<String> for PhraseId {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

/// Lowercase and collapse whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a single pivot word
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A scored two-word phrase
///
/// Immutable once constructed. `word1`/`word2` are stored normalized; the
/// display form of the phrase is kept as given. Raw input goes through
/// [`RawPhraseRow`](super::RawPhraseRow); there is no direct deserialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseRecord {
    id: PhraseId,
    phrase: String,
    word1: String,
    word2: String,
    /// Familiarity score, higher is more common
    frequency: f64,
    /// Number of equally plausible continuations for `word1` (>= 1)
    ambiguity: u32,
    category: String,
    tone: String,
    tier_label: String,
}

impl PhraseRecord {
    /// Create a record, enforcing the phrase/word invariant
    ///
    /// `phrase` must normalize to exactly `word1 word2` and both words must
    /// be non-empty single tokens.
    pub fn new(
        phrase: impl Into<String>,
        word1: &str,
        word2: &str,
        frequency: f64,
        ambiguity: u32,
    ) -> CatalogResult<Self> {
        let phrase = phrase.into();
        let word1 = normalize_word(word1);
        let word2 = normalize_word(word2);

        if word1.is_empty() || word2.is_empty() {
            return Err(CatalogError::EmptyWord(phrase));
        }
        if word1.contains(char::is_whitespace) || word2.contains(char::is_whitespace) {
            return Err(CatalogError::NotTwoWords(phrase));
        }

        let id = PhraseId::normalize(&phrase);
        if id.as_str() != format!("{} {}", word1, word2) {
            return Err(CatalogError::WordMismatch {
                phrase,
                word1,
                word2,
            });
        }
        if ambiguity == 0 {
            return Err(CatalogError::InvalidAmbiguity(phrase));
        }
        if !frequency.is_finite() {
            return Err(CatalogError::InvalidFrequency(phrase));
        }

        Ok(Self {
            id,
            phrase: phrase.trim().to_string(),
            word1,
            word2,
            frequency,
            ambiguity,
            category: "general".to_string(),
            tone: "neutral".to_string(),
            tier_label: String::new(),
        })
    }

    /// Build a record from its phrase text alone, splitting on whitespace
    pub fn from_phrase(phrase: &str, frequency: f64, ambiguity: u32) -> CatalogResult<Self> {
        let mut words = phrase.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some(w1), Some(w2), None) => Self::new(phrase, w1, w2, frequency, ambiguity),
            _ => Err(CatalogError::NotTwoWords(phrase.to_string())),
        }
    }

    /// Set the category tag
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = normalize_text(&category.into());
        self
    }

    /// Set the tone tag
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = normalize_text(&tone.into());
        self
    }

    /// Set the difficulty-tier label
    pub fn with_tier_label(mut self, label: impl Into<String>) -> Self {
        self.tier_label = label.into();
        self
    }

    pub fn id(&self) -> &PhraseId {
        &self.id
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn word1(&self) -> &str {
        &self.word1
    }

    pub fn word2(&self) -> &str {
        &self.word2
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn ambiguity(&self) -> u32 {
        self.ambiguity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }

    pub fn tier_label(&self) -> &str {
        &self.tier_label
    }

    /// Search ranking score: `frequency - ambiguity * weight`
    pub fn quality(&self, ambiguity_weight: f64) -> f64 {
        self.frequency - self.ambiguity as f64 * ambiguity_weight
    }
}
