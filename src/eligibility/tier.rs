//! Difficulty tiers and their gating presets

use serde::{Deserialize, Serialize};

/// Gating parameters for one difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Highest admissible ambiguity score
    pub entropy_cap: u32,
    /// Lowest admissible frequency score (0 disables the floor)
    pub min_frequency: u8,
    /// Restrict to the lexicon's safe categories
    pub enforce_categories: bool,
}

impl TierConfig {
    pub const TIER_1: Self = Self {
        entropy_cap: 2,
        min_frequency: 4,
        enforce_categories: true,
    };

    pub const TIER_2: Self = Self {
        entropy_cap: 3,
        min_frequency: 3,
        enforce_categories: true,
    };

    pub const TIER_3: Self = Self {
        entropy_cap: 4,
        min_frequency: 0,
        enforce_categories: false,
    };

    /// True when every phrase admissible under `self` is admissible under `other`
    pub fn is_stricter_or_equal(&self, other: &TierConfig) -> bool {
        self.entropy_cap <= other.entropy_cap
            && self.min_frequency >= other.min_frequency
            && (self.enforce_categories || !other.enforce_categories)
    }
}

/// Named difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    /// Preset gating parameters
    pub fn config(self) -> TierConfig {
        match self {
            Tier::One => TierConfig::TIER_1,
            Tier::Two => TierConfig::TIER_2,
            Tier::Three => TierConfig::TIER_3,
        }
    }

    /// Tier that governs a 1-based level index
    ///
    /// Levels 1-20 are Tier 1, 21-50 Tier 2, everything after Tier 3.
    pub fn for_level(level: usize) -> Self {
        match level {
            0..=20 => Tier::One,
            21..=50 => Tier::Two,
            _ => Tier::Three,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    /// Tiers above 3 share the Tier 3 preset
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Err("tier numbers start at 1".to_string()),
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            _ => Ok(Tier::Three),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.number()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier {}", self.number())
    }
}
