//! Generation run configuration
//!
//! Every field has a default, so a YAML file only needs the values it
//! changes. Command-line flags override the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::eligibility::Tier;
use crate::graph::SufficiencyThresholds;
use crate::reuse::ReusePolicy;
use crate::search::SearchConfig;

/// Errors loading or checking configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validator settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Minimum phrases per chain; `None` means the chain length
    pub min_phrases: Option<usize>,
}

/// Everything one generation run needs besides its input data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub levels: usize,
    pub chain_length: usize,
    pub seed: u64,
    /// Level index of the first generated chain
    pub first_level: usize,
    /// Explicit tier; derived from `first_level` when absent
    pub tier: Option<Tier>,
    pub search: SearchConfig,
    pub sufficiency: SufficiencyThresholds,
    pub reuse: ReusePolicy,
    pub validation: ValidationSettings,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            levels: 20,
            chain_length: 16,
            seed: 42,
            first_level: 1,
            tier: None,
            search: SearchConfig::default(),
            sufficiency: SufficiencyThresholds::default(),
            reuse: ReusePolicy::default(),
            validation: ValidationSettings::default(),
        }
    }
}

impl GenerationConfig {
    pub fn load_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded generation config");
        Ok(config)
    }

    /// Tier in effect for this run
    pub fn tier(&self) -> Tier {
        self.tier.unwrap_or_else(|| Tier::for_level(self.first_level))
    }

    /// Minimum phrases per chain the validator enforces
    pub fn min_phrases(&self) -> usize {
        self.validation.min_phrases.unwrap_or(self.chain_length)
    }

    /// Reject values that would make a run meaningless
    pub fn validate(&self) -> ConfigResult<()> {
        if self.levels == 0 {
            return Err(ConfigError::Invalid("levels must be at least 1".into()));
        }
        if self.chain_length == 0 {
            return Err(ConfigError::Invalid("chain_length must be at least 1".into()));
        }
        if self.first_level == 0 {
            return Err(ConfigError::Invalid("first_level is 1-based".into()));
        }
        if self.search.max_reuse == 0 {
            return Err(ConfigError::Invalid("search.max_reuse must be at least 1".into()));
        }
        if self.search.budget_factor == 0 || self.search.attempts_per_level == 0 {
            return Err(ConfigError::Invalid(
                "search.budget_factor and search.attempts_per_level must be positive".into(),
            ));
        }
        if !self.search.reuse_penalty.is_finite() || !self.search.ambiguity_weight.is_finite() {
            return Err(ConfigError::Invalid("search weights must be finite".into()));
        }
        Ok(())
    }
}
