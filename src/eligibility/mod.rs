//! Content eligibility: which phrases are admissible for a difficulty tier
//!
//! The filter is a pure function of a record, a [`TierConfig`], an injected
//! [`Lexicon`] and a [`FrequencyTable`]. Rejections are ordinary values and
//! are aggregated into [`FilterStats`].

mod filter;
mod frequency;
mod lexicon;
mod tier;

pub use filter::{Decision, EligibilityFilter, FilterStats, RejectionReason};
pub use frequency::{percentile_to_score, FrequencyTable, MAX_FREQUENCY_SCORE};
pub use lexicon::Lexicon;
pub use tier::{Tier, TierConfig};
