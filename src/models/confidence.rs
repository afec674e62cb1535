//! Confidence tiers for recommendations.

use serde::{Deserialize, Serialize};

/// Coarse, sample-size-weighted certainty of a recommendation.
///
/// Variants are declared strongest first, so the derived `Ord` sorts
/// `High` before `Medium` before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Backed by a large sample or a wide margin
    High,
    /// Clears the gates but with a modest sample
    Medium,
    /// Thin evidence; worth knowing, not worth building a plan on
    Low,
}

impl Confidence {
    /// High when the sample reaches `high_threshold`, medium otherwise.
    pub fn from_sample(sample_size: u32, high_threshold: u32) -> Self {
        if sample_size >= high_threshold {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    /// Confidence one tier lower, saturating at `Low`.
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}
