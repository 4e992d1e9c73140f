//! Discretized assurance levels
//!
//! Continuous assurance scores are discretized to integer levels 1-5 for
//! table lookups and report text. Missing or unparsable numeric fields
//! degrade to documented defaults instead of propagating errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default applied when a severity or controllability rating is missing or
/// non-numeric.
pub const DEFAULT_RATING: f64 = 3.0;

/// Discretized assurance level derived from a continuous score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AssuranceLevel {
    /// Level 1 - lowest assurance
    Level1,
    /// Level 2
    Level2,
    /// Level 3
    Level3,
    /// Level 4
    Level4,
    /// Level 5 - highest assurance
    Level5,
}

impl AssuranceLevel {
    /// Discretize a continuous score using the fixed thresholds:
    /// >= 4.5 -> 5, >= 3.5 -> 4, >= 2.5 -> 3, >= 1.5 -> 2, else 1.
    pub fn from_quant(value: f64) -> Self {
        if value >= 4.5 {
            AssuranceLevel::Level5
        } else if value >= 3.5 {
            AssuranceLevel::Level4
        } else if value >= 2.5 {
            AssuranceLevel::Level3
        } else if value >= 1.5 {
            AssuranceLevel::Level2
        } else {
            AssuranceLevel::Level1
        }
    }

    /// Discretize an optional score; an undiscretizable (absent) value
    /// degrades to level 1.
    pub fn from_optional(value: Option<f64>) -> Self {
        value.map(Self::from_quant).unwrap_or(AssuranceLevel::Level1)
    }

    /// Numeric level 1-5, the key into the guidance tables
    pub fn as_number(&self) -> u8 {
        match self {
            AssuranceLevel::Level1 => 1,
            AssuranceLevel::Level2 => 2,
            AssuranceLevel::Level3 => 3,
            AssuranceLevel::Level4 => 4,
            AssuranceLevel::Level5 => 5,
        }
    }

    /// Level from its numeric value, if in range
    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            1 => Some(AssuranceLevel::Level1),
            2 => Some(AssuranceLevel::Level2),
            3 => Some(AssuranceLevel::Level3),
            4 => Some(AssuranceLevel::Level4),
            5 => Some(AssuranceLevel::Level5),
            _ => None,
        }
    }

    /// Short qualitative wording used in argumentation text
    pub fn description(&self) -> &'static str {
        match self {
            AssuranceLevel::Level1 => "Very Low",
            AssuranceLevel::Level2 => "Low",
            AssuranceLevel::Level3 => "Medium",
            AssuranceLevel::Level4 => "High",
            AssuranceLevel::Level5 => "Very High",
        }
    }
}

impl fmt::Display for AssuranceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {} ({})", self.as_number(), self.description())
    }
}

/// Return the rating value, or [`DEFAULT_RATING`] when absent
pub fn rating_or_default(value: Option<f64>) -> f64 {
    value.unwrap_or(DEFAULT_RATING)
}

/// Parse a free-text rating field; non-numeric input degrades to
/// [`DEFAULT_RATING`]
pub fn parse_rating(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(DEFAULT_RATING)
}
