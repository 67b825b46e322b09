//! Threshold bucketing of the numeric house attributes.
//!
//! The trainer derives these bands from raw dataset values; the serving path
//! receives them pre-chosen from the same fixed option lists.

use crate::error::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound (exclusive) of a `Good` cosmetic score
pub const COSMETIC_GOOD_BELOW: f64 = 19.9;
/// Upper bound (inclusive) of a `Normal` cosmetic score
pub const COSMETIC_NORMAL_UP_TO: f64 = 30.0;

/// Cosmetic condition of the house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosmeticBand {
    Good,
    Normal,
    Bad,
}

impl CosmeticBand {
    pub const ALL: [CosmeticBand; 3] = [CosmeticBand::Good, CosmeticBand::Normal, CosmeticBand::Bad];

    /// Bucket a raw cosmetic-condition score. Total over f64: anything that
    /// is neither below 19.9 nor within [19.9, 30] (NaN included) is `Bad`.
    pub fn from_score(score: f64) -> Self {
        if score < COSMETIC_GOOD_BELOW {
            CosmeticBand::Good
        } else if (COSMETIC_GOOD_BELOW..=COSMETIC_NORMAL_UP_TO).contains(&score) {
            CosmeticBand::Normal
        } else {
            CosmeticBand::Bad
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CosmeticBand::Good => "Good",
            CosmeticBand::Normal => "Normal",
            CosmeticBand::Bad => "Bad",
        }
    }
}

/// Decade band of the house age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AgeBand(u8);

const AGE_LABELS: [&str; 11] = [
    "0-9", "10-19", "20-29", "30-39", "40-49", "50-59", "60-69", "70-79", "80-89", "90-99", "100+",
];

impl AgeBand {
    /// Number of named bands
    pub const COUNT: usize = AGE_LABELS.len();

    /// Bucket an age in whole years. Band index is `years / 10`; every index
    /// from 10 upwards collapses into `100+`.
    pub fn from_years(years: u32) -> Self {
        let index = (years / 10).min((Self::COUNT - 1) as u32);
        AgeBand(index as u8)
    }

    /// All bands in ascending order
    pub fn all() -> impl Iterator<Item = AgeBand> {
        (0..Self::COUNT as u8).map(AgeBand)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn label(self) -> &'static str {
        AGE_LABELS[self.index()]
    }
}

/// Band of the number of children.
///
/// Fewer children map to `High` and more to `Low`. Trained models depend on
/// these exact labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildrenBand {
    High,
    Normal,
    Low,
}

impl ChildrenBand {
    pub const ALL: [ChildrenBand; 3] = [ChildrenBand::High, ChildrenBand::Normal, ChildrenBand::Low];

    /// Bucket a raw children count. The value is compared as given, so a
    /// fractional count such as 2.5 is neither below 2 nor equal to it.
    pub fn from_count(count: f64) -> Self {
        if count < 2.0 {
            ChildrenBand::High
        } else if count == 2.0 {
            ChildrenBand::Normal
        } else {
            ChildrenBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChildrenBand::High => "High",
            ChildrenBand::Normal => "Normal",
            ChildrenBand::Low => "Low",
        }
    }
}

impl TryFrom<u8> for AgeBand {
    type Error = EstimatorError;

    fn try_from(index: u8) -> EstimatorResult<Self> {
        if usize::from(index) < Self::COUNT {
            Ok(AgeBand(index))
        } else {
            Err(EstimatorError::InvalidInput(format!("age band index {index} out of range")))
        }
    }
}

impl From<AgeBand> for u8 {
    fn from(band: AgeBand) -> u8 {
        band.0
    }
}

impl fmt::Display for CosmeticBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ChildrenBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CosmeticBand {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| unknown_option("cosmetic band", s, Self::ALL.map(Self::label).as_slice()))
    }
}

impl FromStr for AgeBand {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        Self::all()
            .find(|band| band.label() == s.trim())
            .ok_or_else(|| unknown_option("age band", s, &AGE_LABELS))
    }
}

impl FromStr for ChildrenBand {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| unknown_option("children band", s, Self::ALL.map(Self::label).as_slice()))
    }
}

pub(crate) fn unknown_option(kind: &str, value: &str, allowed: &[&str]) -> EstimatorError {
    EstimatorError::InvalidInput(format!(
        "unknown {kind} '{value}', expected one of: {}",
        allowed.join(", ")
    ))
}
