//! Serving-time inputs, picked from fixed option lists

use crate::bucketing::{unknown_option, AgeBand, ChildrenBand, CosmeticBand};
use crate::dataset::{columns, Table};
use crate::error::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest coverage amount accepted, also the step between amounts
pub const COVERAGE_STEP: u64 = 1000;

/// Ownership status of the house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    Owner,
    Tenant,
}

impl Ownership {
    pub const ALL: [Ownership; 2] = [Ownership::Owner, Ownership::Tenant];

    /// Value as it appears in the dataset
    pub fn label(self) -> &'static str {
        match self {
            Ownership::Owner => "Ev Sahibi",
            Ownership::Tenant => "Kiralık",
        }
    }

    /// Short identifier accepted on the command line
    pub fn key(self) -> &'static str {
        match self {
            Ownership::Owner => "owner",
            Ownership::Tenant => "tenant",
        }
    }
}

/// Geographic region of the house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    West,
    CentralAnatoliaAndBlackSea,
    MediterraneanAndInnerAegean,
    EastAndSoutheastAnatolia,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::West,
        Region::CentralAnatoliaAndBlackSea,
        Region::MediterraneanAndInnerAegean,
        Region::EastAndSoutheastAnatolia,
    ];

    /// Value as it appears in the dataset
    pub fn label(self) -> &'static str {
        match self {
            Region::West => "Batı Bölgesi",
            Region::CentralAnatoliaAndBlackSea => "İç Anadolu ve Karadeniz Bölgesi",
            Region::MediterraneanAndInnerAegean => "Akdeniz ve Ege İç Kesimleri Bölgesi",
            Region::EastAndSoutheastAnatolia => "Doğu ve Güneydoğu Anadolu Bölgesi",
        }
    }

    /// Short identifier accepted on the command line
    pub fn key(self) -> &'static str {
        match self {
            Region::West => "west",
            Region::CentralAnatoliaAndBlackSea => "central-black-sea",
            Region::MediterraneanAndInnerAegean => "mediterranean-aegean",
            Region::EastAndSoutheastAnatolia => "east-southeast",
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ownership {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.key().eq_ignore_ascii_case(s) || o.label() == s)
            .ok_or_else(|| unknown_option("ownership", s, Self::ALL.map(Ownership::key).as_slice()))
    }
}

impl FromStr for Region {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(s) || r.label() == s)
            .ok_or_else(|| unknown_option("region", s, Self::ALL.map(Region::key).as_slice()))
    }
}

/// Parse a `yes`/`no` answer
pub fn parse_yes_no(s: &str) -> EstimatorResult<bool> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(unknown_option("yes/no answer", other, &["yes", "no"])),
    }
}

/// Coverage amount: a positive whole multiple of 1000
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Coverage(u64);

impl Coverage {
    pub fn new(amount: u64) -> EstimatorResult<Self> {
        if amount < COVERAGE_STEP || amount % COVERAGE_STEP != 0 {
            return Err(EstimatorError::InvalidInput(format!(
                "coverage must be at least {COVERAGE_STEP} in steps of {COVERAGE_STEP}, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    pub fn amount(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Coverage {
    type Error = EstimatorError;

    fn try_from(amount: u64) -> EstimatorResult<Self> {
        Self::new(amount)
    }
}

impl From<Coverage> for u64 {
    fn from(coverage: Coverage) -> u64 {
        coverage.0
    }
}

impl FromStr for Coverage {
    type Err = EstimatorError;

    fn from_str(s: &str) -> EstimatorResult<Self> {
        let amount = s
            .trim()
            .parse::<u64>()
            .map_err(|_| EstimatorError::InvalidInput(format!("coverage '{s}' is not a whole number")))?;
        Self::new(amount)
    }
}

/// One house description as collected by the serving path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInput {
    pub ownership: Ownership,
    pub pet_owner: bool,
    pub region: Region,
    pub age_band: AgeBand,
    pub children_band: ChildrenBand,
    pub cosmetic_band: CosmeticBand,
}

impl PolicyInput {
    /// Single-row raw table in the trainer's column vocabulary. The pet flag
    /// is already numeric here, matching the {1,0} coding of training.
    pub fn to_table(&self) -> Table {
        Table::single_row([
            (columns::OWNERSHIP, self.ownership.label()),
            (columns::PET_OWNER, if self.pet_owner { "1" } else { "0" }),
            (columns::REGION, self.region.label()),
            (columns::AGE_BAND, self.age_band.label()),
            (columns::CHILDREN_BAND, self.children_band.label()),
            (columns::COSMETIC_BAND, self.cosmetic_band.label()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_bounds() {
        assert_eq!(Coverage::new(1000).unwrap().amount(), 1000);
        assert_eq!(Coverage::new(250_000).unwrap().amount(), 250_000);
        assert!(Coverage::new(0).is_err());
        assert!(Coverage::new(999).is_err());
        assert!(Coverage::new(1500).is_err());
        assert!("abc".parse::<Coverage>().is_err());
        assert!(serde_json::from_str::<Coverage>("1200").is_err());
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("owner".parse::<Ownership>().unwrap(), Ownership::Owner);
        assert_eq!("Kiralık".parse::<Ownership>().unwrap(), Ownership::Tenant);
        assert_eq!("WEST".parse::<Region>().unwrap(), Region::West);
        assert_eq!(
            "Doğu ve Güneydoğu Anadolu Bölgesi".parse::<Region>().unwrap(),
            Region::EastAndSoutheastAnatolia
        );
        assert!("north".parse::<Region>().is_err());
        assert!(parse_yes_no("yes").unwrap());
        assert!(!parse_yes_no("No").unwrap());
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn test_to_table() {
        let input = PolicyInput {
            ownership: Ownership::Tenant,
            pet_owner: true,
            region: Region::MediterraneanAndInnerAegean,
            age_band: AgeBand::from_years(42),
            children_band: ChildrenBand::Normal,
            cosmetic_band: CosmeticBand::Bad,
        };
        let table = input.to_table();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows()[0],
            [
                "Kiralık",
                "1",
                "Akdeniz ve Ege İç Kesimleri Bölgesi",
                "40-49",
                "Normal",
                "Bad"
            ]
        );
    }
}
