//! Sector classification.
//!
//! Sectors as reported by common market data vendors. The lowercase
//! [`key`](Sector::key) is what sector-average tables are indexed by.

use finsight_data::{CompanyInfo, normalize_sector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market sectors (11 sectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    /// Technology
    Technology,

    /// Healthcare
    Healthcare,

    /// Financial Services
    FinancialServices,

    /// Consumer Cyclical
    ConsumerCyclical,

    /// Communication Services
    CommunicationServices,

    /// Industrials
    Industrials,

    /// Consumer Defensive
    ConsumerDefensive,

    /// Energy
    Energy,

    /// Utilities
    Utilities,

    /// Real Estate
    RealEstate,

    /// Basic Materials
    BasicMaterials,
}

impl Sector {
    /// Returns all sectors.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Technology,
            Self::Healthcare,
            Self::FinancialServices,
            Self::ConsumerCyclical,
            Self::CommunicationServices,
            Self::Industrials,
            Self::ConsumerDefensive,
            Self::Energy,
            Self::Utilities,
            Self::RealEstate,
            Self::BasicMaterials,
        ]
    }

    /// Returns the sector name as vendors report it.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Healthcare => "Healthcare",
            Self::FinancialServices => "Financial Services",
            Self::ConsumerCyclical => "Consumer Cyclical",
            Self::CommunicationServices => "Communication Services",
            Self::Industrials => "Industrials",
            Self::ConsumerDefensive => "Consumer Defensive",
            Self::Energy => "Energy",
            Self::Utilities => "Utilities",
            Self::RealEstate => "Real Estate",
            Self::BasicMaterials => "Basic Materials",
        }
    }

    /// Returns the sector-average key (lowercase name).
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Healthcare => "healthcare",
            Self::FinancialServices => "financial services",
            Self::ConsumerCyclical => "consumer cyclical",
            Self::CommunicationServices => "communication services",
            Self::Industrials => "industrials",
            Self::ConsumerDefensive => "consumer defensive",
            Self::Energy => "energy",
            Self::Utilities => "utilities",
            Self::RealEstate => "real estate",
            Self::BasicMaterials => "basic materials",
        }
    }

    /// Returns the closest GICS Level 1 sector code (2-digit).
    pub const fn gics_code(&self) -> u8 {
        match self {
            Self::Energy => 10,
            Self::BasicMaterials => 15,
            Self::Industrials => 20,
            Self::ConsumerCyclical => 25,
            Self::ConsumerDefensive => 30,
            Self::Healthcare => 35,
            Self::FinancialServices => 40,
            Self::Technology => 45,
            Self::CommunicationServices => 50,
            Self::Utilities => 55,
            Self::RealEstate => 60,
        }
    }

    /// Parse a sector from its name or key, ignoring case and surrounding
    /// whitespace.
    pub fn from_key(raw: &str) -> Option<Self> {
        let key = normalize_sector(raw);
        Self::all().into_iter().find(|s| s.key() == key)
    }

    /// The sector of a company, if it reports a known one.
    pub fn of(company: &CompanyInfo) -> Option<Self> {
        company.sector.as_deref().and_then(Self::from_key)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown sector '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_sectors() {
        let sectors = Sector::all();
        assert_eq!(sectors.len(), 11);
    }

    #[rstest]
    #[case("Technology", Some(Sector::Technology))]
    #[case("  financial services ", Some(Sector::FinancialServices))]
    #[case("REAL ESTATE", Some(Sector::RealEstate))]
    #[case("Information Technology", None)]
    #[case("", None)]
    fn test_from_key(#[case] raw: &str, #[case] expected: Option<Sector>) {
        assert_eq!(Sector::from_key(raw), expected);
    }

    #[test]
    fn test_keys_are_normalized_names() {
        for sector in Sector::all() {
            assert_eq!(normalize_sector(sector.name()), sector.key());
        }
    }

    #[test]
    fn test_gics_codes_unique() {
        let mut codes: Vec<u8> = Sector::all().iter().map(Sector::gics_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 11);
    }

    #[test]
    fn test_company_sector() {
        let company = CompanyInfo {
            sector: Some("Energy".into()),
            ..CompanyInfo::unknown("XOM")
        };
        assert_eq!(Sector::of(&company), Some(Sector::Energy));
        assert_eq!(Sector::of(&CompanyInfo::unknown("X")), None);
        assert_eq!("Utilities".parse::<Sector>().unwrap().to_string(), "Utilities");
    }
}
