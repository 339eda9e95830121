use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of Canadian provinces and territories.
///
/// Each variant carries its Standard Geographical Classification (SGC) code, which is
/// also the two-digit prefix of every census division identifier inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Province {
    /// Newfoundland and Labrador (10)
    #[serde(rename = "10")]
    NewfoundlandAndLabrador,
    /// Prince Edward Island (11)
    #[serde(rename = "11")]
    PrinceEdwardIsland,
    /// Nova Scotia (12)
    #[serde(rename = "12")]
    NovaScotia,
    /// New Brunswick (13)
    #[serde(rename = "13")]
    NewBrunswick,
    /// Quebec (24)
    #[serde(rename = "24")]
    Quebec,
    /// Ontario (35)
    #[serde(rename = "35")]
    Ontario,
    /// Manitoba (46)
    #[serde(rename = "46")]
    Manitoba,
    /// Saskatchewan (47)
    #[serde(rename = "47")]
    Saskatchewan,
    /// Alberta (48)
    #[serde(rename = "48")]
    Alberta,
    /// British Columbia (59)
    #[serde(rename = "59")]
    BritishColumbia,
    /// Yukon (60)
    #[serde(rename = "60")]
    Yukon,
    /// Northwest Territories (61)
    #[serde(rename = "61")]
    NorthwestTerritories,
    /// Nunavut (62)
    #[serde(rename = "62")]
    Nunavut,
}

/// Returned when a string does not name one of the 13 provinces or territories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown province or territory: '{0}'")]
pub struct UnknownProvince(pub String);

impl Province {
    /// Every province and territory, in SGC code order.
    pub const ALL: [Self; 13] = [
        Self::NewfoundlandAndLabrador,
        Self::PrinceEdwardIsland,
        Self::NovaScotia,
        Self::NewBrunswick,
        Self::Quebec,
        Self::Ontario,
        Self::Manitoba,
        Self::Saskatchewan,
        Self::Alberta,
        Self::BritishColumbia,
        Self::Yukon,
        Self::NorthwestTerritories,
        Self::Nunavut,
    ];

    /// Two-digit SGC code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NewfoundlandAndLabrador => "10",
            Self::PrinceEdwardIsland => "11",
            Self::NovaScotia => "12",
            Self::NewBrunswick => "13",
            Self::Quebec => "24",
            Self::Ontario => "35",
            Self::Manitoba => "46",
            Self::Saskatchewan => "47",
            Self::Alberta => "48",
            Self::BritishColumbia => "59",
            Self::Yukon => "60",
            Self::NorthwestTerritories => "61",
            Self::Nunavut => "62",
        }
    }

    /// English display name, as it appears in Statistics Canada tables
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Self::PrinceEdwardIsland => "Prince Edward Island",
            Self::NovaScotia => "Nova Scotia",
            Self::NewBrunswick => "New Brunswick",
            Self::Quebec => "Quebec",
            Self::Ontario => "Ontario",
            Self::Manitoba => "Manitoba",
            Self::Saskatchewan => "Saskatchewan",
            Self::Alberta => "Alberta",
            Self::BritishColumbia => "British Columbia",
            Self::Yukon => "Yukon",
            Self::NorthwestTerritories => "Northwest Territories",
            Self::Nunavut => "Nunavut",
        }
    }

    /// Lower-case postal abbreviation
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::NewfoundlandAndLabrador => "nl",
            Self::PrinceEdwardIsland => "pe",
            Self::NovaScotia => "ns",
            Self::NewBrunswick => "nb",
            Self::Quebec => "qc",
            Self::Ontario => "on",
            Self::Manitoba => "mb",
            Self::Saskatchewan => "sk",
            Self::Alberta => "ab",
            Self::BritishColumbia => "bc",
            Self::Yukon => "yt",
            Self::NorthwestTerritories => "nt",
            Self::Nunavut => "nu",
        }
    }

    /// Look up a province by its SGC code. Surrounding whitespace is ignored.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Look up a province by its exact English name. Surrounding whitespace is ignored.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Province {
    type Err = UnknownProvince;

    /// Accepts a code, an English name or a postal abbreviation, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                p.code() == needle
                    || p.name().eq_ignore_ascii_case(needle)
                    || p.abbreviation().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownProvince(s.to_string()))
    }
}
