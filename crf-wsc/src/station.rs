use crate::error::{Result, WscError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated Water Survey of Canada station number.
///
/// Station numbers are seven ASCII characters: a two-digit regional prefix,
/// two letters, three digits (e.g. `08NA011` for the Spillimacheen River).
/// Input is accepted case-insensitively and normalised to uppercase.
/// Construction is the only validation point; everything downstream can
/// assume a well-formed id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(raw: &str) -> Result<Self> {
        let id = raw.trim().to_ascii_uppercase();
        let bytes = id.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[..2].iter().all(|b| b.is_ascii_digit())
            && bytes[2..4].iter().all(|b| b.is_ascii_uppercase())
            && bytes[4..].iter().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(WscError::InvalidStation(raw.trim().to_string()));
        }
        Ok(StationId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-digit regional prefix of the station number.
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Region code used to partition the MSC Datamart CSV tree.
    ///
    /// Fixed table on the station prefix. Prefixes outside the table fall
    /// back to "BC": the station catalogue this toolkit serves is British
    /// Columbia centred.
    pub fn region_code(&self) -> &'static str {
        match self.prefix() {
            "02" => "ON",
            "05" => "AB",
            "08" | "09" => "BC",
            _ => "BC",
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StationId {
    type Err = WscError;

    fn from_str(s: &str) -> Result<Self> {
        StationId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::StationId;
    use crate::error::WscError;

    #[test]
    fn test_valid_station_ids() {
        let station = StationId::new("08NA011").unwrap();
        assert_eq!(station.as_str(), "08NA011");
        assert_eq!(station.prefix(), "08");

        // lowercase input is normalised
        let station = StationId::new("08na011").unwrap();
        assert_eq!(station.as_str(), "08NA011");

        // surrounding whitespace is trimmed
        let station = StationId::new("  05BH004 ").unwrap();
        assert_eq!(station.as_str(), "05BH004");
    }

    #[test]
    fn test_invalid_station_ids() {
        for raw in ["", "08NA01", "08NA0111", "XXNA011", "08N1011", "08NAB11", "08-A011"] {
            let result = StationId::new(raw);
            assert!(
                matches!(result, Err(WscError::InvalidStation(_))),
                "expected InvalidStation for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_region_codes() {
        assert_eq!(StationId::new("08NL071").unwrap().region_code(), "BC");
        assert_eq!(StationId::new("09AB001").unwrap().region_code(), "BC");
        assert_eq!(StationId::new("05AA008").unwrap().region_code(), "AB");
        assert_eq!(StationId::new("02AB000").unwrap().region_code(), "ON");
        // unknown prefixes fall back to BC
        assert_eq!(StationId::new("04QC001").unwrap().region_code(), "BC");
    }

    #[test]
    fn test_from_str() {
        let station: StationId = "02KF005".parse().unwrap();
        assert_eq!(station.as_str(), "02KF005");
        assert!("bogus".parse::<StationId>().is_err());
    }
}
