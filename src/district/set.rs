use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A classification of electoral districts backed by one boundary dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistrictSet {
    CongressionalDistricts,
    StateUpperDistricts,
    StateLowerDistricts,
}

impl DistrictSet {
    /// Every known district set, in display order.
    pub const ALL: [DistrictSet; 3] = [
        DistrictSet::CongressionalDistricts,
        DistrictSet::StateUpperDistricts,
        DistrictSet::StateLowerDistricts,
    ];

    /// The key callers use to select this set, e.g. "congressional-districts".
    pub fn key(&self) -> &'static str {
        match self {
            DistrictSet::CongressionalDistricts => "congressional-districts",
            DistrictSet::StateUpperDistricts => "state-upper-districts",
            DistrictSet::StateLowerDistricts => "state-lower-districts",
        }
    }

    /// Path of the boundary dataset, relative to the provider's root.
    pub fn dataset_path(&self) -> &'static str {
        match self {
            DistrictSet::CongressionalDistricts => "/districts/congressional-districts.geojson",
            DistrictSet::StateUpperDistricts => "/districts/state-upper-districts.geojson",
            DistrictSet::StateLowerDistricts => "/districts/state-lower-districts.geojson",
        }
    }
}

impl fmt::Display for DistrictSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DistrictSet {
    type Err = EngineError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        if key.is_empty() { return Err(EngineError::MissingDistrictSet) }
        DistrictSet::ALL.into_iter()
            .find(|set| set.key() == key)
            .ok_or_else(|| EngineError::InvalidDistrictSet(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for set in DistrictSet::ALL {
            assert_eq!(set.key().parse::<DistrictSet>().unwrap(), set);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "county-districts".parse::<DistrictSet>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidDistrictSet(ref key) if key == "county-districts"));
        assert!(err.is_caller_error());
    }

    #[test]
    fn empty_key_is_missing() {
        assert!(matches!("  ".parse::<DistrictSet>(), Err(EngineError::MissingDistrictSet)));
    }

    #[test]
    fn dataset_paths_follow_keys() {
        for set in DistrictSet::ALL {
            assert!(set.dataset_path().ends_with(&format!("{}.geojson", set.key())));
        }
    }
}
