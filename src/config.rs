use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use polymetric::AreaModel;
use serde::{Deserialize, Serialize};

use crate::score::PerimeterMode;

/// Tunables for the compactness engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides. Chunk size, the hull sample cap and the scoring thresholds
/// are constants, not config, so scores are comparable across setups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Lifetime of cached datasets and results, in seconds.
    pub cache_ttl_secs: u64,
    /// Byte budget of each cache namespace.
    pub cache_max_bytes: usize,
    /// Geodesic (lon/lat input) or planar measurement.
    pub area_model: AreaModel,
    /// Perimeter used by the boundary-context irregularity signal.
    pub perimeter_mode: PerimeterMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30 * 60,
            cache_max_bytes: 100 * 1024 * 1024,
            area_model: AreaModel::Geodesic,
            perimeter_mode: PerimeterMode::Estimated,
        }
    }
}

impl EngineConfig {
    /// Read a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    #[inline] pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.area_model, AreaModel::Geodesic);
        assert_eq!(config.perimeter_mode, PerimeterMode::Estimated);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "cacheMaxBytes": 1024, "areaModel": "planar", "perimeterMode": "exact" }"#,
        ).unwrap();
        assert_eq!(config.cache_max_bytes, 1024);
        assert_eq!(config.area_model, AreaModel::Planar);
        assert_eq!(config.perimeter_mode, PerimeterMode::Exact);
        assert_eq!(config.cache_ttl_secs, 1800);
    }

    #[test]
    fn batching_and_sampling_are_not_configurable() {
        let json = serde_json::to_value(EngineConfig::default()).unwrap();
        assert!(json.get("chunkSize").is_none());
        assert!(json.get("sampleCap").is_none());

        let config: EngineConfig = serde_json::from_str(r#"{ "chunkSize": 1, "sampleCap": 3 }"#).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "cacheTtlSecs": 60 }"#).unwrap();
        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    }
}
