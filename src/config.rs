//! Configuration management for the drum reorder engine

use crate::error::{ReorderError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Physical layout of the drum
///
/// The defaults describe a deliberately simple format: a single head,
/// no zoned bit recording, no split sectors. Addresses increase
/// monotonically through tracks, cycling through service groups within
/// each track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeometryConfig {
    /// Number of angular service groups per revolution (default: 360)
    #[serde(default = "default_num_service_groups")]
    pub num_service_groups: u32,

    /// Number of tracks (default: 5000)
    #[serde(default = "default_num_tracks")]
    pub num_tracks: u32,

    /// Number of blocks stored in one service group of one track (default: 10)
    #[serde(default = "default_blocks_per_sg")]
    pub blocks_per_sg: u32,

    /// Service groups of angular offset applied per track (default: 0)
    ///
    /// A nonzero skew staggers consecutive tracks so that a track-to-track
    /// switch lands just ahead of the head instead of a full revolution
    /// behind it. Zero keeps the plain zoned mapping.
    #[serde(default)]
    pub track_skew: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            num_service_groups: default_num_service_groups(),
            num_tracks: default_num_tracks(),
            blocks_per_sg: default_blocks_per_sg(),
            track_skew: 0,
        }
    }
}

impl GeometryConfig {
    /// Total number of addressable blocks on the drum
    pub fn num_blocks(&self) -> u64 {
        self.num_service_groups as u64 * self.num_tracks as u64 * self.blocks_per_sg as u64
    }

    /// Validate the drum layout
    ///
    /// # Validation Rules
    /// - all three dimensions must be nonzero
    /// - track_skew must be smaller than num_service_groups
    /// - the block count must fit in a u64
    pub fn validate(&self) -> Result<()> {
        if self.num_service_groups == 0 {
            return Err(ReorderError::ConfigError(
                "num_service_groups must be nonzero".to_string(),
            ));
        }
        if self.num_tracks == 0 {
            return Err(ReorderError::ConfigError(
                "num_tracks must be nonzero".to_string(),
            ));
        }
        if self.blocks_per_sg == 0 {
            return Err(ReorderError::ConfigError(
                "blocks_per_sg must be nonzero".to_string(),
            ));
        }
        if self.track_skew >= self.num_service_groups {
            return Err(ReorderError::ConfigError(format!(
                "track_skew ({}) must be smaller than num_service_groups ({})",
                self.track_skew, self.num_service_groups
            )));
        }

        let blocks = (self.num_service_groups as u64)
            .checked_mul(self.num_tracks as u64)
            .and_then(|b| b.checked_mul(self.blocks_per_sg as u64));
        if blocks.is_none() {
            return Err(ReorderError::ConfigError(format!(
                "drum layout {}x{}x{} overflows the block address space",
                self.num_service_groups, self.num_tracks, self.blocks_per_sg
            )));
        }

        Ok(())
    }
}

/// Weights applied to the two components of positioning cost
///
/// Both weights default to 1, making one track of seek and one service
/// group of rotation equally expensive. Either weight may be zero to
/// ignore that component entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostWeights {
    /// Cost per track of head movement (default: 1)
    #[serde(default = "default_weight")]
    pub seek_weight: u64,

    /// Cost per service group of rotational wait (default: 1)
    #[serde(default = "default_weight")]
    pub rotation_weight: u64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            seek_weight: default_weight(),
            rotation_weight: default_weight(),
        }
    }
}

/// Configuration for the reorder engine
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Drum layout
    #[serde(default)]
    pub geometry: GeometryConfig,

    /// Positioning cost weights
    #[serde(default)]
    pub weights: CostWeights,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if the file loads, parses and validates
    /// * `Err(ReorderError)` otherwise
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ReorderError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: EngineConfig = serde_yaml::from_str(&contents).map_err(|e| {
            ReorderError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()
    }
}

// Default value functions for serde
fn default_num_service_groups() -> u32 {
    360
}

fn default_num_tracks() -> u32 {
    5000
}

fn default_blocks_per_sg() -> u32 {
    10
}

fn default_weight() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = GeometryConfig::default();
        assert_eq!(config.num_service_groups, 360);
        assert_eq!(config.num_tracks, 5000);
        assert_eq!(config.blocks_per_sg, 10);
        assert_eq!(config.track_skew, 0);
        assert_eq!(config.num_blocks(), 18_000_000);
    }

    #[test]
    fn test_default_weights() {
        let weights = CostWeights::default();
        assert_eq!(weights.seek_weight, 1);
        assert_eq!(weights.rotation_weight, 1);
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let mut config = GeometryConfig::default();
        config.num_tracks = 0;
        assert!(config.validate().is_err());

        let mut config = GeometryConfig::default();
        config.num_service_groups = 0;
        assert!(config.validate().is_err());

        let mut config = GeometryConfig::default();
        config.blocks_per_sg = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_skew() {
        let mut config = GeometryConfig::default();
        config.track_skew = 360;
        assert!(config.validate().is_err());

        config.track_skew = 359;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_layout() {
        let config = GeometryConfig {
            num_service_groups: u32::MAX,
            num_tracks: u32::MAX,
            blocks_per_sg: u32::MAX,
            track_skew: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_yaml_applies_defaults() {
        let yaml = r#"
geometry:
  num_tracks: 100
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.geometry.num_tracks, 100);
        assert_eq!(config.geometry.num_service_groups, 360);
        assert_eq!(config.weights.seek_weight, 1);
    }
}
