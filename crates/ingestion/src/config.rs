//! Configuration for point-cloud loading and scene placement.

use std::path::Path;

use lidar_common::tile::{tile_span_meters, MAX_ZOOM};
use lidar_common::CrsCode;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};

/// Default CRS of incoming survey files (Lambert-93).
pub const DEFAULT_SOURCE_CRS: &str = "EPSG:2154";
/// Default CRS the points are reprojected into (Web Mercator).
pub const DEFAULT_TARGET_CRS: &str = "EPSG:3857";

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// CRS name the file coordinates are in.
    pub source_crs: String,

    /// CRS name positions and target bounds are computed in.
    pub target_crs: String,

    /// Scene placement parameters.
    pub placement: PlacementConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source_crs: DEFAULT_SOURCE_CRS.to_string(),
            target_crs: DEFAULT_TARGET_CRS.to_string(),
            placement: PlacementConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LIDAR_SOURCE_CRS") {
            if !val.trim().is_empty() {
                config.source_crs = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("LIDAR_TARGET_CRS") {
            if !val.trim().is_empty() {
                config.target_crs = val.trim().to_string();
            }
        }

        config.placement = PlacementConfig::from_env();
        config
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| IngestionError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.source_crs.trim().is_empty() {
            return Err("source_crs must not be empty".to_string());
        }
        if self.target_crs.trim().is_empty() {
            return Err("target_crs must not be empty".to_string());
        }
        self.placement.validate()
    }
}

/// Scene placement parameters.
///
/// Scene units relate to meters by `meters_per_scene_unit`; by default that
/// ratio is re-derived from the tile resolution so one tile spans exactly
/// `patch_size` scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Tile zoom level the scene grid is aligned with.
    pub zoom_level: u32,

    /// Scene units per tile edge.
    pub patch_size: f64,

    /// Fixed meters per scene unit; derived from the tile span when unset.
    pub meters_per_scene_unit: Option<f64>,

    /// Per-axis multipliers applied to the scale.
    pub calibration: [f64; 3],

    /// Extra offset added to the position (scene units).
    pub offset: [f64; 3],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            zoom_level: 19,
            patch_size: 64.0,
            meters_per_scene_unit: None,
            calibration: [1.0, 1.0, 1.0],
            offset: [0.0, 0.0, 0.0],
        }
    }
}

impl PlacementConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SCENE_ZOOM_LEVEL") {
            if let Ok(zoom) = val.parse() {
                config.zoom_level = zoom;
            }
        }

        if let Ok(val) = std::env::var("SCENE_PATCH_SIZE") {
            if let Ok(size) = val.parse() {
                config.patch_size = size;
            }
        }

        if let Ok(val) = std::env::var("SCENE_METERS_PER_UNIT") {
            if let Ok(ratio) = val.parse() {
                config.meters_per_scene_unit = Some(ratio);
            }
        }

        config
    }

    /// Effective meters per scene unit.
    pub fn meters_per_scene_unit(&self) -> f64 {
        self.meters_per_scene_unit
            .unwrap_or_else(|| tile_span_meters(self.zoom_level) / self.patch_size)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.zoom_level > MAX_ZOOM {
            return Err(format!("zoom_level must be <= {}", MAX_ZOOM));
        }

        if !(self.patch_size.is_finite() && self.patch_size > 0.0) {
            return Err("patch_size must be > 0".to_string());
        }

        if let Some(ratio) = self.meters_per_scene_unit {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err("meters_per_scene_unit must be > 0".to_string());
            }
        }

        if self.calibration.iter().any(|c| !c.is_finite() || *c == 0.0) {
            return Err("calibration multipliers must be finite and non-zero".to_string());
        }

        if self.offset.iter().any(|o| !o.is_finite()) {
            return Err("offset must be finite".to_string());
        }

        Ok(())
    }
}

/// True when `name` is one of the Web Mercator aliases placement understands.
pub(crate) fn is_web_mercator(name: &str) -> bool {
    matches!(CrsCode::parse(name), Ok(CrsCode::Epsg3857))
}
