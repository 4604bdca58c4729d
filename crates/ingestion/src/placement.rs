//! Scene placement relative to the Web Mercator tile grid.
//!
//! The scene lays tiles out on a square grid, one tile per `patch_size`
//! scene units, column along +X and row along +Z. A cloud is placed by
//! finding the tile that holds the minimum of its reprojected bounds and
//! adding the sub-tile offset of that minimum, converted to scene units.

use lidar_common::tile::{web_mercator_tile_bounds, web_mercator_to_tile};
use lidar_common::TileCoord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{is_web_mercator, PlacementConfig};
use crate::error::{IngestionError, Result};
use crate::pointcloud::Metadata;

/// Offset and scale that put a cloud's local positions into scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePlacement {
    /// Scene-space position of the cloud's local origin.
    pub position: [f64; 3],
    /// Per-axis scale from local meters to scene units.
    pub scale: [f64; 3],
    /// Tile holding the cloud's minimum corner.
    pub tile: TileCoord,
    /// Meters per scene unit used for X and Z.
    pub meters_per_scene_unit: f64,
}

impl ScenePlacement {
    pub fn compute(metadata: &Metadata, config: &PlacementConfig) -> Result<Self> {
        config.validate().map_err(IngestionError::InvalidConfig)?;

        if !is_web_mercator(&metadata.target_crs) {
            return Err(IngestionError::Placement(format!(
                "points are in {}, tile placement needs EPSG:3857",
                metadata.target_crs
            )));
        }

        let bounds = &metadata.target_bounds;
        if bounds.is_empty() {
            return Err(IngestionError::Placement("cloud has no points".to_string()));
        }
        let [min_x, min_y, min_z] = bounds.min;

        let tile = web_mercator_to_tile(min_x, min_y, config.zoom_level).ok_or_else(|| {
            IngestionError::Placement(format!(
                "({}, {}) is outside the Web Mercator extent",
                min_x, min_y
            ))
        })?;
        let tile_bounds = web_mercator_tile_bounds(&tile);

        let mpsu = config.meters_per_scene_unit();
        let units_per_meter = 1.0 / mpsu;

        // Meters east of the tile's west edge and south of its north edge
        let dx = (min_x - tile_bounds.min_x) * units_per_meter;
        let dz = (tile_bounds.max_y - min_y) * units_per_meter;

        let (base_x, base_z) = grid_to_world(tile.x as i64, tile.y as i64, config.patch_size);
        let position = [
            base_x + dx + config.offset[0],
            min_z + config.offset[1],
            base_z + dz + config.offset[2],
        ];
        let scale = [
            units_per_meter * config.calibration[0],
            config.calibration[1],
            units_per_meter * config.calibration[2],
        ];

        debug!(
            zoom = tile.z,
            col = tile.x,
            row = tile.y,
            meters_per_scene_unit = mpsu,
            x = position[0],
            y = position[1],
            z = position[2],
            "Computed scene placement"
        );

        Ok(Self {
            position,
            scale,
            tile,
            meters_per_scene_unit: mpsu,
        })
    }

    /// Scene coordinates of a local position from [`PointCloud::positions`].
    ///
    /// [`PointCloud::positions`]: crate::PointCloud::positions
    pub fn to_scene(&self, local: [f32; 3]) -> [f64; 3] {
        [
            self.position[0] + local[0] as f64 * self.scale[0],
            self.position[1] + local[1] as f64 * self.scale[1],
            self.position[2] + local[2] as f64 * self.scale[2],
        ]
    }
}

/// Patch (column, row) holding scene point `(x, z)`.
pub fn world_to_grid(x: f64, z: f64, patch_size: f64) -> (i64, i64) {
    (
        (x / patch_size).floor() as i64,
        (z / patch_size).floor() as i64,
    )
}

/// Scene coordinates of the corner of patch `(col, row)`.
pub fn grid_to_world(col: i64, row: i64, patch_size: f64) -> (f64, f64) {
    (col as f64 * patch_size, row as f64 * patch_size)
}
