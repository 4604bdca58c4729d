//! Web Mercator tile-grid addressing.
//!
//! Converts between planar Web Mercator (EPSG:3857) meters and XYZ tile
//! indices (column increases eastward, row increases southward).

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis, used as the Web Mercator sphere radius (meters).
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half-extent of the Web Mercator plane (meters from the origin to an edge).
pub const MAX_WEB_MERCATOR: f64 = EARTH_RADIUS * std::f64::consts::PI;

/// Standard tile pixel size for WMTS/XYZ tile sets.
pub const TILE_SIZE_PX: u32 = 256;

/// Deepest zoom level addressable with this scheme.
pub const MAX_ZOOM: u32 = 22;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

/// Number of tiles along one axis at `zoom`.
fn tiles_per_axis(zoom: u32) -> u32 {
    1u32 << zoom
}

/// Ground resolution in meters per pixel at `zoom`.
pub fn resolution(zoom: u32) -> f64 {
    (2.0 * MAX_WEB_MERCATOR) / (tiles_per_axis(zoom) as f64 * TILE_SIZE_PX as f64)
}

/// Ground span of one tile edge in meters at `zoom`.
pub fn tile_span_meters(zoom: u32) -> f64 {
    TILE_SIZE_PX as f64 * resolution(zoom)
}

/// Converts a WMTS tile (col, row, zoom) to its Web Mercator bounding box.
pub fn web_mercator_tile_bounds(coord: &TileCoord) -> BoundingBox {
    let res = resolution(coord.z);
    let px = TILE_SIZE_PX as f64;

    let min_x = -MAX_WEB_MERCATOR + coord.x as f64 * px * res;
    // Rows count downward from the northern edge
    let max_y = MAX_WEB_MERCATOR - coord.y as f64 * px * res;

    let max_x = -MAX_WEB_MERCATOR + (coord.x + 1) as f64 * px * res;
    let min_y = MAX_WEB_MERCATOR - (coord.y + 1) as f64 * px * res;

    BoundingBox::new(min_x, min_y, max_x, max_y)
}

/// Converts Web Mercator coordinates to the tile containing them at `zoom`.
///
/// Returns `None` outside the Web Mercator extent or beyond [`MAX_ZOOM`].
/// Points on the eastern or southern world edge belong to the last column/row.
/// The result always satisfies
/// `web_mercator_tile_bounds(&tile).contains_point(x, y)`.
pub fn web_mercator_to_tile(x: f64, y: f64, zoom: u32) -> Option<TileCoord> {
    if zoom > MAX_ZOOM || !x.is_finite() || !y.is_finite() {
        return None;
    }
    if x.abs() > MAX_WEB_MERCATOR || y.abs() > MAX_WEB_MERCATOR {
        return None;
    }

    let n = tiles_per_axis(zoom);
    let px = TILE_SIZE_PX as f64;
    let world_px = px * n as f64;

    let x_px = (x + MAX_WEB_MERCATOR) / (2.0 * MAX_WEB_MERCATOR) * world_px;
    // Web Mercator Y is positive north, tile rows increase southward
    let y_px = (MAX_WEB_MERCATOR - y) / (2.0 * MAX_WEB_MERCATOR) * world_px;

    let mut col = ((x_px / px).floor() as u32).min(n - 1);
    let mut row = ((y_px / px).floor() as u32).min(n - 1);

    // The pixel division and the bounds formula round differently near tile
    // edges; step one tile over so the two stay exact inverses.
    let bounds = web_mercator_tile_bounds(&TileCoord::new(zoom, col, row));
    if x < bounds.min_x && col > 0 {
        col -= 1;
    } else if x > bounds.max_x && col < n - 1 {
        col += 1;
    }
    if y > bounds.max_y && row > 0 {
        row -= 1;
    } else if y < bounds.min_y && row < n - 1 {
        row += 1;
    }

    Some(TileCoord::new(zoom, col, row))
}
