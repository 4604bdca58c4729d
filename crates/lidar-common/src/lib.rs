//! Common types and utilities shared across the lidar ingestion crates.

pub mod bbox;
pub mod crs;
pub mod tile;

pub use bbox::{BoundingBox, Bounds3};
pub use crs::CrsCode;
pub use tile::{TileCoord, EARTH_RADIUS, MAX_WEB_MERCATOR, MAX_ZOOM, TILE_SIZE_PX};
