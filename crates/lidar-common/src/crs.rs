//! Coordinate Reference System names and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known CRS codes with built-in definitions.
///
/// Any other CRS can still be registered with the projection registry by name;
/// these are the ones the loaders default to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// RGF93 / Lambert-93 (meters)
    Epsg2154,
    /// Web Mercator (meters, spherical)
    Epsg3857,
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
}

impl CrsCode {
    /// Parse a CRS name.
    ///
    /// Accepts formats like:
    /// - "EPSG:2154"
    /// - "epsg:3857"
    /// - "CRS:84" (EPSG:4326 with lon/lat axis order)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:2154" => Ok(CrsCode::Epsg2154),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Canonical registry name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrsCode::Epsg2154 => "EPSG:2154",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4326 => "EPSG:4326",
        }
    }

    /// PROJ-style definition string registered for this code.
    pub fn proj_definition(&self) -> &'static str {
        match self {
            CrsCode::Epsg2154 => {
                "+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 \
                 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs +type=crs"
            }
            CrsCode::Epsg3857 => {
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
                 +units=m +nadgrids=@null +wktext +no_defs +type=crs"
            }
            CrsCode::Epsg4326 => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
        }
    }

    /// Alternate names that resolve to this code.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CrsCode::Epsg2154 => &[],
            CrsCode::Epsg3857 => &["EPSG:900913"],
            CrsCode::Epsg4326 => &["CRS:84"],
        }
    }

    /// All built-in codes.
    pub fn all() -> [CrsCode; 3] {
        [CrsCode::Epsg2154, CrsCode::Epsg3857, CrsCode::Epsg4326]
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
