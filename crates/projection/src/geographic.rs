//! Geographic "projection": longitude/latitude in degrees.

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};

/// Lon/lat pass-through in degrees (axis order lon, lat).
#[derive(Debug, Clone, PartialEq)]
pub struct Geographic {
    pub ellipsoid: Ellipsoid,
}

impl Geographic {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    /// Geodetic radians to degrees.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        Ok((lon.to_degrees(), lat.to_degrees()))
    }

    /// Degrees to geodetic radians.
    pub fn inverse(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(ProjectionError::OutOfDomain(format!(
                "longlat: latitude {} outside [-90, 90]",
                lat_deg
            )));
        }
        Ok((lon_deg.to_radians(), lat_deg.to_radians()))
    }
}
