//! Mercator projection (normal aspect).
//!
//! With `a == b` this is the spherical "Web Mercator" used by XYZ tile
//! providers (EPSG:3857): geodetic latitudes are fed straight into the
//! spherical formulas, which is what makes it non-conformal on the ellipsoid.

use crate::ellipsoid::{adjust_lon, Ellipsoid};
use crate::error::{ProjectionError, Result};
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in radians
    pub lon0: f64,
    pub x0: f64,
    pub y0: f64,
    /// Scale factor on the equator (derived from `lat_ts` when given)
    pub k0: f64,
}

impl Mercator {
    pub fn new(ellipsoid: Ellipsoid, lon0_deg: f64, x0: f64, y0: f64, k0: f64) -> Self {
        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            x0,
            y0,
            k0,
        }
    }

    /// Variant parameterised by latitude of true scale instead of `k0`.
    pub fn with_true_scale(ellipsoid: Ellipsoid, lat_ts_deg: f64, lon0_deg: f64, x0: f64, y0: f64) -> Self {
        let (sin_ts, cos_ts) = lat_ts_deg.to_radians().sin_cos();
        let k0 = ellipsoid.msfn(sin_ts, cos_ts);
        Self::new(ellipsoid, lon0_deg, x0, y0, k0)
    }

    /// Spherical Web Mercator on the WGS84 semi-major axis.
    pub fn web_mercator() -> Self {
        Self::new(Ellipsoid::sphere(6378137.0), 0.0, 0.0, 0.0, 1.0)
    }

    fn scale(&self) -> f64 {
        self.ellipsoid.a * self.k0
    }

    /// Geodetic (lon, lat) in radians to projected (x, y) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        if lat.abs() >= FRAC_PI_2 {
            return Err(ProjectionError::OutOfDomain(format!(
                "merc: latitude {:.6} at or beyond the pole",
                lat.to_degrees()
            )));
        }
        let x = self.x0 + self.scale() * adjust_lon(lon - self.lon0);
        let y = self.y0 - self.scale() * self.ellipsoid.tsfn(lat).ln();
        Ok((x, y))
    }

    /// Projected (x, y) meters to geodetic (lon, lat) in radians.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let ts = (-(y - self.y0) / self.scale()).exp();
        let lat = self.ellipsoid.phi_from_ts(ts).ok_or_else(|| {
            ProjectionError::OutOfDomain(format!("merc: no latitude for y = {}", y))
        })?;
        let lon = adjust_lon((x - self.x0) / self.scale() + self.lon0);
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidar_common::MAX_WEB_MERCATOR;

    #[test]
    fn test_web_mercator_extent() {
        let proj = Mercator::web_mercator();

        let (x, y) = proj.forward(180f64.to_radians(), 0.0).unwrap();
        assert!((x - MAX_WEB_MERCATOR).abs() < 1e-6);
        assert_eq!(y, 0.0);

        // The square world clips at ~85.0511 degrees
        let (_, y) = proj.forward(0.0, 85.0511287798066f64.to_radians()).unwrap();
        assert!((y - MAX_WEB_MERCATOR).abs() < 0.01, "y = {}", y);
    }

    #[test]
    fn test_web_mercator_matches_spherical_formula() {
        let proj = Mercator::web_mercator();
        let lat = 48.8566f64.to_radians();
        let (_, y) = proj.forward(0.0, lat).unwrap();
        let expected = 6378137.0 * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        assert!((y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ellipsoidal_roundtrip() {
        let proj = Mercator::with_true_scale(Ellipsoid::wgs84(), 0.0, 0.0, 0.0, 0.0);
        for (lon, lat) in [(2.35_f64, 48.85_f64), (-70.0, -33.4), (179.0, 80.0)] {
            let (x, y) = proj.forward(lon.to_radians(), lat.to_radians()).unwrap();
            let (blon, blat) = proj.inverse(x, y).unwrap();
            assert!((blon.to_degrees() - lon).abs() < 1e-9);
            assert!((blat.to_degrees() - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pole_out_of_domain() {
        let proj = Mercator::web_mercator();
        assert!(matches!(
            proj.forward(0.0, FRAC_PI_2),
            Err(ProjectionError::OutOfDomain(_))
        ));
    }
}
