//! Lambert Conformal Conic projection (ellipsoidal, two standard parallels).
//!
//! This is the projection behind Lambert-93 (EPSG:2154), the national grid
//! most French LIDAR surveys are delivered in. It maps a cone secant to the
//! ellipsoid along the two standard parallels onto a flat plane.
//!
//! The projection parameters include:
//! - Latitude of origin (lat0) and central meridian (lon0)
//! - Standard parallels lat1 and lat2 (equal for a tangent cone)
//! - False easting / northing (x0, y0) in meters
//! - Scale factor k0 (1.0 for secant cones)
//!
//! Reference: Snyder, "Map Projections: A Working Manual", eq. 15-1 to 15-11.

use crate::ellipsoid::{adjust_lon, Ellipsoid};
use crate::error::{ProjectionError, Result};
use std::f64::consts::FRAC_PI_2;

const EPS: f64 = 1e-10;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LambertConformal {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub lat1: f64,
    /// Second standard parallel in radians
    pub lat2: f64,
    /// False easting (meters)
    pub x0: f64,
    /// False northing (meters)
    pub y0: f64,
    pub k0: f64,
    /// Cone constant (n)
    n: f64,
    /// `a * k0 * F`
    c: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from angles in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        x0: f64,
        y0: f64,
        k0: f64,
    ) -> Result<Self> {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();

        if (lat1 + lat2).abs() < EPS {
            return Err(ProjectionError::Unsupported(
                "lcc standard parallels symmetric about the equator".to_string(),
            ));
        }
        if lat1.abs() > FRAC_PI_2 || lat2.abs() > FRAC_PI_2 || lat0.abs() > FRAC_PI_2 {
            return Err(ProjectionError::Unsupported(
                "lcc latitude outside [-90, 90]".to_string(),
            ));
        }

        let (sin1, cos1) = lat1.sin_cos();
        let m1 = ellipsoid.msfn(sin1, cos1);
        let t1 = ellipsoid.tsfn(lat1);

        // Compute cone constant n
        let n = if (lat1 - lat2).abs() >= EPS {
            // Secant cone (two standard parallels)
            let (sin2, cos2) = lat2.sin_cos();
            let m2 = ellipsoid.msfn(sin2, cos2);
            let t2 = ellipsoid.tsfn(lat2);
            (m1 / m2).ln() / (t1 / t2).ln()
        } else {
            // Tangent cone (single standard parallel)
            sin1
        };

        let f = m1 / (n * t1.powf(n));
        let c = ellipsoid.a * k0 * f;
        let rho0 = if (lat0.abs() - FRAC_PI_2).abs() < EPS {
            0.0
        } else {
            c * ellipsoid.tsfn(lat0).powf(n)
        };

        Ok(Self {
            ellipsoid,
            lon0,
            lat0,
            lat1,
            lat2,
            x0,
            y0,
            k0,
            n,
            c,
            rho0,
        })
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Geodetic (lon, lat) in radians to projected (x, y) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let rho = if (lat.abs() - FRAC_PI_2).abs() < EPS {
            // The apex pole maps to the cone tip; the opposite pole is at infinity
            if lat * self.n <= 0.0 {
                return Err(ProjectionError::OutOfDomain(format!(
                    "lcc: latitude {:.6} maps to infinity",
                    lat.to_degrees()
                )));
            }
            0.0
        } else {
            self.c * self.ellipsoid.tsfn(lat).powf(self.n)
        };

        let theta = self.n * adjust_lon(lon - self.lon0);
        let x = self.x0 + rho * theta.sin();
        let y = self.y0 + self.rho0 - rho * theta.cos();
        Ok((x, y))
    }

    /// Projected (x, y) meters to geodetic (lon, lat) in radians.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut dx = x - self.x0;
        let mut dy = self.rho0 - (y - self.y0);
        let mut rho = dx.hypot(dy);
        if self.n < 0.0 {
            rho = -rho;
            dx = -dx;
            dy = -dy;
        }

        if rho == 0.0 {
            let lat = if self.n > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Ok((self.lon0, lat));
        }

        let ts = (rho / self.c).powf(1.0 / self.n);
        let lat = self.ellipsoid.phi_from_ts(ts).ok_or_else(|| {
            ProjectionError::OutOfDomain(format!("lcc: no latitude for ({}, {})", x, y))
        })?;
        let lon = adjust_lon(dx.atan2(dy) / self.n + self.lon0);
        Ok((lon, lat))
    }
}
