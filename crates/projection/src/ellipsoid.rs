//! Reference ellipsoids and the conformal-latitude helpers shared by the
//! conic and cylindrical projections.

use std::f64::consts::FRAC_PI_2;

/// Convergence tolerance for the inverse latitude iteration (radians).
const PHI_TOLERANCE: f64 = 1e-12;
const PHI_MAX_ITERATIONS: usize = 15;

/// An ellipsoid of revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Semi-minor axis (meters)
    pub b: f64,
    /// First eccentricity squared
    pub es: f64,
    /// First eccentricity
    pub e: f64,
}

impl Ellipsoid {
    /// Build from the two semi-axes.
    pub fn from_axes(a: f64, b: f64) -> Self {
        let es = if a > 0.0 { 1.0 - (b * b) / (a * a) } else { 0.0 };
        let es = es.max(0.0);
        Self {
            a,
            b,
            es,
            e: es.sqrt(),
        }
    }

    /// Build from the semi-major axis and inverse flattening.
    pub fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        if rf == 0.0 {
            return Self::sphere(a);
        }
        let f = 1.0 / rf;
        Self::from_axes(a, a * (1.0 - f))
    }

    pub fn sphere(radius: f64) -> Self {
        Self::from_axes(radius, radius)
    }

    /// GRS 1980, used by RGF93 / Lambert-93.
    pub fn grs80() -> Self {
        Self::from_inverse_flattening(6378137.0, 298.257222101)
    }

    pub fn wgs84() -> Self {
        Self::from_inverse_flattening(6378137.0, 298.257223563)
    }

    /// Look up a named ellipsoid as accepted by `+ellps=`.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GRS80" => Some(Self::grs80()),
            "WGS84" => Some(Self::wgs84()),
            "SPHERE" => Some(Self::sphere(6370997.0)),
            _ => None,
        }
    }

    pub fn is_sphere(&self) -> bool {
        self.es == 0.0
    }

    /// `m(φ) = cos φ / sqrt(1 - e² sin² φ)`
    pub(crate) fn msfn(&self, sinphi: f64, cosphi: f64) -> f64 {
        cosphi / (1.0 - self.es * sinphi * sinphi).sqrt()
    }

    /// `t(φ) = tan(π/4 - φ/2) / ((1 - e sin φ) / (1 + e sin φ))^(e/2)`
    pub(crate) fn tsfn(&self, phi: f64) -> f64 {
        let sinphi = phi.sin();
        let con = self.e * sinphi;
        (0.5 * (FRAC_PI_2 - phi)).tan() / ((1.0 - con) / (1.0 + con)).powf(0.5 * self.e)
    }

    /// Invert [`Ellipsoid::tsfn`] by fixed-point iteration.
    ///
    /// Returns `None` if the iteration fails to converge.
    pub(crate) fn phi_from_ts(&self, ts: f64) -> Option<f64> {
        let half_e = 0.5 * self.e;
        let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
        for _ in 0..PHI_MAX_ITERATIONS {
            let con = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan();
            let delta = next - phi;
            phi = next;
            if delta.abs() <= PHI_TOLERANCE {
                return Some(phi);
            }
        }
        None
    }
}

/// Wrap a longitude difference into [-π, π].
///
/// Runs in constant time for any finite input; +π stays +π.
pub(crate) fn adjust_lon(lon: f64) -> f64 {
    use std::f64::consts::PI;
    if !lon.is_finite() || (-PI..=PI).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI && lon > 0.0 {
        PI
    } else {
        wrapped
    }
}
