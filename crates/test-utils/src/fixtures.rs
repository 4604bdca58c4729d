//! Common test fixtures for LIDAR ingestion tests.
//!
//! This module provides pre-defined reference data: coordinates in the
//! built-in reference systems and the small synthetic files the loaders are
//! checked against.

use crate::generators::{LasBuilder, SyntheticPoint};

/// Lambert-93 (EPSG:2154) reference coordinates.
pub mod lambert93 {
    /// False origin: lon 3°E, lat 46.5°N
    pub const ORIGIN: (f64, f64) = (700_000.0, 6_600_000.0);

    /// Paris, Île de la Cité (approximate)
    pub const PARIS: (f64, f64) = (652_000.0, 6_862_000.0);

    /// Points spread over metropolitan France
    pub const SAMPLE_POINTS: &[(f64, f64)] = &[
        (700_000.0, 6_600_000.0),
        (652_000.0, 6_862_000.0),
        (1_045_000.0, 6_298_000.0), // Nice
        (351_000.0, 6_790_000.0),   // Rennes
        (418_000.0, 6_420_000.0),   // Bordeaux
        (893_000.0, 6_247_000.0),   // Marseille
        (1_050_000.0, 6_840_000.0), // Strasbourg
        (704_000.0, 7_059_000.0),   // Lille
        (574_000.0, 6_279_000.0),   // Toulouse
        (157_000.0, 6_838_000.0),   // Brest
    ];
}

/// Web Mercator (EPSG:3857) reference coordinates.
pub mod web_mercator {
    /// Paris (2.3522°E, 48.8566°N)
    pub const PARIS: (f64, f64) = (261_845.71, 6_250_564.35);
}

/// ASPRS classification codes used in synthetic data.
pub mod classification {
    pub const UNCLASSIFIED: u8 = 1;
    pub const GROUND: u8 = 2;
    pub const LOW_VEGETATION: u8 = 3;
    pub const HIGH_VEGETATION: u8 = 5;
    pub const BUILDING: u8 = 6;
    pub const WATER: u8 = 9;
}

/// Two points, raw (0, 0, 0) and (1000, 1000, 500), scale 0.01, offset 0.
pub fn two_point_builder() -> LasBuilder {
    LasBuilder::new()
        .with_scale([0.01, 0.01, 0.01])
        .with_offset([0.0, 0.0, 0.0])
        .with_point(SyntheticPoint::new(0, 0, 0, 100, classification::GROUND))
        .with_point(SyntheticPoint::new(
            1000,
            1000,
            500,
            200,
            classification::BUILDING,
        ))
}

/// [`two_point_builder`] placed in the Lambert-93 survey area so it lands
/// inside France after reprojection.
pub fn two_point_lambert93_builder() -> LasBuilder {
    two_point_builder().with_offset([lambert93::PARIS.0, lambert93::PARIS.1, 0.0])
}

/// OGC WKT for Lambert-93, abbreviated.
pub const LAMBERT93_WKT: &str = "PROJCS[\"RGF93 v1 / Lambert-93\",GEOGCS[\"RGF93 v1\",\
DATUM[\"Reseau_Geodesique_Francais_1993_v1\",SPHEROID[\"GRS 1980\",6378137,298.257222101]]],\
PROJECTION[\"Lambert_Conformal_Conic_2SP\"],AUTHORITY[\"EPSG\",\"2154\"]]";
