//! The decoded point cloud and its derived metadata.

use std::fmt;

use las_parser::vlr::ogc_wkt;
use las_parser::{LasHeader, Vlr};
use lidar_common::Bounds3;
use serde::{Deserialize, Serialize};

use crate::classification::classification_color;
use crate::config::PlacementConfig;
use crate::decoder::DecodedPoints;
use crate::error::Result;
use crate::placement::ScenePlacement;

/// Summary of a loaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub point_count: u64,
    /// Header box, source CRS
    pub bounds: Bounds3,
    /// Box of the reprojected points, target CRS (Z unchanged)
    pub target_bounds: Bounds3,
    pub point_format: u8,
    /// "M.m"
    pub version: String,
    /// "YYYY-DDD" or "Unknown"
    pub creation_date: String,
    pub system_identifier: String,
    pub generating_software: String,
    pub scale_factor: [f64; 3],
    pub offset: [f64; 3],
    pub source_crs: String,
    pub target_crs: String,
    pub project_id: String,
    pub compressed: bool,
    /// OGC WKT carried in the file's projection VLR, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs_wkt: Option<String>,
}

impl Metadata {
    pub(crate) fn new(
        header: &LasHeader,
        vlrs: &[Vlr],
        target_bounds: Bounds3,
        source_crs: &str,
        target_crs: &str,
    ) -> Self {
        let (min, max) = header.bounds();
        Self {
            point_count: header.number_of_point_records,
            bounds: Bounds3::new(min, max),
            target_bounds,
            point_format: header.point_data_record_format,
            version: header.version_string(),
            creation_date: header.creation_date_string(),
            system_identifier: header.system_identifier.clone(),
            generating_software: header.generating_software.clone(),
            scale_factor: header.scale(),
            offset: header.offset(),
            source_crs: source_crs.to_string(),
            target_crs: target_crs.to_string(),
            project_id: header.project_id.clone(),
            compressed: header.is_compressed,
            crs_wkt: ogc_wkt(vlrs),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Points:   {}", self.point_count)?;
        writeln!(
            f,
            "Format:   {}{}",
            self.point_format,
            if self.compressed { " (LAZ)" } else { "" }
        )?;
        writeln!(f, "Version:  {}", self.version)?;
        writeln!(f, "Created:  {}", self.creation_date)?;
        writeln!(
            f,
            "Bounds:   X {:.2}..{:.2}  Y {:.2}..{:.2}  Z {:.2}..{:.2} ({})",
            self.target_bounds.min[0],
            self.target_bounds.max[0],
            self.target_bounds.min[1],
            self.target_bounds.max[1],
            self.target_bounds.min[2],
            self.target_bounds.max[2],
            self.target_crs
        )?;
        writeln!(f, "System:   {}", self.system_identifier)?;
        writeln!(f, "Software: {}", self.generating_software)?;
        write!(
            f,
            "Scale:    {} {} {}",
            self.scale_factor[0], self.scale_factor[1], self.scale_factor[2]
        )
    }
}

/// A fully decoded point cloud.
///
/// Structure-of-arrays: point `i` has position `positions[3i..3i + 3]`,
/// classification `classifications[i]` and intensity `intensities[i]`.
/// Positions are local meters `(east, up, -north)` relative to the minimum of
/// [`Metadata::target_bounds`]. Immutable once built.
#[derive(Debug, Clone)]
pub struct PointCloud {
    header: LasHeader,
    vlrs: Vec<Vlr>,
    positions: Vec<f32>,
    classifications: Vec<u8>,
    intensities: Vec<u16>,
    metadata: Metadata,
}

impl PointCloud {
    pub(crate) fn new(
        header: LasHeader,
        vlrs: Vec<Vlr>,
        points: DecodedPoints,
        source_crs: &str,
        target_crs: &str,
    ) -> Self {
        let metadata = Metadata::new(&header, &vlrs, points.bounds, source_crs, target_crs);
        debug_assert_eq!(points.positions.len(), points.classifications.len() * 3);
        debug_assert_eq!(points.intensities.len(), points.classifications.len());

        Self {
            header,
            vlrs,
            positions: points.positions,
            classifications: points.classifications,
            intensities: points.intensities,
            metadata,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn header(&self) -> &LasHeader {
        &self.header
    }

    pub fn vlrs(&self) -> &[Vlr] {
        &self.vlrs
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn classifications(&self) -> &[u8] {
        &self.classifications
    }

    pub fn intensities(&self) -> &[u16] {
        &self.intensities
    }

    pub fn point_count(&self) -> usize {
        self.classifications.len()
    }

    /// RGB triplets (3 per point) from the ASPRS classification palette.
    pub fn classification_colors(&self) -> Vec<f32> {
        self.classifications
            .iter()
            .flat_map(|&code| classification_color(code))
            .collect()
    }

    /// Where the cloud sits in the tiled scene grid.
    pub fn placement(&self, config: &PlacementConfig) -> Result<ScenePlacement> {
        ScenePlacement::compute(&self.metadata, config)
    }
}
