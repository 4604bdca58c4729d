//! Point stream decoding.
//!
//! Two passes over the records: the first scales, reprojects and tracks the
//! bounds; the second, once the minimum is known, normalizes positions to
//! the cloud's own origin and remaps axes to (east, up, -north).

use las_parser::{LasError, LasHeader, PointSource, MIN_RECORD_LENGTH};
use lidar_common::Bounds3;
use projection::CrsTransformer;
use tracing::{debug, warn};

use crate::error::{IngestionError, Result};

/// Byte offsets of the fields read from every record.
const X_OFFSET: usize = 0;
const Y_OFFSET: usize = 4;
const Z_OFFSET: usize = 8;
const INTENSITY_OFFSET: usize = 12;
const CLASSIFICATION_OFFSET: usize = 15;

/// First point format whose classification is not at byte 15.
const EXTENDED_FORMAT: u8 = 6;

/// Output of [`decode_points`], structure-of-arrays.
#[derive(Debug, Clone, Default)]
pub struct DecodedPoints {
    /// (x, z, -y) per point, relative to the bounds minimum
    pub positions: Vec<f32>,
    pub classifications: Vec<u8>,
    pub intensities: Vec<u16>,
    /// Reprojected X/Y and original Z
    pub bounds: Bounds3,
}

impl DecodedPoints {
    pub fn len(&self) -> usize {
        self.classifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifications.is_empty()
    }
}

#[inline]
fn read_i32(record: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        record[offset],
        record[offset + 1],
        record[offset + 2],
        record[offset + 3],
    ])
}

/// Reserve room for `len` elements, failing instead of aborting on absurd
/// counts.
fn with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| {
        LasError::Decode(format!("cannot allocate buffers for {} values", len))
    })?;
    Ok(v)
}

/// Decode every record `source` yields into positions, classifications and
/// intensities, reprojecting X/Y with `transformer`.
pub fn decode_points<S: PointSource + ?Sized>(
    header: &LasHeader,
    source: &mut S,
    transformer: &CrsTransformer,
) -> Result<DecodedPoints> {
    let count = usize::try_from(header.number_of_point_records)
        .ok()
        .filter(|n| n.checked_mul(3).is_some())
        .ok_or_else(|| {
            LasError::Decode(format!(
                "{} points do not fit in memory",
                header.number_of_point_records
            ))
        })?;

    if source.record_length() < MIN_RECORD_LENGTH {
        return Err(IngestionError::Las(LasError::Decode(format!(
            "point records are {} bytes, need at least {}",
            source.record_length(),
            MIN_RECORD_LENGTH
        ))));
    }

    if header.point_data_record_format >= EXTENDED_FORMAT {
        warn!(
            point_format = header.point_data_record_format,
            "Classification read from byte 15, which holds flags in this point format"
        );
    }

    let scale = header.scale();
    let offset = header.offset();

    let mut world: Vec<f64> = with_capacity(count * 3)?;
    let mut classifications: Vec<u8> = with_capacity(count)?;
    let mut intensities: Vec<u16> = with_capacity(count)?;
    let mut bounds = Bounds3::empty();

    // Pass 1: scale, reproject, accumulate bounds
    for i in 0..count {
        let record = source.next_record()?;
        if record.len() < MIN_RECORD_LENGTH {
            return Err(IngestionError::Las(LasError::Decode(format!(
                "point {} record is {} bytes, need at least {}",
                i,
                record.len(),
                MIN_RECORD_LENGTH
            ))));
        }

        let raw_x = read_i32(record, X_OFFSET);
        let raw_y = read_i32(record, Y_OFFSET);
        let raw_z = read_i32(record, Z_OFFSET);
        let intensity =
            u16::from_le_bytes([record[INTENSITY_OFFSET], record[INTENSITY_OFFSET + 1]]);
        let classification = record[CLASSIFICATION_OFFSET];

        let x = raw_x as f64 * scale[0] + offset[0];
        let y = raw_y as f64 * scale[1] + offset[1];
        let z = raw_z as f64 * scale[2] + offset[2];

        let (tx, ty) = transformer.transform(x, y)?;
        if !(tx.is_finite() && ty.is_finite() && z.is_finite()) {
            return Err(IngestionError::Las(LasError::Decode(format!(
                "point {} at ({}, {}, {}) maps to non-finite ({}, {}, {})",
                i, x, y, z, tx, ty, z
            ))));
        }

        bounds.expand(tx, ty, z);
        world.extend_from_slice(&[tx, ty, z]);
        classifications.push(classification);
        intensities.push(intensity);
    }

    // Pass 2: normalize to the minimum and remap axes
    let [min_x, min_y, min_z] = bounds.min;
    let mut positions: Vec<f32> = with_capacity(count * 3)?;
    for p in world.chunks_exact(3) {
        positions.extend_from_slice(&[
            (p[0] - min_x) as f32,
            (p[2] - min_z) as f32,
            -((p[1] - min_y) as f32),
        ]);
    }

    debug!(
        point_count = count,
        min_x, min_y, min_z,
        max_x = bounds.max[0],
        max_y = bounds.max[1],
        max_z = bounds.max[2],
        "Decoded point records"
    );

    Ok(DecodedPoints {
        positions,
        classifications,
        intensities,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use las_parser::{parse_and_validate, RawPointSource};
    use test_utils::{fixtures, LasBuilder, SyntheticPoint};

    fn decode(data: &[u8], source_crs: &str, target_crs: &str) -> Result<DecodedPoints> {
        let header = parse_and_validate(data)?;
        let mut source = RawPointSource::new(data, &header)?;
        let transformer = CrsTransformer::new(source_crs, target_crs)?;
        decode_points(&header, &mut source, &transformer)
    }

    #[test]
    fn test_identity_decode() {
        let data = fixtures::two_point_builder().build();
        let points = decode(&data, "EPSG:2154", "EPSG:2154").unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points.positions, vec![0.0, 0.0, 0.0, 10.0, 5.0, -10.0]);
        assert_eq!(points.classifications, vec![2, 6]);
        assert_eq!(points.intensities, vec![100, 200]);
        assert_eq!(points.bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(points.bounds.max, [10.0, 10.0, 5.0]);
    }

    #[test]
    fn test_normalized_extremes() {
        let data = LasBuilder::lambert93_survey(100).build();
        let points = decode(&data, "EPSG:2154", "EPSG:3857").unwrap();

        assert_eq!(points.positions.len(), 300);
        let axis = |a: usize| points.positions.iter().skip(a).step_by(3).copied();
        assert_eq!(axis(0).fold(f32::INFINITY, f32::min), 0.0);
        assert_eq!(axis(1).fold(f32::INFINITY, f32::min), 0.0);
        // North maps to -Z, so the southern edge sits on zero
        assert_eq!(axis(2).fold(f32::NEG_INFINITY, f32::max), 0.0);
        assert!(points.positions.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_z_not_reprojected() {
        let data = LasBuilder::new()
            .with_offset([652_000.0, 6_862_000.0, 0.0])
            .with_point(SyntheticPoint::new(0, 0, 3_500, 0, 2))
            .with_point(SyntheticPoint::new(100, 100, 4_000, 0, 2))
            .build();
        let points = decode(&data, "EPSG:2154", "EPSG:3857").unwrap();
        assert_eq!(points.bounds.min[2], 35.0);
        assert_eq!(points.bounds.max[2], 40.0);
        assert_eq!(points.positions[4], 5.0);
    }

    #[test]
    fn test_truncated_records() {
        let mut data = fixtures::two_point_builder().build();
        data.truncate(data.len() - 4);
        let header = parse_and_validate(&data).unwrap();
        assert!(RawPointSource::new(&data, &header).is_err());
    }

    /// Yields fixed-size zeroed records without any header checks.
    struct FixedSource {
        record: Vec<u8>,
        remaining: u64,
    }

    impl PointSource for FixedSource {
        fn record_length(&self) -> usize {
            self.record.len()
        }

        fn remaining(&self) -> u64 {
            self.remaining
        }

        fn next_record(&mut self) -> las_parser::Result<&[u8]> {
            self.remaining = self.remaining.saturating_sub(1);
            Ok(&self.record)
        }
    }

    #[test]
    fn test_short_records_rejected() {
        let data = fixtures::two_point_builder().build();
        let header = parse_and_validate(&data).unwrap();
        let transformer = CrsTransformer::new("EPSG:2154", "EPSG:2154").unwrap();
        let mut source = FixedSource {
            record: vec![0; 8],
            remaining: 2,
        };

        let err = decode_points(&header, &mut source, &transformer).unwrap_err();
        match err {
            IngestionError::Las(LasError::Decode(msg)) => {
                assert!(msg.contains("8 bytes"), "{}", msg)
            }
            other => panic!("expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimum_record_length_accepted() {
        let data = fixtures::two_point_builder().build();
        let header = parse_and_validate(&data).unwrap();
        let transformer = CrsTransformer::new("EPSG:2154", "EPSG:2154").unwrap();
        let mut source = FixedSource {
            record: vec![0; MIN_RECORD_LENGTH],
            remaining: 2,
        };

        let points = decode_points(&header, &mut source, &transformer).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_unknown_crs() {
        let data = fixtures::two_point_builder().build();
        let err = decode(&data, "EPSG:2154", "EPSG:99999").unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Projection(projection::ProjectionError::UnknownCrs(_))
        ));
    }
}
