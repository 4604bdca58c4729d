//! Header parsing and validation against files from the synthetic builder.
//!
//! These tests don't require test data files.

use las_parser::{parse_and_validate, parse_header, validate_header, LasError};
use test_utils::{fixtures, LasBuilder, SyntheticPoint};

// ============================================================================
// Field round-trip
// ============================================================================

#[test]
fn test_all_fields_roundtrip() {
    let guid = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32,
        0x10,
    ];
    let data = LasBuilder::new()
        .with_version(1, 2)
        .with_point_format(3)
        .with_file_source_id(42)
        .with_global_encoding(0x0001)
        .with_project_id(guid)
        .with_system_identifier("AIRBORNE SCANNER")
        .with_generating_software("synthetic 1.0")
        .with_creation_date(300, 2019)
        .with_scale([0.001, 0.002, 0.01])
        .with_offset([650_000.0, 6_860_000.0, -10.0])
        .with_bounds([650_001.0, 6_860_002.0, 12.5], [650_999.0, 6_860_998.0, 88.25])
        .with_point(SyntheticPoint::new(1, 2, 3, 4, 5))
        .with_point(SyntheticPoint::new(6, 7, 8, 9, 2))
        .build();

    let header = parse_and_validate(&data).unwrap();

    assert_eq!(header.file_signature, "LASF");
    assert_eq!(header.file_source_id, 42);
    assert_eq!(header.global_encoding, 1);
    assert_eq!(header.project_id, "0123456789abcdeffedcba9876543210");
    assert_eq!((header.version_major, header.version_minor), (1, 2));
    assert_eq!(header.system_identifier, "AIRBORNE SCANNER");
    assert_eq!(header.generating_software, "synthetic 1.0");
    assert_eq!(header.creation_day_of_year, 300);
    assert_eq!(header.creation_year, 2019);
    assert_eq!(header.header_size, 227);
    assert_eq!(header.offset_to_point_data, 227);
    assert_eq!(header.number_of_variable_length_records, 0);
    assert_eq!(header.point_data_record_format, 3);
    assert!(!header.is_compressed);
    assert_eq!(header.point_data_record_length, 34);
    assert_eq!(header.number_of_point_records, 2);
    assert_eq!(header.scale(), [0.001, 0.002, 0.01]);
    assert_eq!(header.offset(), [650_000.0, 6_860_000.0, -10.0]);
    assert_eq!(
        header.bounds(),
        (
            [650_001.0, 6_860_002.0, 12.5],
            [650_999.0, 6_860_998.0, 88.25]
        )
    );
    assert_eq!(header.max_x, 650_999.0);
    assert_eq!(header.min_z, 12.5);
    assert_eq!(header.start_of_waveform_data, None);
    assert_eq!(header.number_of_points_by_return_1_4, None);
}

#[test]
fn test_every_point_format_parses() {
    for format in 0..=10u8 {
        let data = fixtures::two_point_builder()
            .with_version(1, 4)
            .with_point_format(format)
            .build();
        let header = parse_and_validate(&data).unwrap();
        assert_eq!(header.point_data_record_format, format);
        assert_eq!(header.header_size, 375);
    }
}

#[test]
fn test_las_1_3_waveform_offset() {
    let data = fixtures::two_point_builder()
        .with_version(1, 3)
        .with_header_size(235)
        .build();
    let header = parse_and_validate(&data).unwrap();
    // The builder leaves the waveform pointer zeroed
    assert_eq!(header.start_of_waveform_data, Some(0));
    assert_eq!(header.start_of_first_evlr, None);
}

// ============================================================================
// LAS 1.4 point count
// ============================================================================

#[test]
fn test_las_1_4_count_overrides_legacy() {
    let data = fixtures::two_point_builder()
        .with_version(1, 4)
        .with_legacy_point_count(7)
        .with_point_count_1_4(5_000_000_000)
        .build();
    let header = parse_header(&data).unwrap();
    assert_eq!(header.legacy_number_of_point_records, 7);
    assert_eq!(header.number_of_point_records, 5_000_000_000);
    assert_eq!(header.number_of_evlrs, Some(0));
    assert!(header.number_of_points_by_return_1_4.is_some());
}

#[test]
fn test_las_1_4_zero_legacy_count() {
    // Large 1.4 files leave the 32-bit field at zero
    let data = fixtures::two_point_builder()
        .with_version(1, 4)
        .with_legacy_point_count(0)
        .build();
    let header = parse_and_validate(&data).unwrap();
    assert_eq!(header.number_of_point_records, 2);
}

#[test]
fn test_las_1_4_short_header_keeps_legacy_count() {
    let mut data = fixtures::two_point_builder()
        .with_version(1, 4)
        .with_legacy_point_count(2)
        .with_point_count_1_4(9)
        .build();
    // Declare a 1.2-sized header
    data[94..96].copy_from_slice(&227u16.to_le_bytes());
    let header = parse_header(&data).unwrap();
    assert_eq!(header.number_of_point_records, 2);
}

// ============================================================================
// Validation errors
// ============================================================================

#[test]
fn test_tampered_signature() {
    let mut data = fixtures::two_point_builder().build();
    data[3] = b'X';
    let err = parse_header(&data).unwrap_err();
    assert!(matches!(err, LasError::Format(_)));
    assert_eq!(err.to_string(), "Invalid LAS file signature");
}

#[test]
fn test_unsupported_version() {
    let data = fixtures::two_point_builder().with_version(2, 0).build();
    let err = parse_and_validate(&data).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported LAS version: 2.0");
}

#[test]
fn test_unsupported_format() {
    let data = fixtures::two_point_builder().with_point_format(11).build();
    let err = parse_and_validate(&data).unwrap_err();
    assert!(matches!(err, LasError::UnsupportedFormat(11)));
    assert_eq!(err.to_string(), "Unsupported point data record format: 11");
}

#[test]
fn test_empty_file() {
    let data = LasBuilder::new().build();
    let header = parse_header(&data).unwrap();
    assert!(matches!(validate_header(&header), Err(LasError::EmptyFile)));
}

#[test]
fn test_header_size_too_small() {
    let data = fixtures::two_point_builder().with_header_size(100).build();
    assert!(matches!(
        parse_and_validate(&data),
        Err(LasError::InvalidHeader(_))
    ));
}

#[test]
fn test_truncated_header() {
    let data = fixtures::two_point_builder().build();
    assert!(matches!(
        parse_header(&data[..200]),
        Err(LasError::InvalidHeader(_))
    ));
}
