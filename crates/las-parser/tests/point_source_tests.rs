//! Raw and LASzip point sources over synthetic files.

use bytes::Bytes;
use las_parser::vlr::{find_laszip, ogc_wkt};
use las_parser::{
    parse_and_validate, read_vlrs, LasError, LazPointSource, PointSource, RawPointSource,
};
use test_utils::{fixtures, init_test_tracing, LasBuilder};

fn collect<S: PointSource>(source: &mut S) -> Vec<Vec<u8>> {
    let mut records = Vec::new();
    while source.remaining() > 0 {
        records.push(source.next_record().unwrap().to_vec());
    }
    records
}

// ============================================================================
// VLRs
// ============================================================================

#[test]
fn test_vlrs_follow_header() {
    let data = Bytes::from(
        fixtures::two_point_builder()
            .with_vlr("custom", 7, b"payload")
            .with_wkt(fixtures::LAMBERT93_WKT)
            .build(),
    );
    let header = parse_and_validate(&data).unwrap();
    assert!(header.has_wkt_crs());

    let vlrs = read_vlrs(&data, &header).unwrap();
    assert_eq!(vlrs.len(), 2);
    assert_eq!(vlrs[0].user_id, "custom");
    assert_eq!(vlrs[0].record_id, 7);
    assert_eq!(&vlrs[0].data[..], b"payload");
    assert_eq!(ogc_wkt(&vlrs).as_deref(), Some(fixtures::LAMBERT93_WKT));
    assert!(find_laszip(&vlrs).is_none());
}

#[test]
fn test_laszip_vlr_found() {
    let data = Bytes::from(fixtures::two_point_builder().build_laz().unwrap());
    let header = parse_and_validate(&data).unwrap();
    assert!(header.is_compressed);

    let vlrs = read_vlrs(&data, &header).unwrap();
    let laszip = find_laszip(&vlrs).unwrap();
    assert!(laszip.is_laszip());
}

#[test]
fn test_truncated_vlr_block() {
    let data = fixtures::two_point_builder()
        .with_vlr("custom", 7, &[0u8; 64])
        .build();
    let data = Bytes::copy_from_slice(&data[..227 + 20]);
    let header = parse_and_validate(&data).unwrap();
    assert!(matches!(read_vlrs(&data, &header), Err(LasError::Decode(_))));
}

// ============================================================================
// Point sources
// ============================================================================

#[test]
fn test_raw_and_laz_yield_same_records() {
    init_test_tracing();
    let builder = LasBuilder::lambert93_survey(2_000);

    let raw = builder.build();
    let raw_header = parse_and_validate(&raw).unwrap();
    let mut raw_source = RawPointSource::new(&raw, &raw_header).unwrap();
    let raw_records = collect(&mut raw_source);

    let laz = Bytes::from(builder.build_laz().unwrap());
    let laz_header = parse_and_validate(&laz).unwrap();
    let vlrs = read_vlrs(&laz, &laz_header).unwrap();
    let mut laz_source = LazPointSource::new(&laz, &laz_header, &vlrs).unwrap();
    assert_eq!(laz_source.record_length(), 20);
    let laz_records = collect(&mut laz_source);

    assert_eq!(laz_source.decoded(), 2_000);
    assert_eq!(raw_records.len(), 2_000);
    assert_eq!(laz_records, raw_records);
}

#[test]
fn test_laz_source_stops_at_count() {
    let laz = Bytes::from(fixtures::two_point_builder().build_laz().unwrap());
    let header = parse_and_validate(&laz).unwrap();
    let vlrs = read_vlrs(&laz, &header).unwrap();
    let mut source = LazPointSource::new(&laz, &header, &vlrs).unwrap();

    source.next_record().unwrap();
    source.next_record().unwrap();
    assert_eq!(source.remaining(), 0);
    assert!(matches!(source.next_record(), Err(LasError::Decode(_))));
}

#[test]
fn test_laz_source_without_vlr() {
    let laz = Bytes::from(fixtures::two_point_builder().build_laz_without_vlr().unwrap());
    let header = parse_and_validate(&laz).unwrap();
    let vlrs = read_vlrs(&laz, &header).unwrap();
    assert!(matches!(
        LazPointSource::new(&laz, &header, &vlrs),
        Err(LasError::LazVlrNotFound)
    ));
}

#[test]
fn test_laz_record_length_mismatch() {
    let mut laz = fixtures::two_point_builder().build_laz().unwrap();
    // Header claims format 1 records; the LASzip items describe format 0
    laz[105..107].copy_from_slice(&28u16.to_le_bytes());
    let laz = Bytes::from(laz);
    let header = parse_and_validate(&laz).unwrap();
    let vlrs = read_vlrs(&laz, &header).unwrap();
    assert!(matches!(
        LazPointSource::new(&laz, &header, &vlrs),
        Err(LasError::LasZip(_))
    ));
}

#[test]
fn test_raw_source_truncated() {
    let mut data = fixtures::two_point_builder().build();
    data.truncate(data.len() - 1);
    let header = parse_and_validate(&data).unwrap();
    let err = RawPointSource::new(&data, &header).unwrap_err();
    assert!(err.to_string().starts_with("Point decode error"));
}
