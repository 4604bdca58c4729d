//! Loading from disk, configuration files and placement of loaded clouds.

use ingestion::{FileKind, IngestionError, Loader, LoaderConfig, Metadata, PlacementConfig};
use lidar_common::tile::web_mercator_tile_bounds;
use test_utils::{
    assert_approx_eq, fixtures, require_test_file, temp_test_dir, write_test_file, LasBuilder,
};

// ============================================================================
// File loading
// ============================================================================

#[tokio::test]
async fn test_load_las_and_laz_files() {
    let dir = temp_test_dir();
    let builder = LasBuilder::lambert93_survey(50);
    let las = write_test_file(dir.path(), "tile.las", &builder.build());
    let laz = write_test_file(dir.path(), "tile.LAZ", &builder.build_laz().unwrap());

    let loader = Loader::new();
    let a = loader.load_file(&las).await.unwrap();
    let b = loader.load_file(&laz).await.unwrap();

    assert_eq!(a.point_count(), 50);
    assert!(!a.metadata().compressed);
    assert!(b.metadata().compressed);
    assert_eq!(a.positions(), b.positions());
}

#[tokio::test]
async fn test_kind_detected_without_extension() {
    let dir = temp_test_dir();
    let laz = write_test_file(
        dir.path(),
        "download.bin",
        &fixtures::two_point_builder().build_laz().unwrap(),
    );
    let cloud = Loader::new().load_file(&laz).await.unwrap();
    assert_eq!(cloud.classifications(), &[2, 6]);
}

#[tokio::test]
async fn test_wrong_extension_fails_as_named() {
    // A raw file named .laz goes to the LAZ loader and has no LASzip VLR
    let dir = temp_test_dir();
    let path = write_test_file(dir.path(), "tile.laz", &fixtures::two_point_builder().build());
    let err = Loader::new().load_file(&path).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load LAZ file: laszip vlr not found");
}

#[tokio::test]
async fn test_missing_file() {
    let dir = temp_test_dir();
    let err = Loader::new()
        .load_file(dir.path().join("absent.laz"))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Failed to load LAZ file: Failed to read file"));
    assert!(matches!(err.cause(), IngestionError::FileRead(_)));
    assert!(matches!(err, IngestionError::LoadFailed { kind: FileKind::Laz, .. }));
}

#[tokio::test]
async fn test_survey_tile_if_present() {
    let path = require_test_file!("survey_tile.laz");
    let cloud = Loader::new().load_file(&path).await.unwrap();
    assert!(cloud.point_count() > 0);
    assert_eq!(cloud.positions().len(), cloud.point_count() * 3);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_yaml_config_file() {
    let dir = temp_test_dir();
    let path = write_test_file(
        dir.path(),
        "loader.yaml",
        b"source_crs: EPSG:2154\ntarget_crs: EPSG:3857\nplacement:\n  zoom_level: 18\n  patch_size: 32\n",
    );

    let config = LoaderConfig::from_yaml_file(&path).unwrap();
    assert_eq!(config.placement.zoom_level, 18);
    assert_eq!(config.placement.patch_size, 32.0);
    assert!(Loader::with_config(config).is_ok());
}

#[test]
fn test_yaml_config_missing_file() {
    let dir = temp_test_dir();
    let err = LoaderConfig::from_yaml_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, IngestionError::FileRead(_)));
}

// ============================================================================
// Placement and metadata of loaded clouds
// ============================================================================

#[tokio::test]
async fn test_placement_of_paris_cloud() {
    let data = fixtures::two_point_lambert93_builder().build();
    let dir = temp_test_dir();
    let path = write_test_file(dir.path(), "paris.las", &data);
    let cloud = Loader::new().load_file(&path).await.unwrap();

    let config = PlacementConfig::default();
    let placement = cloud.placement(&config).unwrap();
    let min = cloud.metadata().target_bounds.min;

    assert_eq!(placement.tile.z, 19);
    assert!(web_mercator_tile_bounds(&placement.tile).contains_point(min[0], min[1]));

    // The local origin lands inside the tile's patch
    let patch = config.patch_size;
    assert!(placement.position[0] >= placement.tile.x as f64 * patch);
    assert!(placement.position[0] <= (placement.tile.x + 1) as f64 * patch);
    assert!(placement.position[2] >= placement.tile.y as f64 * patch);
    assert!(placement.position[2] <= (placement.tile.y + 1) as f64 * patch);
    assert_eq!(placement.position[1], min[2]);

    // One tile span in meters maps to one patch
    let span = web_mercator_tile_bounds(&placement.tile).width();
    assert_approx_eq!(span * placement.scale[0], patch, 1e-6);
}

#[tokio::test]
async fn test_placement_needs_web_mercator() {
    let data = bytes::Bytes::from(fixtures::two_point_lambert93_builder().build());
    let cloud = ingestion::load_raw(data, None, Some("EPSG:4326")).await.unwrap();
    let err = cloud.placement(&PlacementConfig::default()).unwrap_err();
    assert!(matches!(err, IngestionError::Placement(_)));
}

#[tokio::test]
async fn test_metadata_json() {
    let data = bytes::Bytes::from(
        fixtures::two_point_lambert93_builder()
            .with_wkt(fixtures::LAMBERT93_WKT)
            .with_creation_date(182, 2023)
            .build(),
    );
    let cloud = ingestion::load_raw(data, None, None).await.unwrap();
    let json = cloud.metadata().to_json().unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["point_count"], 2);
    assert_eq!(value["creation_date"], "2023-182");
    assert_eq!(value["source_crs"], "EPSG:2154");
    assert_eq!(value["target_crs"], "EPSG:3857");
    assert!(value["crs_wkt"].as_str().unwrap().contains("Lambert-93"));

    let back: Metadata = serde_json::from_str(&json).unwrap();
    assert_eq!(back.point_count, 2);
}
