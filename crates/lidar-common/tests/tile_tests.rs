//! Tile addressing tests over the whole Web Mercator plane.

use lidar_common::tile::{web_mercator_tile_bounds, web_mercator_to_tile};
use lidar_common::{Bounds3, TileCoord, MAX_WEB_MERCATOR, MAX_ZOOM};

// ============================================================================
// Inverse property: tile_bounds(to_tile(x, y, z)) contains (x, y)
// ============================================================================

/// Deterministic sample of planar coordinates spread over the world extent,
/// including both edges, the origin and values near tile boundaries.
fn sample_coordinates() -> Vec<(f64, f64)> {
    let mut coords = vec![
        (0.0, 0.0),
        (-MAX_WEB_MERCATOR, MAX_WEB_MERCATOR),
        (MAX_WEB_MERCATOR, -MAX_WEB_MERCATOR),
        (-MAX_WEB_MERCATOR, -MAX_WEB_MERCATOR),
        (MAX_WEB_MERCATOR, MAX_WEB_MERCATOR),
        // Paris in Web Mercator meters
        (261845.71, 6250564.35),
        // Lambert-93 origin area
        (333958.47, 5859142.74),
    ];

    let steps = 37;
    for i in 0..=steps {
        for j in 0..=steps {
            let fx = i as f64 / steps as f64;
            let fy = j as f64 / steps as f64;
            coords.push((
                -MAX_WEB_MERCATOR + fx * 2.0 * MAX_WEB_MERCATOR,
                -MAX_WEB_MERCATOR + fy * 2.0 * MAX_WEB_MERCATOR,
            ));
        }
    }
    coords
}

#[test]
fn test_tile_bounds_contains_source_point() {
    for zoom in 0..=MAX_ZOOM {
        for (x, y) in sample_coordinates() {
            let tile = web_mercator_to_tile(x, y, zoom)
                .unwrap_or_else(|| panic!("({}, {}) at z{} should map to a tile", x, y, zoom));
            let bounds = web_mercator_tile_bounds(&tile);
            assert!(
                bounds.contains_point(x, y),
                "z{} tile {:?} bounds {:?} do not contain ({}, {})",
                zoom,
                tile,
                bounds,
                x,
                y
            );
        }
    }
}

#[test]
fn test_points_on_tile_edges() {
    // Corners of every tile at zoom 4 map back into a tile that contains them
    let zoom = 4;
    for col in 0..16 {
        for row in 0..16 {
            let bounds = web_mercator_tile_bounds(&TileCoord::new(zoom, col, row));
            for (x, y) in [
                (bounds.min_x, bounds.max_y),
                (bounds.max_x, bounds.min_y),
            ] {
                let tile = web_mercator_to_tile(x, y, zoom).unwrap();
                assert!(web_mercator_tile_bounds(&tile).contains_point(x, y));
            }
        }
    }
}

#[test]
fn test_tile_size_halves_per_zoom() {
    let z10 = web_mercator_tile_bounds(&TileCoord::new(10, 0, 0));
    let z11 = web_mercator_tile_bounds(&TileCoord::new(11, 0, 0));
    assert!((z10.width() / z11.width() - 2.0).abs() < 1e-12);
    assert!((z10.height() / z11.height() - 2.0).abs() < 1e-12);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_serde_shapes() {
    let tile = TileCoord::new(19, 268410, 181780);
    let json = serde_json::to_string(&tile).unwrap();
    assert_eq!(json, r#"{"z":19,"x":268410,"y":181780}"#);

    let bounds = Bounds3::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
    let back: Bounds3 = serde_json::from_str(&serde_json::to_string(&bounds).unwrap()).unwrap();
    assert_eq!(back, bounds);
}
