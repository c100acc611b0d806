//! End-to-end tests against synthetic tile directories.
//!
//! The main fixture is a 2x2 catalog at resolution 3: four constant
//! tiles (100/200/300/400 m) whose shared edges exercise the seam
//! trimming and the inverse mapping.

use std::path::Path;

use hgt::HgtTile;
use terrain::{Terrain, TerrainConfig, TerrainError, ViewQuery};

fn write_tile(dir: &Path, lat: i32, lon: i32, value: i16, resolution: usize) {
    let samples = vec![value; resolution * resolution];
    let tile = HgtTile::from_samples(resolution, samples).unwrap();
    hgt::write_file(dir.join(hgt::tile_name(lat, lon)), &tile).unwrap();
}

fn small_config(dir: &Path) -> TerrainConfig {
    TerrainConfig {
        resolution: 3,
        ..TerrainConfig::new(dir)
    }
}

/// Tiles A/B/C/D: north-west 100, north-east 200, south-west 300,
/// south-east 400. Covered box: lat [-1, 1), lon [-79, -77).
fn quad_fixture(dir: &Path) {
    write_tile(dir, 0, -79, 100, 3);
    write_tile(dir, 0, -78, 200, 3);
    write_tile(dir, -1, -79, 300, 3);
    write_tile(dir, -1, -78, 400, 3);
}

#[test]
fn mosaic_size_matches_effective_counts() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    let mosaic = terrain.build_mosaic();

    // Non-terminal cells contribute resolution - 1 samples per axis.
    assert_eq!(mosaic.rows(), 2 + 3);
    assert_eq!(mosaic.cols(), 2 + 3);
}

#[test]
fn seams_keep_exactly_one_copy_of_shared_edges() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    let mosaic = terrain.build_mosaic();

    // Columns 0-1 come from the west tiles, 2-4 from the east; the
    // west tile's trimmed last column leaves the east tile's copy as
    // the only one on the seam. Same for the row seam.
    assert_eq!(mosaic.get(0, 1), 100);
    assert_eq!(mosaic.get(0, 2), 200);
    assert_eq!(mosaic.get(1, 4), 200);
    assert_eq!(mosaic.get(2, 0), 300);
    assert_eq!(mosaic.get(2, 2), 400);
    assert_eq!(mosaic.get(4, 4), 400);
}

#[test]
fn inverse_mapping_lands_in_the_containing_tile() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    // Spot checks in each quadrant's interior.
    assert_eq!(terrain.elevation_at(0.5, -78.5).unwrap(), 100.0);
    assert_eq!(terrain.elevation_at(0.5, -77.5).unwrap(), 200.0);
    assert_eq!(terrain.elevation_at(-0.5, -78.5).unwrap(), 300.0);
    assert_eq!(terrain.elevation_at(-0.5, -77.5).unwrap(), 400.0);

    // A grid of points strictly inside the covered box must always
    // read the constant of the tile that contains them.
    for i in 1..10 {
        for j in 1..10 {
            let lat = -1.0 + 0.2 * i as f64 + 0.01;
            let lon = -79.0 + 0.2 * j as f64 + 0.01;
            let expected = match (lat >= 0.0, lon >= -78.0) {
                (true, false) => 100.0,
                (true, true) => 200.0,
                (false, false) => 300.0,
                (false, true) => 400.0,
            };
            assert_eq!(
                terrain.elevation_at(lat, lon).unwrap(),
                expected,
                "at ({lat}, {lon})"
            );
        }
    }
}

#[test]
fn boundary_coordinates_clamp_into_the_last_cell() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    // Exactly at the max covered cells: no index error, clamped lookup.
    assert_eq!(terrain.elevation_at(0.0, -78.0).unwrap(), 200.0);
    // Just inside the open upper bounds.
    assert!(terrain.elevation_at(0.999_999, -77.000_001).is_ok());
    // Southern/western closed edges.
    assert_eq!(terrain.elevation_at(-1.0, -79.0).unwrap(), 300.0);
}

#[test]
fn out_of_range_coordinates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    for (lat, lon) in [(1.0, -78.5), (-1.5, -78.5), (0.5, -80.0), (0.5, -77.0)] {
        match terrain.elevation_at(lat, lon) {
            Err(TerrainError::OutOfRange { .. }) => {}
            other => panic!("expected OutOfRange at ({lat}, {lon}), got {other:?}"),
        }
    }
}

#[test]
fn querying_before_assembly_fails_with_not_built() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    match terrain.elevation_at(0.5, -78.5) {
        Err(TerrainError::NotBuilt) => {}
        other => panic!("expected NotBuilt, got {other:?}"),
    }
    match terrain.extract_view(&ViewQuery::new(0.5, -78.5)) {
        Err(TerrainError::NotBuilt) => {}
        other => panic!("expected NotBuilt, got {other:?}"),
    }
}

#[test]
fn rebuilding_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    let first = terrain.build_mosaic();
    let second = terrain.build_mosaic();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn void_tiles_read_as_sea_level() {
    let dir = tempfile::tempdir().unwrap();
    let tile = HgtTile::voided(3);
    hgt::write_file(dir.path().join(hgt::tile_name(0, -79)), &tile).unwrap();

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    for lat in [0.1, 0.5, 0.9] {
        for lon in [-78.9, -78.5, -78.1] {
            assert_eq!(terrain.elevation_at(lat, lon).unwrap(), 0.0);
        }
    }
}

#[test]
fn unreadable_tile_degrades_to_voids_not_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_tile(dir.path(), 0, -79, 100, 3);
    // Truncated garbage where the eastern tile should be.
    std::fs::write(dir.path().join(hgt::tile_name(0, -78)), b"nope").unwrap();

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    assert_eq!(terrain.elevation_at(0.5, -78.5).unwrap(), 100.0);
    assert_eq!(terrain.elevation_at(0.5, -77.5).unwrap(), 0.0);
}

#[test]
fn missing_cells_inside_the_bounding_box_are_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    // Sparse catalog: only the corners of a 1x3 strip exist.
    write_tile(dir.path(), 0, -80, 10, 3);
    write_tile(dir.path(), 0, -78, 30, 3);

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    assert_eq!(terrain.elevation_at(0.5, -79.5).unwrap(), 10.0);
    match terrain.elevation_at(0.5, -78.5) {
        Err(TerrainError::OutOfRange { .. }) => {}
        other => panic!("expected OutOfRange over the gap, got {other:?}"),
    }
}

#[test]
fn view_extraction_is_deterministic_and_centered() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    // radius 200 km at resolution 3: meters_per_index = 55_500,
    // radius_idx = 3, stride 1; the observer sits at (row 0, col 0),
    // so the clamped slice is rows 0..3 x cols 0..3.
    let query = ViewQuery {
        view_radius_km: 200.0,
        ..ViewQuery::new(0.5, -78.5)
    };

    let region = terrain.extract_view(&query).unwrap();
    assert_eq!(region.mesh_rows, 3);
    assert_eq!(region.mesh_cols, 3);
    assert_eq!(region.info.rendered_points, 9);
    assert_eq!(region.info.terrain_height_m, 100.0);
    assert_eq!(region.info.observer_height_m, 100.5);
    assert_eq!(region.info.min_elevation_m, 100.0);
    assert_eq!(region.info.max_elevation_m, 400.0);
    assert_eq!(region.info.coordinates, (0.5, -78.5));
    assert_eq!(region.info.cardinal_direction.label(), "East");

    // Observer at the local origin, elevation in km on z.
    let origin = &region.points[0];
    assert_eq!(origin.position_km, [0.0, 0.0, 0.1]);
    assert_eq!(origin.elevation_norm, 0.0);
    // South-east corner of the mesh reads tile D.
    let far = &region.points[8];
    assert!((far.position_km[2] - 0.4).abs() < 1e-6);
    assert_eq!(far.elevation_norm, 1.0);

    // Default azimuth 90: camera west of the observer, focal east.
    let [cx, cy, cz] = region.camera.position_km;
    assert!((cx + 80.0).abs() < 1e-9);
    assert!(cy.abs() < 1e-6);
    assert!((cz - 0.2005).abs() < 1e-9);
    let [fx, _, fz] = region.camera.focal_point_km;
    assert!((fx - 20.0).abs() < 1e-9);
    assert!((fz - 0.09045).abs() < 1e-9);
    assert_eq!(region.camera.clipping_range_km, (0.001, 500.0));

    // No hidden randomness: identical inputs, identical region.
    let again = terrain.extract_view(&query).unwrap();
    assert_eq!(region, again);
}

#[test]
fn degenerate_radius_yields_empty_region() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();
    terrain.build_mosaic();

    let query = ViewQuery {
        view_radius_km: 0.0,
        ..ViewQuery::new(0.5, -78.5)
    };
    match terrain.extract_view(&query) {
        Err(TerrainError::EmptyRegion) => {}
        other => panic!("expected EmptyRegion, got {other:?}"),
    }
}

#[test]
fn background_assembly_and_concurrent_queries() {
    let dir = tempfile::tempdir().unwrap();
    quad_fixture(dir.path());

    let terrain = Terrain::open(small_config(dir.path())).unwrap();

    // Assembly on a worker thread; the caller just waits for the join.
    std::thread::scope(|scope| {
        scope.spawn(|| {
            terrain.build_mosaic();
        });
    });

    // Pure reads against the immutable mosaic from several threads.
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(terrain.elevation_at(-0.5, -77.5).unwrap(), 400.0);
            });
        }
    });
}
