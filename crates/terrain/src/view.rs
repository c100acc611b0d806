use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::DVec3;
use serde::Serialize;

use crate::config::{APPROX_METERS_PER_DEGREE, DEFAULT_FIELD_OF_VIEW_DEG, DEFAULT_VIEW_RADIUS_KM};
use crate::error::{Result, TerrainError};
use crate::mosaic::Mosaic;

/// Narrowest camera view angle the renderer supports, degrees.
pub const MIN_FIELD_OF_VIEW_DEG: f64 = 10.0;

/// Widest camera view angle the renderer supports, degrees.
pub const MAX_FIELD_OF_VIEW_DEG: f64 = 120.0;

/// One horizon query: observer position plus view parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ViewQuery {
    /// Observer latitude, decimal degrees.
    pub lat: f64,
    /// Observer longitude, decimal degrees.
    pub lon: f64,
    /// View direction, degrees; 0 = north, clockwise.
    pub azimuth_deg: f64,
    /// Camera view angle, degrees.
    pub field_of_view_deg: f64,
    /// How far the extracted region reaches, kilometers.
    pub view_radius_km: f64,
    /// Optional descriptive name carried through to the metadata.
    pub location_name: Option<String>,
}

impl ViewQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            azimuth_deg: 90.0,
            field_of_view_deg: DEFAULT_FIELD_OF_VIEW_DEG,
            view_radius_km: DEFAULT_VIEW_RADIUS_KM,
            location_name: None,
        }
    }
}

/// One vertex of the extracted surface, ready for GPU upload.
///
/// Coordinates are kilometers in a local frame with the observer at the
/// origin; z is elevation. `elevation_norm` is the [0, 1] color scalar.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct MeshPoint {
    pub position_km: [f32; 3],
    pub elevation_norm: f32,
}

/// Eight-wind compass sector, North-centered, clockwise in 45° steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardinalDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CardinalDirection {
    /// Maps an azimuth angle in degrees to its compass sector.
    pub fn from_azimuth(angle_deg: f64) -> Self {
        const DIRS: [CardinalDirection; 8] = [
            CardinalDirection::North,
            CardinalDirection::Northeast,
            CardinalDirection::East,
            CardinalDirection::Southeast,
            CardinalDirection::South,
            CardinalDirection::Southwest,
            CardinalDirection::West,
            CardinalDirection::Northwest,
        ];
        let idx = ((angle_deg.rem_euclid(360.0) + 22.5) / 45.0).floor() as usize % 8;
        DIRS[idx]
    }

    pub fn label(self) -> &'static str {
        match self {
            CardinalDirection::North => "North",
            CardinalDirection::Northeast => "Northeast",
            CardinalDirection::East => "East",
            CardinalDirection::Southeast => "Southeast",
            CardinalDirection::South => "South",
            CardinalDirection::Southwest => "Southwest",
            CardinalDirection::West => "West",
            CardinalDirection::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Camera placement for a horizon view, in the same observer-centered
/// kilometer frame as the mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewCamera {
    pub position_km: [f64; 3],
    pub focal_point_km: [f64; 3],
    pub up: [f64; 3],
    pub clipping_range_km: (f64, f64),
    pub field_of_view_deg: f64,
}

impl ViewCamera {
    /// Places the camera behind and above the observer along the
    /// reverse azimuth at 0.4 x radius, and the focal point ahead at
    /// 0.1 x radius, slightly below eye level so the view tilts down.
    pub fn for_observer(
        azimuth_deg: f64,
        field_of_view_deg: f64,
        view_radius_km: f64,
        observer_height_m: f64,
    ) -> Self {
        let (sin_az, cos_az) = azimuth_deg.to_radians().sin_cos();
        let height_km = observer_height_m / 1000.0;

        let camera_distance_km = view_radius_km * 0.4;
        let position = DVec3::new(
            -camera_distance_km * sin_az,
            -camera_distance_km * cos_az,
            height_km + 0.1,
        );

        let focal_distance_km = view_radius_km * 0.1;
        let focal = DVec3::new(
            focal_distance_km * sin_az,
            focal_distance_km * cos_az,
            height_km * 0.9,
        );

        Self {
            position_km: position.into(),
            focal_point_km: focal.into(),
            up: [0.0, 0.0, 1.0],
            clipping_range_km: (0.001, view_radius_km * 2.5),
            field_of_view_deg,
        }
    }

    /// Re-aims at a new azimuth, preserving the current horizontal
    /// camera and focal distances and their heights.
    pub fn retarget(&mut self, azimuth_deg: f64) {
        let (sin_az, cos_az) = azimuth_deg.to_radians().sin_cos();

        let camera_distance = DVec3::from(self.position_km).truncate().length();
        let focal_distance = DVec3::from(self.focal_point_km).truncate().length();

        self.position_km = [
            -camera_distance * sin_az,
            -camera_distance * cos_az,
            self.position_km[2],
        ];
        self.focal_point_km = [
            focal_distance * sin_az,
            focal_distance * cos_az,
            self.focal_point_km[2],
        ];
    }

    /// Adjusts the view angle, clamped to the supported range.
    pub fn set_field_of_view(&mut self, field_of_view_deg: f64) {
        self.field_of_view_deg =
            field_of_view_deg.clamp(MIN_FIELD_OF_VIEW_DEG, MAX_FIELD_OF_VIEW_DEG);
    }
}

/// Metadata record returned with every extracted region. This is the
/// whole contract exposed to an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewInfo {
    pub azimuth_deg: f64,
    pub field_of_view_deg: f64,
    /// Terrain height plus observer eye height, meters.
    pub observer_height_m: f64,
    /// Terrain height under the observer, meters (0.0 over voids).
    pub terrain_height_m: f64,
    pub cardinal_direction: CardinalDirection,
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
    pub rendered_points: usize,
    /// Observer (latitude, longitude), decimal degrees.
    pub coordinates: (f64, f64),
    pub view_radius_km: f64,
    pub location_name: Option<String>,
}

/// The down-sampled, observer-centered sub-grid plus derived camera
/// parameters for one horizon query. Produced fresh per query.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRegion {
    /// Row-major mesh vertices, `mesh_rows * mesh_cols` of them.
    pub points: Vec<MeshPoint>,
    pub mesh_rows: usize,
    pub mesh_cols: usize,
    pub camera: ViewCamera,
    pub info: ViewInfo,
}

/// Extracts the horizon view region around the observer.
///
/// The slice is the bounding box `[row - r, row + r) x [col - r, col + r)`
/// clamped to the mosaic, sub-sampled by `max(1, r / max_render_points)`
/// along both axes. Purely arithmetic: identical inputs against the
/// same mosaic produce identical regions.
pub fn extract_view(
    mosaic: &Mosaic,
    query: &ViewQuery,
    eye_height_m: f64,
    max_render_points: usize,
) -> Result<ViewRegion> {
    let (obs_row, obs_col) = mosaic.index_of(query.lat, query.lon)?;
    let terrain_height_m = mosaic.elevation(query.lat, query.lon)?;
    let observer_height_m = terrain_height_m + eye_height_m;

    let meters_per_index = APPROX_METERS_PER_DEGREE / (mosaic.resolution() - 1) as f64;
    let radius_idx = ((query.view_radius_km * 1000.0) / meters_per_index) as usize;

    let row_min = obs_row.saturating_sub(radius_idx);
    let row_max = (obs_row + radius_idx).min(mosaic.rows());
    let col_min = obs_col.saturating_sub(radius_idx);
    let col_max = (obs_col + radius_idx).min(mosaic.cols());

    let step = (radius_idx / max_render_points).max(1);

    let row_idx: Vec<usize> = (row_min..row_max).step_by(step).collect();
    let col_idx: Vec<usize> = (col_min..col_max).step_by(step).collect();
    if row_idx.is_empty() || col_idx.is_empty() {
        return Err(TerrainError::EmptyRegion);
    }

    // Voids read as sea level before normalization.
    let elevations: Vec<f64> = row_idx
        .iter()
        .flat_map(|&r| col_idx.iter().map(move |&c| (r, c)))
        .map(|(r, c)| {
            let sample = mosaic.get(r, c);
            if sample == hgt::SENTINEL {
                0.0
            } else {
                sample as f64
            }
        })
        .collect();

    let mut min_elevation_m = f64::INFINITY;
    let mut max_elevation_m = f64::NEG_INFINITY;
    for &e in &elevations {
        min_elevation_m = min_elevation_m.min(e);
        max_elevation_m = max_elevation_m.max(e);
    }
    // Range floor of 1 m keeps flat terrain from dividing by zero.
    let range = (max_elevation_m - min_elevation_m).max(1.0);

    // Kilometer mesh centered on the observer's position in the slice.
    let km_per_cell = meters_per_index * step as f64 / 1000.0;
    let observer_x_km = (obs_col - col_min) as f64 * km_per_cell;
    let observer_y_km = (obs_row - row_min) as f64 * km_per_cell;

    let mesh_rows = row_idx.len();
    let mesh_cols = col_idx.len();
    let mut points = Vec::with_capacity(mesh_rows * mesh_cols);
    for i in 0..mesh_rows {
        for j in 0..mesh_cols {
            let elevation = elevations[i * mesh_cols + j];
            points.push(MeshPoint {
                position_km: [
                    (j as f64 * km_per_cell - observer_x_km) as f32,
                    (i as f64 * km_per_cell - observer_y_km) as f32,
                    (elevation / 1000.0) as f32,
                ],
                elevation_norm: ((elevation - min_elevation_m) / range) as f32,
            });
        }
    }

    let camera = ViewCamera::for_observer(
        query.azimuth_deg,
        query.field_of_view_deg,
        query.view_radius_km,
        observer_height_m,
    );

    log::debug!(
        "view at ({:.6}, {:.6}): {}x{} mesh, step {}, elevation {:.1}..{:.1} m",
        query.lat,
        query.lon,
        mesh_rows,
        mesh_cols,
        step,
        min_elevation_m,
        max_elevation_m,
    );

    let info = ViewInfo {
        azimuth_deg: query.azimuth_deg,
        field_of_view_deg: query.field_of_view_deg,
        observer_height_m,
        terrain_height_m,
        cardinal_direction: CardinalDirection::from_azimuth(query.azimuth_deg),
        min_elevation_m,
        max_elevation_m,
        rendered_points: mesh_rows * mesh_cols,
        coordinates: (query.lat, query.lon),
        view_radius_km: query.view_radius_km,
        location_name: query.location_name.clone(),
    };

    Ok(ViewRegion {
        points,
        mesh_rows,
        mesh_cols,
        camera,
        info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_sectors_are_north_centered() {
        assert_eq!(CardinalDirection::from_azimuth(0.0), CardinalDirection::North);
        assert_eq!(CardinalDirection::from_azimuth(22.0), CardinalDirection::North);
        assert_eq!(
            CardinalDirection::from_azimuth(46.0),
            CardinalDirection::Northeast
        );
        assert_eq!(CardinalDirection::from_azimuth(90.0), CardinalDirection::East);
        assert_eq!(CardinalDirection::from_azimuth(180.0), CardinalDirection::South);
        assert_eq!(CardinalDirection::from_azimuth(359.0), CardinalDirection::North);
        assert_eq!(
            CardinalDirection::from_azimuth(-45.0),
            CardinalDirection::Northwest
        );
        assert_eq!(CardinalDirection::from_azimuth(720.0), CardinalDirection::North);
    }

    #[test]
    fn camera_sits_behind_and_above_the_observer() {
        // Azimuth 0 (north): behind means negative y.
        let cam = ViewCamera::for_observer(0.0, 90.0, 100.0, 1000.0);
        let [x, y, z] = cam.position_km;
        assert!(x.abs() < 1e-9);
        assert!((y + 40.0).abs() < 1e-9);
        assert!((z - 1.1).abs() < 1e-9);

        let [fx, fy, fz] = cam.focal_point_km;
        assert!(fx.abs() < 1e-9);
        assert!((fy - 10.0).abs() < 1e-9);
        assert!((fz - 0.9).abs() < 1e-9);

        assert_eq!(cam.clipping_range_km, (0.001, 250.0));
        assert_eq!(cam.up, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn camera_east_azimuth_flips_axes() {
        let cam = ViewCamera::for_observer(90.0, 90.0, 100.0, 0.0);
        let [x, y, _] = cam.position_km;
        assert!((x + 40.0).abs() < 1e-9);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn retarget_preserves_distances() {
        let mut cam = ViewCamera::for_observer(0.0, 90.0, 100.0, 500.0);
        let before_cam = DVec3::from(cam.position_km).length();
        let before_focal = DVec3::from(cam.focal_point_km).length();

        cam.retarget(135.0);

        let after_cam = DVec3::from(cam.position_km).length();
        let after_focal = DVec3::from(cam.focal_point_km).length();
        assert!((before_cam - after_cam).abs() < 1e-9);
        assert!((before_focal - after_focal).abs() < 1e-9);
        // Heights stay put.
        assert!((cam.position_km[2] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn field_of_view_is_clamped() {
        let mut cam = ViewCamera::for_observer(0.0, 90.0, 100.0, 0.0);
        cam.set_field_of_view(5.0);
        assert_eq!(cam.field_of_view_deg, MIN_FIELD_OF_VIEW_DEG);
        cam.set_field_of_view(400.0);
        assert_eq!(cam.field_of_view_deg, MAX_FIELD_OF_VIEW_DEG);
        cam.set_field_of_view(75.0);
        assert_eq!(cam.field_of_view_deg, 75.0);
    }
}
