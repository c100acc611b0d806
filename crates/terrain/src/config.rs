use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Planar approximation of one degree of arc, adequate at horizon-view
/// scale. Not geodesic.
pub const APPROX_METERS_PER_DEGREE: f64 = 111_000.0;

/// Default view radius around the observer, in kilometers.
pub const DEFAULT_VIEW_RADIUS_KM: f64 = 75.0;

/// Default camera field of view, in degrees.
pub const DEFAULT_FIELD_OF_VIEW_DEG: f64 = 90.0;

/// Eye height added on top of the terrain under the observer, meters.
pub const OBSERVER_EYE_HEIGHT_M: f64 = 0.5;

/// Cap on rendered points per axis; drives the down-sampling stride.
pub const MAX_RENDER_POINTS: usize = 2000;

/// Tuning inputs for the terrain subsystem. These are configuration,
/// not part of the algorithmic contract.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    /// Directory holding the `.hgt` tile files.
    pub data_dir: PathBuf,

    /// Samples per row/column of each tile.
    pub resolution: usize,

    /// Integer-degree latitude cells probed during the catalog scan.
    pub scan_lat: RangeInclusive<i32>,

    /// Integer-degree longitude cells probed during the catalog scan.
    pub scan_lon: RangeInclusive<i32>,

    /// See [`MAX_RENDER_POINTS`].
    pub max_render_points: usize,

    /// See [`OBSERVER_EYE_HEIGHT_M`].
    pub observer_eye_height_m: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            resolution: hgt::SRTM3_RESOLUTION,
            // Continental Ecuador plus margin.
            scan_lat: -8..=3,
            scan_lon: -82..=-73,
            max_render_points: MAX_RENDER_POINTS,
            observer_eye_height_m: OBSERVER_EYE_HEIGHT_M,
        }
    }
}

impl TerrainConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }
}
