//! Terrain: a single-process spatial query engine over `.hgt` tiles.
//!
//! Data flow: a directory of elevation tiles is scanned into a
//! [`TileCatalog`], stitched into one seamless [`Mosaic`], and queried
//! through [`Terrain`] — latitude/longitude to elevation, or a full
//! observer-centered [`ViewRegion`] with derived camera geometry for a
//! horizon view. Rendering itself is a collaborator's job; everything a
//! renderer needs crosses the boundary inside [`ViewRegion`].
//!
//! Assembly is a one-time, run-to-completion task. It may be kicked off
//! from a background thread ([`Terrain`] is `Sync`); once built the
//! mosaic never mutates, so concurrent queries are pure reads and need
//! no locking.

mod catalog;
mod config;
mod error;
mod mosaic;
mod view;

pub use catalog::TileCatalog;
pub use config::{
    TerrainConfig, APPROX_METERS_PER_DEGREE, DEFAULT_FIELD_OF_VIEW_DEG, DEFAULT_VIEW_RADIUS_KM,
    MAX_RENDER_POINTS, OBSERVER_EYE_HEIGHT_M,
};
pub use error::{Result, TerrainError};
pub use mosaic::Mosaic;
pub use view::{
    extract_view, CardinalDirection, MeshPoint, ViewCamera, ViewInfo, ViewQuery, ViewRegion,
    MAX_FIELD_OF_VIEW_DEG, MIN_FIELD_OF_VIEW_DEG,
};

use std::sync::OnceLock;

/// Owned state of the subsystem: the catalog, the lazily assembled
/// mosaic, and the tuning configuration.
pub struct Terrain {
    config: TerrainConfig,
    catalog: TileCatalog,
    mosaic: OnceLock<Mosaic>,
}

impl Terrain {
    /// Scans the configured data directory. Fails with
    /// [`TerrainError::NoData`] when no tiles are discovered, which is
    /// fatal to the whole subsystem.
    pub fn open(config: TerrainConfig) -> Result<Self> {
        let catalog = TileCatalog::scan(&config)?;
        Ok(Self {
            config,
            catalog,
            mosaic: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Assembles the mosaic on first call and returns it; later calls
    /// return the cached grid unchanged.
    pub fn build_mosaic(&self) -> &Mosaic {
        self.mosaic
            .get_or_init(|| Mosaic::assemble(&self.catalog, self.config.resolution))
    }

    /// The assembled mosaic, or [`TerrainError::NotBuilt`] when queried
    /// before [`Terrain::build_mosaic`].
    pub fn mosaic(&self) -> Result<&Mosaic> {
        self.mosaic.get().ok_or(TerrainError::NotBuilt)
    }

    /// Elevation in meters at the given coordinates; voids read as 0.0.
    pub fn elevation_at(&self, lat: f64, lon: f64) -> Result<f64> {
        self.mosaic()?.elevation(lat, lon)
    }

    /// Extracts the horizon view region around the observer described
    /// by `query`.
    pub fn extract_view(&self, query: &ViewQuery) -> Result<ViewRegion> {
        view::extract_view(
            self.mosaic()?,
            query,
            self.config.observer_eye_height_m,
            self.config.max_render_points,
        )
    }
}
