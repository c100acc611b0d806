use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to callers of the terrain subsystem.
///
/// Unreadable individual tiles are deliberately absent: a bad tile file
/// degrades to a void-filled grid during assembly (logged at `warn`)
/// instead of failing the mosaic.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// The catalog scan discovered no tiles at all. Fatal: without
    /// terrain there is nothing to query.
    #[error("no elevation tiles found under {dir}")]
    NoData { dir: PathBuf },

    /// The queried coordinate lies outside the catalog's covered cells.
    #[error("coordinates ({lat}, {lon}) outside the available data range")]
    OutOfRange { lat: f64, lon: f64 },

    /// A query arrived before the mosaic was assembled.
    #[error("terrain mosaic has not been assembled yet")]
    NotBuilt,

    /// The clamped, strided view slice contained no samples.
    #[error("extracted terrain region is empty; adjust the coordinates or radius")]
    EmptyRegion,
}

pub type Result<T> = std::result::Result<T, TerrainError>;
