use rayon::prelude::*;

use crate::catalog::TileCatalog;
use crate::error::{Result, TerrainError};
use hgt::HgtTile;

/// One seamless elevation grid stitched from every discovered tile.
///
/// Tiles are concatenated in row-major geographic order: latitude cells
/// north to south, longitude cells west to east. Adjacent tiles share
/// their border samples, so each non-terminal tile drops its last row
/// (shared with the southern neighbour) and last column (shared with
/// the eastern neighbour); the surviving copy of a seam belongs to the
/// south/east tile. The mapper's effective-count arithmetic mirrors
/// this rule exactly and the two must never diverge.
///
/// Immutable once assembled; concurrent queries are pure reads.
#[derive(Debug, Clone)]
pub struct Mosaic {
    samples: Vec<i16>,
    rows: usize,
    cols: usize,
    resolution: usize,
    /// Included latitude cells, northernmost first.
    lats: Vec<i32>,
    /// Included longitude cells, westernmost first.
    lons: Vec<i32>,
}

/// Rows or columns a tile contributes to the mosaic: the full
/// resolution for the terminal cell of an axis, one less otherwise.
#[inline]
fn effective(resolution: usize, idx: usize, len: usize) -> usize {
    if idx + 1 < len {
        resolution - 1
    } else {
        resolution
    }
}

/// Loads the tile for a cell, or synthesizes an all-void tile when the
/// cell is absent from the catalog or its file cannot be read. A bad
/// tile means missing terrain there, never a failed mosaic.
fn load_or_void(catalog: &TileCatalog, lat: i32, lon: i32, resolution: usize) -> HgtTile {
    let Some(path) = catalog.path(lat, lon) else {
        return HgtTile::voided(resolution);
    };

    match hgt::read_file(path, resolution) {
        Ok(tile) => tile,
        Err(err) => {
            log::warn!(
                "unreadable tile {}: {err}; substituting voids",
                path.display()
            );
            HgtTile::voided(resolution)
        }
    }
}

/// Directional convention for the fractional latitude offset within a
/// cell. Row 0 of a tile is its northernmost row; southern cells flip
/// the fraction so that still holds below the equator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    #[inline]
    fn of_cell(cell: i32) -> Self {
        if cell >= 0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        }
    }

    /// Fractional row offset within the cell, in [0, 1].
    #[inline]
    fn row_fraction(self, lat: f64, cell: i32) -> f64 {
        match self {
            Hemisphere::Northern => lat - cell as f64,
            Hemisphere::Southern => 1.0 - (lat - cell as f64),
        }
    }
}

impl Mosaic {
    /// Stitches every catalog cell into one grid. O(total samples),
    /// done once per session; latitude bands load in parallel.
    pub fn assemble(catalog: &TileCatalog, resolution: usize) -> Self {
        let lats = catalog.lats().to_vec();
        let lons = catalog.lons().to_vec();

        let cols: usize = (0..lons.len())
            .map(|j| effective(resolution, j, lons.len()))
            .sum();

        let bands: Vec<Vec<i16>> = lats
            .par_iter()
            .enumerate()
            .map(|(i, &lat)| {
                let band_rows = effective(resolution, i, lats.len());
                let mut band = vec![0i16; band_rows * cols];
                let mut col_offset = 0usize;

                for (j, &lon) in lons.iter().enumerate() {
                    let tile = load_or_void(catalog, lat, lon, resolution);
                    let tile_cols = effective(resolution, j, lons.len());

                    for r in 0..band_rows {
                        let dst = r * cols + col_offset;
                        band[dst..dst + tile_cols].copy_from_slice(&tile.row(r)[..tile_cols]);
                    }
                    col_offset += tile_cols;
                }

                band
            })
            .collect();

        let samples = bands.concat();
        let rows = samples.len() / cols;
        log::info!("mosaic assembled: {rows} x {cols} samples");

        Self {
            samples,
            rows,
            cols,
            resolution,
            lats,
            lons,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Raw sample at (row, col). Row 0 is the mosaic's north edge.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i16 {
        self.samples[row * self.cols + col]
    }

    /// Maps geographic coordinates to mosaic indices; the inverse of
    /// the assembly order.
    ///
    /// Validation accepts `[min_lat, max_lat + 1) x [min_lon, max_lon + 1)`
    /// of the covered cells. The containing cell along each axis is the
    /// one whose `[cell, cell + 1)` degree interval holds the
    /// coordinate; exact boundary coordinates clamp into the last valid
    /// sample of their cell rather than spilling over.
    pub fn index_of(&self, lat: f64, lon: f64) -> Result<(usize, usize)> {
        let (min_lat, max_lat) = (*self.lats.last().unwrap(), self.lats[0]);
        let (min_lon, max_lon) = (self.lons[0], *self.lons.last().unwrap());

        let lat_in = (min_lat as f64) <= lat && lat < (max_lat + 1) as f64;
        let lon_in = (min_lon as f64) <= lon && lon < (max_lon + 1) as f64;
        if !lat_in || !lon_in {
            return Err(TerrainError::OutOfRange { lat, lon });
        }

        let lat_cell = lat.floor() as i32;
        let lon_cell = lon.floor() as i32;

        // Cells inside the bounding box can still be absent from a
        // sparse catalog; treat those as out of range too.
        let lat_idx = self
            .lats
            .iter()
            .position(|&c| c == lat_cell)
            .ok_or(TerrainError::OutOfRange { lat, lon })?;
        let lon_idx = self
            .lons
            .iter()
            .position(|&c| c == lon_cell)
            .ok_or(TerrainError::OutOfRange { lat, lon })?;

        let row_frac = Hemisphere::of_cell(lat_cell).row_fraction(lat, lat_cell);
        let col_frac = lon - lon_cell as f64;

        let band_rows = effective(self.resolution, lat_idx, self.lats.len());
        let band_cols = effective(self.resolution, lon_idx, self.lons.len());

        let local_row = ((row_frac * (band_rows - 1) as f64) as usize).min(band_rows - 1);
        let local_col = ((col_frac * (band_cols - 1) as f64) as usize).min(band_cols - 1);

        let row_offset: usize = (0..lat_idx)
            .map(|i| effective(self.resolution, i, self.lats.len()))
            .sum();
        let col_offset: usize = (0..lon_idx)
            .map(|j| effective(self.resolution, j, self.lons.len()))
            .sum();

        let row = (row_offset + local_row).min(self.rows - 1);
        let col = (col_offset + local_col).min(self.cols - 1);
        Ok((row, col))
    }

    /// Elevation in meters at the given coordinates. Void cells read as
    /// sea level (0.0) instead of erroring.
    pub fn elevation(&self, lat: f64, lon: f64) -> Result<f64> {
        let (row, col) = self.index_of(lat, lon)?;
        let sample = self.get(row, col);
        if sample == hgt::SENTINEL {
            Ok(0.0)
        } else {
            Ok(sample as f64)
        }
    }
}
