use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::TerrainConfig;
use crate::error::{Result, TerrainError};

/// Which integer-degree cells have a tile on disk.
///
/// Built once at startup by probing every (lat, lon) pair in the
/// configured scan range and testing file existence. Keys are the
/// southwest-corner integers recovered by the same naming rule used to
/// probe them, so `parse_tile_name(tile_name(lat, lon)) == (lat, lon)`
/// holds for every entry.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: BTreeMap<(i32, i32), PathBuf>,
    /// Covered latitude cells, northernmost first.
    lats: Vec<i32>,
    /// Covered longitude cells, westernmost first.
    lons: Vec<i32>,
}

impl TileCatalog {
    /// Probes the scan range for tile files. Fails with
    /// [`TerrainError::NoData`] when nothing is found.
    pub fn scan(config: &TerrainConfig) -> Result<Self> {
        let mut tiles = BTreeMap::new();
        let mut lat_cells = BTreeSet::new();
        let mut lon_cells = BTreeSet::new();

        for lat in config.scan_lat.clone() {
            for lon in config.scan_lon.clone() {
                let path = config.data_dir.join(hgt::tile_name(lat, lon));
                if path.is_file() {
                    tiles.insert((lat, lon), path);
                    lat_cells.insert(lat);
                    lon_cells.insert(lon);
                }
            }
        }

        if lat_cells.is_empty() || lon_cells.is_empty() {
            return Err(TerrainError::NoData {
                dir: config.data_dir.clone(),
            });
        }

        let lats: Vec<i32> = lat_cells.into_iter().rev().collect();
        let lons: Vec<i32> = lon_cells.into_iter().collect();

        log::info!(
            "catalog: {} tiles under {}, lat {}..{}, lon {}..{}",
            tiles.len(),
            config.data_dir.display(),
            lats.last().unwrap(),
            lats[0],
            lons[0],
            lons.last().unwrap(),
        );

        Ok(Self { tiles, lats, lons })
    }

    /// Number of tile files discovered.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Path of the tile whose southwest corner is (`lat`, `lon`), if
    /// that cell was discovered.
    pub fn path(&self, lat: i32, lon: i32) -> Option<&Path> {
        self.tiles.get(&(lat, lon)).map(PathBuf::as_path)
    }

    /// Covered latitude cells, northernmost first.
    pub fn lats(&self) -> &[i32] {
        &self.lats
    }

    /// Covered longitude cells, westernmost first.
    pub fn lons(&self) -> &[i32] {
        &self.lons
    }

    /// (southernmost, northernmost) covered latitude cells.
    pub fn lat_bounds(&self) -> (i32, i32) {
        (*self.lats.last().unwrap(), self.lats[0])
    }

    /// (westernmost, easternmost) covered longitude cells.
    pub fn lon_bounds(&self) -> (i32, i32) {
        (self.lons[0], *self.lons.last().unwrap())
    }
}
