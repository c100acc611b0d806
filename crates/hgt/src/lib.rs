//! HGT: reader/writer for SRTM-style elevation tiles.
//!
//! - A tile is a square grid of `resolution * resolution` elevation
//!   samples in meters, stored as big-endian signed 16-bit integers,
//!   row-major, row 0 at the **north** edge, column 0 at the **west**
//!   edge.
//! - The reserved value [`SENTINEL`] (-32768) marks "no data".
//! - Filenames encode the integer degree coordinates of the tile's
//!   southwest corner with a hemisphere letter and zero-padded
//!   magnitudes: `{N|S}{2-digit |lat|}{E|W}{3-digit |lon|}.hgt`,
//!   e.g. `S01W079.hgt` covers lat `[-1, 0]`, lon `[-79, -78]`.
//!
//! File layout (big-endian):
//!   00 : i16 sample (row 0, col 0)
//!   02 : i16 sample (row 0, col 1)
//!   .. : row-major until (row res-1, col res-1)
//!
//! Total size must be exactly `resolution * resolution * 2` bytes.

use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

/// Reserved elevation value for "no data" cells.
pub const SENTINEL: i16 = -32768;

/// Samples per row/column of an SRTM3 tile (3 arc-second).
pub const SRTM3_RESOLUTION: usize = 1201;

/// One square elevation grid covering a single integer-degree cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgtTile {
    resolution: usize,
    samples: Vec<i16>,
}

impl HgtTile {
    /// Wraps a row-major sample vector. The length must be `resolution^2`.
    pub fn from_samples(resolution: usize, samples: Vec<i16>) -> io::Result<Self> {
        if samples.len() != resolution * resolution {
            return Err(bad("sample count does not match resolution"));
        }
        Ok(Self {
            resolution,
            samples,
        })
    }

    /// Builds an all-sentinel tile, used in place of missing or
    /// unreadable files so downstream assembly sees a uniform shape.
    pub fn voided(resolution: usize) -> Self {
        Self {
            resolution,
            samples: vec![SENTINEL; resolution * resolution],
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Sample at (row, col); row 0 is the north edge.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i16 {
        self.samples[row * self.resolution + col]
    }

    /// One full row of samples, west to east.
    #[inline]
    pub fn row(&self, row: usize) -> &[i16] {
        let start = row * self.resolution;
        &self.samples[start..start + self.resolution]
    }

    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}

/// Builds the canonical filename for the tile whose southwest corner
/// sits at integer (`lat`, `lon`).
pub fn tile_name(lat: i32, lon: i32) -> String {
    let lat_letter = if lat >= 0 { 'N' } else { 'S' };
    let lon_letter = if lon >= 0 { 'E' } else { 'W' };
    format!(
        "{}{:02}{}{:03}.hgt",
        lat_letter,
        lat.unsigned_abs(),
        lon_letter,
        lon.unsigned_abs()
    )
}

/// Recovers the southwest-corner integers from a tile filename.
///
/// Accepts names with or without the `.hgt` extension; the inverse of
/// [`tile_name`]. Returns `None` for anything that does not match the
/// convention exactly.
pub fn parse_tile_name(name: &str) -> Option<(i32, i32)> {
    let stem = name.strip_suffix(".hgt").unwrap_or(name);
    let bytes = stem.as_bytes();
    if bytes.len() != 7 {
        return None;
    }

    let lat_sign = match bytes[0] {
        b'N' => 1,
        b'S' => -1,
        _ => return None,
    };
    let lon_sign = match bytes[3] {
        b'E' => 1,
        b'W' => -1,
        _ => return None,
    };

    let lat_mag: i32 = stem[1..3].parse().ok()?;
    let lon_mag: i32 = stem[4..7].parse().ok()?;

    Some((lat_sign * lat_mag, lon_sign * lon_mag))
}

#[cold]
fn bad(msg: &str) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, msg)
}

/// Parse a tile from a contiguous byte slice. This is the single source
/// of truth for decoding.
pub fn parse_hgt_bytes(bytes: &[u8], resolution: usize) -> io::Result<HgtTile> {
    let expected = resolution
        .checked_mul(resolution)
        .and_then(|n| n.checked_mul(2))
        .ok_or_else(|| bad("tile size overflow"))?;
    if bytes.len() != expected {
        return Err(bad("tile size does not match resolution"));
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|b| i16::from_be_bytes([b[0], b[1]]))
        .collect();

    HgtTile::from_samples(resolution, samples)
}

/// Fast path: prefer mmap; fall back to a single read.
#[cfg(feature = "mmap")]
pub fn read_file<P: AsRef<Path>>(path: P, resolution: usize) -> io::Result<HgtTile> {
    let file = File::open(path)?;
    let map = unsafe { memmap2::MmapOptions::new().map(&file)? };
    parse_hgt_bytes(&map, resolution)
}

#[cfg(not(feature = "mmap"))]
pub fn read_file<P: AsRef<Path>>(path: P, resolution: usize) -> io::Result<HgtTile> {
    let bytes = std::fs::read(path)?;
    parse_hgt_bytes(&bytes, resolution)
}

/// Writes a tile in the on-disk layout described in the module docs.
pub fn write_file<P: AsRef<Path>>(path: P, tile: &HgtTile) -> io::Result<()> {
    let mut file = File::create(path)?;
    // 2 bytes per sample, one row at a time keeps the buffer small.
    let mut row_buf = Vec::with_capacity(tile.resolution * 2);
    for row in 0..tile.resolution {
        row_buf.clear();
        for &sample in tile.row(row) {
            row_buf.extend_from_slice(&sample.to_be_bytes());
        }
        file.write_all(&row_buf)?;
    }
    file.flush()?;
    Ok(())
}
