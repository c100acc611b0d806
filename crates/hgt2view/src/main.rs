use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use terrain::{Terrain, TerrainConfig, ViewQuery};

mod presets;

/// `hgt2view` - resolve elevations and horizon view regions from a
/// directory of `.hgt` tiles.
///
/// Scans the data directory, assembles the seamless elevation mosaic,
/// then either prints the elevation at the observer position or emits
/// the full view region (metadata, camera, optionally the mesh) as
/// JSON for an external renderer.
#[derive(Parser, Debug)]
#[command(name = "hgt2view", version)]
struct Args {
    /// Directory containing the .hgt tile files.
    #[arg(long, env = "HGT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Samples per row/column of each tile.
    #[arg(long, default_value_t = 1201)]
    resolution: usize,

    /// Catalog scan range, integer degrees, inclusive.
    #[arg(long, default_value_t = -8, allow_hyphen_values = true)]
    scan_lat_min: i32,
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    scan_lat_max: i32,
    #[arg(long, default_value_t = -82, allow_hyphen_values = true)]
    scan_lon_min: i32,
    #[arg(long, default_value_t = -73, allow_hyphen_values = true)]
    scan_lon_max: i32,

    /// Observer latitude in decimal degrees; overrides --preset.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Observer longitude in decimal degrees; overrides --preset.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Named observer location (see --list-presets).
    #[arg(long)]
    preset: Option<String>,

    /// Print the known preset locations and exit.
    #[arg(long, default_value_t = false)]
    list_presets: bool,

    /// View direction in degrees; 0 = north, clockwise.
    #[arg(long, default_value_t = 90.0, allow_hyphen_values = true)]
    azimuth: f64,

    /// Camera view angle in degrees.
    #[arg(long, default_value_t = terrain::DEFAULT_FIELD_OF_VIEW_DEG)]
    field_of_view: f64,

    /// View radius around the observer in kilometers.
    #[arg(long, default_value_t = terrain::DEFAULT_VIEW_RADIUS_KM)]
    radius_km: f64,

    /// Print the observer elevation only; skip view extraction.
    #[arg(long, default_value_t = false)]
    elevation_only: bool,

    /// Include the full mesh vertices in the JSON output.
    #[arg(long, default_value_t = false)]
    with_mesh: bool,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_presets {
        for (key, name, lat, lon) in presets::PRESETS {
            println!("{key:12} {name} ({lat}, {lon})");
        }
        return Ok(());
    }

    if !args.data_dir.is_dir() {
        bail!(
            "data directory {} not found; place the .hgt tiles there or pass --data-dir",
            args.data_dir.display()
        );
    }

    let (lat, lon, location_name) = resolve_observer(&args)?;

    let config = TerrainConfig {
        data_dir: args.data_dir.clone(),
        resolution: args.resolution,
        scan_lat: args.scan_lat_min..=args.scan_lat_max,
        scan_lon: args.scan_lon_min..=args.scan_lon_max,
        ..TerrainConfig::default()
    };

    let terrain = Terrain::open(config).context("scanning elevation tiles")?;
    info!("discovered {} tiles", terrain.catalog().len());

    let start = Instant::now();
    terrain.build_mosaic();
    info!("mosaic assembled in {:.2}s", start.elapsed().as_secs_f64());

    if args.elevation_only {
        let elevation = terrain
            .elevation_at(lat, lon)
            .context("resolving elevation")?;
        println!("elevation at ({lat}, {lon}) = {elevation} m");
        return Ok(());
    }

    let query = ViewQuery {
        lat,
        lon,
        azimuth_deg: args.azimuth,
        field_of_view_deg: args.field_of_view,
        view_radius_km: args.radius_km,
        location_name,
    };
    let region = terrain.extract_view(&query).context("extracting view")?;

    let mut doc = serde_json::json!({
        "info": region.info,
        "camera": region.camera,
        "mesh_rows": region.mesh_rows,
        "mesh_cols": region.mesh_cols,
    });
    if args.with_mesh {
        doc["mesh"] = serde_json::to_value(&region.points)?;
    }

    let rendered = serde_json::to_string_pretty(&doc)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Observer position from explicit coordinates, falling back to the
/// preset table.
fn resolve_observer(args: &Args) -> Result<(f64, f64, Option<String>)> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        return Ok((lat, lon, None));
    }

    if let Some(key) = &args.preset {
        let Some((name, lat, lon)) = presets::find(key) else {
            bail!("unknown preset {key:?}; run with --list-presets");
        };
        return Ok((lat, lon, Some(name.to_string())));
    }

    bail!("no observer position; pass --lat and --lon, or --preset");
}
