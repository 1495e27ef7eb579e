//! MapStitch CLI - Command-line interface
//!
//! This binary provides a command-line interface to the MapStitch
//! library: give it two corners, a zoom level, and a backend, and it
//! produces a geo-referenced map covering that area.

mod error;

use clap::{Parser, ValueEnum};
use error::CliError;
use mapstitch::coord::GeoPoint;
use mapstitch::engine::{EngineConfig, Stage, TiledMapEngine};
use mapstitch::georef::OutputFormat;
use mapstitch::logging;
use mapstitch::provider::{BackendConfig, ReqwestClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, ValueEnum)]
enum BackendType {
    /// CyclOSM raster tiles (no API key required)
    Cyclosm,
    /// IGN Géoportail WMTS tiles (requires API key)
    Ign,
}

#[derive(Debug, Clone, ValueEnum)]
enum ExportFormat {
    /// Geospatial PDF
    Pdf,
    /// GeoTIFF raster
    Geotiff,
}

#[derive(Parser)]
#[command(name = "mapstitch", version = mapstitch::VERSION)]
#[command(about = "Assemble a geo-referenced map from web tiles", long_about = None)]
struct Args {
    /// Upper-left (north-west) corner as "lat,lon"
    upper_left: String,

    /// Lower-right (south-east) corner as "lat,lon"
    lower_right: String,

    /// Zoom level
    zoom: u8,

    /// Output path; the extension is replaced per --format
    #[arg(long, short, default_value = "map")]
    output: PathBuf,

    /// Tile backend to use
    #[arg(long, value_enum, default_value = "cyclosm")]
    backend: BackendType,

    /// Géoportail API key (required when using --backend ign)
    #[arg(long, required_if_eq("backend", "ign"))]
    ign_api_key: Option<String>,

    /// Output format of the final export
    #[arg(long, value_enum, default_value = "pdf")]
    format: ExportFormat,

    /// Directory tiles and capability documents are cached under
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Skip the tile cache entirely
    #[arg(long)]
    no_cache: bool,

    /// Maximum simultaneous tile downloads
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Geo-reference embedding command
    #[arg(long, default_value = "gdal_translate")]
    translate_command: String,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        e.exit();
    }
}

async fn run() -> Result<(), CliError> {
    let args = Args::parse();

    let _guard = logging::init_logging(logging::default_log_dir(), logging::default_log_file())
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let upper_left: GeoPoint = args
        .upper_left
        .parse()
        .map_err(|e| CliError::Config(format!("upper-left corner: {}", e)))?;
    let lower_right: GeoPoint = args
        .lower_right
        .parse()
        .map_err(|e| CliError::Config(format!("lower-right corner: {}", e)))?;

    let backend = match &args.backend {
        BackendType::Cyclosm => BackendConfig::cyclosm(),
        // Safe: required_if_eq guarantees the key is present
        BackendType::Ign => BackendConfig::ign(args.ign_api_key.clone().unwrap()),
    };

    let format = match args.format {
        ExportFormat::Pdf => OutputFormat::Pdf,
        ExportFormat::Geotiff => OutputFormat::GeoTiff,
    };

    let mut config = EngineConfig::default()
        .with_output_path(args.output)
        .with_cache_dir(args.cache_dir)
        .with_concurrency(args.concurrency)
        .with_output_format(format)
        .with_translate_command(args.translate_command);
    if args.no_cache {
        config = config.without_cache();
    }

    info!(%upper_left, %lower_right, zoom = args.zoom, "assembly requested");

    let client = ReqwestClient::new().map_err(CliError::HttpClient)?;
    let engine = TiledMapEngine::new(client, backend, config);

    println!("Assembling map:");
    println!("  Area: {} to {}", upper_left, lower_right);
    println!("  Zoom: {}", args.zoom);
    println!("  Backend: {}", engine_backend_name(&args.backend));
    println!();

    let ticker = spawn_progress_ticker(engine.progress());
    let start = std::time::Instant::now();

    let result = engine.run(upper_left, lower_right, args.zoom).await;
    let _ = ticker.await;

    let export = result?;
    println!();
    println!(
        "✓ Saved successfully: {} ({:.2}s)",
        export.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn engine_backend_name(backend: &BackendType) -> &'static str {
    match backend {
        BackendType::Cyclosm => "cyclosm",
        BackendType::Ign => "ign",
    }
}

/// Prints fetch progress on stdout until the run reaches a final stage.
fn spawn_progress_ticker(
    progress: mapstitch::engine::ProgressHandle,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_done = usize::MAX;
        loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let snap = progress.snapshot();
            match snap.stage {
                Stage::Done | Stage::Failed => break,
                Stage::Fetching if snap.tiles_done != last_done => {
                    println!("  {}/{} tiles", snap.tiles_done, snap.tiles_total);
                    last_done = snap.tiles_done;
                }
                _ => {}
            }
        }
    })
}
