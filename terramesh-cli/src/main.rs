//! Terramesh CLI - Command-line interface
//!
//! Thin consumer of the terramesh library: parses a bounding box, fetches a
//! stitched texture or a terrain mesh, and writes the artifacts to disk.
//! Ctrl-C trips the cancellation token, exercising the library's
//! cancellation path end to end.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::error;

use terramesh::coord::GeoBoundingBox;
use terramesh::provider::AsyncReqwestClient;
use terramesh::{TerrainConfig, TerrainService};

#[derive(Parser)]
#[command(name = "terramesh", version, about = "Map textures and terrain meshes from tile services")]
struct Cli {
    /// Access token for the tile service.
    #[arg(long, env = "TERRAMESH_TOKEN", global = true, default_value = "")]
    token: String,

    /// Tile service host.
    #[arg(long, global = true, default_value = "https://api.mapbox.com")]
    host: String,

    #[command(subcommand)]
    command: Command,
}

/// Bounding box of the area to fetch.
#[derive(Args)]
struct BoundsArgs {
    /// Southern latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    south: f64,

    /// Western longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    west: f64,

    /// Northern latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    north: f64,

    /// Eastern longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    east: f64,
}

impl BoundsArgs {
    fn to_bbox(&self) -> Result<GeoBoundingBox, commands::CliError> {
        GeoBoundingBox::from_corners(self.south, self.west, self.north, self.east)
            .map_err(|e| commands::CliError::new(format!("invalid bounding box: {}", e)))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the stitched imagery raster for a bounding box.
    Texture {
        #[command(flatten)]
        bounds: BoundsArgs,

        /// Output image path (format by extension, e.g. texture.png).
        #[arg(long, default_value = "texture.png")]
        out: PathBuf,

        /// Fixed zoom level (defaults to fitting the box to a viewport).
        #[arg(long)]
        zoom: Option<u8>,
    },
    /// Fetch elevation tiles and build a terrain mesh.
    Terrain {
        #[command(flatten)]
        bounds: BoundsArgs,

        /// Output Wavefront OBJ path.
        #[arg(long, default_value = "terrain.obj")]
        out: PathBuf,

        /// Fixed zoom level (defaults to fitting the box to a viewport).
        #[arg(long)]
        zoom: Option<u8>,

        /// Vertical exaggeration multiplier.
        #[arg(long, default_value_t = 1.0)]
        exaggeration: f64,

        /// Wall padding in meters; zero disables skirt walls.
        #[arg(long, default_value_t = 0.0)]
        wall_padding: f64,

        /// Smooth per-vertex normals for shadow-quality shading.
        #[arg(long)]
        smooth_normals: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancellation = CancellationToken::new();
    let ctrlc_token = cancellation.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_token.cancel()) {
        error!("failed to install Ctrl-C handler: {}", e);
    }

    match run(cli, &cancellation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancellation: &CancellationToken) -> Result<(), commands::CliError> {
    let client = AsyncReqwestClient::new()
        .map_err(|e| commands::CliError::new(format!("http client: {}", e)))?;

    match cli.command {
        Command::Texture { bounds, out, zoom } => {
            let bbox = bounds.to_bbox()?;
            let mut config = TerrainConfig::new(cli.token).with_host(cli.host);
            if let Some(zoom) = zoom {
                config = config.with_zoom(zoom);
            }
            let service = TerrainService::new(config, client);
            commands::texture::run(&service, &bbox, &out, cancellation).await
        }
        Command::Terrain {
            bounds,
            out,
            zoom,
            exaggeration,
            wall_padding,
            smooth_normals,
        } => {
            let bbox = bounds.to_bbox()?;
            let mut config = TerrainConfig::new(cli.token)
                .with_host(cli.host)
                .with_exaggeration(exaggeration)
                .with_wall_padding(wall_padding)
                .with_shadow_quality_normals(smooth_normals);
            if let Some(zoom) = zoom {
                config = config.with_zoom(zoom);
            }
            let service = TerrainService::new(config, client);
            commands::terrain::run(&service, &bbox, &out, cancellation).await
        }
    }
}
