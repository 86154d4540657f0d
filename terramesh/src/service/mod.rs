//! Terrain service facade.
//!
//! `TerrainService` owns the configuration, providers, and metrics, and
//! exposes the two user-level operations:
//!
//! - [`fetch_texture`](TerrainService::fetch_texture) - bounding box →
//!   stitched imagery raster
//! - [`fetch_terrain`](TerrainService::fetch_terrain) - bounding box →
//!   height grid + triangulated mesh, with zoom-degradation retries
//!
//! The two operations are independent and may run concurrently; each checks
//! the caller's `CancellationToken` and reports progress per stage.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::TerrainConfig;
use crate::coord::{covering_tiles, ground_resolution, zoom_for_bounds, GeoBoundingBox};
use crate::error::TerrainError;
use crate::fetch::FetchOrchestrator;
use crate::height::{decode_heightmap, fetch_with_retry, HeightGrid};
use crate::mesh::{MeshConfig, TerrainMesh, TerrainMeshBuilder};
use crate::progress::{Progress, Stage};
use crate::provider::{
    AsyncHttpClient, RasterEndpoint, RasterTileProvider, TileImageFormat,
};
use crate::stitch::StitchedRaster;
use crate::telemetry::PipelineMetrics;

/// Result of a successful terrain fetch.
///
/// The artifact is always complete at whatever zoom succeeded; degradation
/// to a coarser zoom is transparent except for the recorded `zoom`.
#[derive(Debug, Clone)]
pub struct Terrain {
    /// The triangulated mesh.
    pub mesh: TerrainMesh,
    /// The decoded, normalized height grid the mesh was built from.
    pub heights: HeightGrid,
    /// Zoom level the elevation fetch succeeded at.
    pub zoom: u8,
}

/// Facade wiring geo math, fetch orchestration, decoding, and mesh building.
pub struct TerrainService<C: AsyncHttpClient> {
    config: TerrainConfig,
    texture_provider: RasterTileProvider<C>,
    elevation_provider: RasterTileProvider<C>,
    orchestrator: FetchOrchestrator,
    metrics: Arc<PipelineMetrics>,
}

impl<C: AsyncHttpClient + Clone> TerrainService<C> {
    /// Create a service from a config and an HTTP client.
    pub fn new(config: TerrainConfig, client: C) -> Self {
        let texture_provider = RasterTileProvider::new(
            client.clone(),
            RasterEndpoint {
                host: config.tile_host.clone(),
                tileset: config.texture_tileset.clone(),
                format: config.texture_format,
                access_token: config.access_token.clone(),
            },
        );
        // Elevation is always PNG: the height encoding does not survive
        // lossy compression.
        let elevation_provider = RasterTileProvider::new(
            client,
            RasterEndpoint {
                host: config.tile_host.clone(),
                tileset: config.elevation_tileset.clone(),
                format: TileImageFormat::Png,
                access_token: config.access_token.clone(),
            },
        );
        let orchestrator = FetchOrchestrator::new(config.max_in_flight);

        Self {
            config,
            texture_provider,
            elevation_provider,
            orchestrator,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Shared pipeline metrics.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    fn fetch_zoom(&self, bbox: &GeoBoundingBox) -> u8 {
        self.config
            .zoom_override
            .unwrap_or_else(|| zoom_for_bounds(bbox))
    }

    /// Fetch the stitched imagery raster for a bounding box.
    pub async fn fetch_texture<F>(
        &self,
        bbox: &GeoBoundingBox,
        cancellation: &CancellationToken,
        progress: F,
    ) -> Result<StitchedRaster, TerrainError>
    where
        F: Fn(Stage, Progress),
    {
        let zoom = self.fetch_zoom(bbox);
        let grid = covering_tiles(bbox, zoom, self.config.tile_size)?;
        info!(zoom, tiles = grid.tile_count(), "fetching texture");

        let result = self
            .orchestrator
            .fetch_grid(&self.texture_provider, &grid, cancellation, |p| {
                progress(Stage::TextureFetch, p)
            })
            .await;

        match &result {
            Ok(_) => {
                self.metrics.tiles_fetched(grid.tile_count() as u64);
                self.metrics.raster_stitched();
            }
            Err(e) if !e.is_cancelled() => self.metrics.fetch_failed(),
            Err(_) => {}
        }
        result
    }

    /// Fetch elevation tiles, decode them, and build the terrain mesh.
    ///
    /// The elevation fetch walks the zoom-degradation ladder on failure;
    /// cancellation short-circuits every layer with
    /// [`TerrainError::Cancelled`].
    pub async fn fetch_terrain<F>(
        &self,
        bbox: &GeoBoundingBox,
        cancellation: &CancellationToken,
        progress: F,
    ) -> Result<Terrain, TerrainError>
    where
        F: Fn(Stage, Progress),
    {
        let start_zoom = self.fetch_zoom(bbox);
        let attempt_count = AtomicU32::new(0);
        let progress = &progress;

        let (zoom, raster) = fetch_with_retry(start_zoom, self.config.max_attempts, |zoom| {
            if attempt_count.fetch_add(1, Ordering::Relaxed) > 0 {
                self.metrics.retried();
            }
            async move {
                let grid = covering_tiles(bbox, zoom, self.config.tile_size)?;
                info!(zoom, tiles = grid.tile_count(), "fetching elevation");
                let raster = self
                    .orchestrator
                    .fetch_grid(&self.elevation_provider, &grid, cancellation, |p| {
                        progress(Stage::HeightFetch, p)
                    })
                    .await?;
                self.metrics.tiles_fetched(grid.tile_count() as u64);
                Ok((zoom, raster))
            }
        })
        .await
        .inspect_err(|e| {
            if !e.is_cancelled() {
                self.metrics.fetch_failed();
            }
        })?;
        self.metrics.raster_stitched();

        let heights = decode_heightmap(
            &raster,
            self.config.exaggeration,
            self.config.wall_padding,
        )?;

        let center = bbox.center();
        let meters_per_pixel =
            ground_resolution(center.lat, zoom, self.config.tile_size) as f32;
        let builder = TerrainMeshBuilder::new(MeshConfig {
            cell_size_x: meters_per_pixel,
            cell_size_y: meters_per_pixel,
            wall_padding: self.config.wall_padding as f32,
            smooth_normals: self.config.shadow_quality_normals,
        });

        let mesh = builder
            .build(&heights, cancellation, |p| progress(Stage::MeshBuild, p))
            .await?;
        self.metrics.mesh_built(mesh.vertex_count() as u64);

        Ok(Terrain {
            mesh,
            heights,
            zoom,
        })
    }
}
