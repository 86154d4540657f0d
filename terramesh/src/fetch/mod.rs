//! Concurrent tile fetch orchestration
//!
//! Launches one fetch per tile of a [`TileIndexSet`] under a bounded
//! concurrency window, forwards each finished tile to the stitcher at the
//! grid position it was launched for, and reports per-tile progress.
//!
//! # Design
//!
//! The orchestrator maintains a sliding window of in-flight fetches:
//! 1. Launch fetches in row-major order.
//! 2. Once the window is full, await the next completion before launching
//!    more.
//! 3. Completions arrive in any order; each carries its own `(col, row)`.
//!
//! The admission check runs after a fetch is launched, so the window briefly
//! holds up to `max_in_flight + 1` fetches. This transient overshoot is part
//! of the observable contract and is asserted in tests; do not tighten it to
//! an exact cap.
//!
//! # Failure
//!
//! The first tile error fails the whole operation with that error and the
//! remaining in-flight fetches are abandoned; there is no partial result.
//! Cancellation is checked at the start of every loop iteration and resolves
//! to [`TerrainError::Cancelled`], distinct from fetch failure, with no
//! further progress callbacks.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coord::TileIndexSet;
use crate::error::TerrainError;
use crate::progress::Progress;
use crate::provider::{FetchError, TileSource};
use crate::stitch::{ImageBuilder, StitchedRaster};
use crate::tile::RasterTile;

/// Default bound on concurrently in-flight tile fetches.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Bounded-window tile fetcher and stitcher.
pub struct FetchOrchestrator {
    max_in_flight: usize,
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT)
    }
}

impl FetchOrchestrator {
    /// Create an orchestrator with the given concurrency window.
    ///
    /// A window of zero is treated as one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Fetch every tile of `grid` and assemble the stitched raster.
    ///
    /// `progress` is invoked exactly once per fetched tile with a
    /// monotonically increasing completed count, ending at the tile total.
    ///
    /// # Errors
    ///
    /// The first failed tile fetch fails the whole operation; cancellation
    /// resolves to [`TerrainError::Cancelled`].
    pub async fn fetch_grid<S, F>(
        &self,
        source: &S,
        grid: &TileIndexSet,
        cancellation: &CancellationToken,
        progress: F,
    ) -> Result<StitchedRaster, TerrainError>
    where
        S: TileSource,
        F: Fn(Progress),
    {
        let total = grid.tile_count();
        let zoom = grid.zoom();
        let mut builder = ImageBuilder::new(grid);
        let mut in_flight = FuturesUnordered::new();
        let mut completed = 0usize;

        info!(
            source = source.name(),
            zoom,
            tiles = total,
            window = self.max_in_flight,
            "starting tile fetch"
        );

        for (col, row, x, y) in grid.positions() {
            if cancellation.is_cancelled() {
                debug!(completed, total, "tile fetch cancelled during launch");
                return Err(TerrainError::Cancelled);
            }

            in_flight.push(async move { (col, row, source.fetch_tile(x, y, zoom).await) });

            if in_flight.len() > self.max_in_flight {
                if let Some(outcome) = in_flight.next().await {
                    stitch_completion(&mut builder, &mut completed, total, &progress, outcome)?;
                }
            }
        }

        while !in_flight.is_empty() {
            if cancellation.is_cancelled() {
                debug!(completed, total, "tile fetch cancelled during drain");
                return Err(TerrainError::Cancelled);
            }
            if let Some(outcome) = in_flight.next().await {
                stitch_completion(&mut builder, &mut completed, total, &progress, outcome)?;
            }
        }

        info!(source = source.name(), zoom, tiles = total, "tile fetch complete");
        Ok(builder.finalize()?)
    }
}

/// Place one finished tile and report progress.
fn stitch_completion<F: Fn(Progress)>(
    builder: &mut ImageBuilder,
    completed: &mut usize,
    total: usize,
    progress: &F,
    (col, row, result): (u32, u32, Result<RasterTile, FetchError>),
) -> Result<(), TerrainError> {
    let tile = result?;
    builder.add_tile(col, row, &tile)?;
    *completed += 1;
    progress(Progress::new(*completed, total));
    Ok(())
}
