//! `terramesh texture` - fetch and save a stitched imagery raster.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::info;

use terramesh::coord::GeoBoundingBox;
use terramesh::provider::AsyncHttpClient;
use terramesh::TerrainService;

use super::{stage_progress_bar, CliError};

pub async fn run<C: AsyncHttpClient + Clone>(
    service: &TerrainService<C>,
    bbox: &GeoBoundingBox,
    out: &Path,
    cancellation: &CancellationToken,
) -> Result<(), CliError> {
    let (bar, progress) = stage_progress_bar();

    let raster = service.fetch_texture(bbox, cancellation, progress).await?;
    bar.finish_and_clear();

    raster
        .image()
        .save(out)
        .map_err(|e| CliError::new(format!("failed to write {}: {}", out.display(), e)))?;

    let snapshot = service.metrics().snapshot();
    info!(
        width = raster.width(),
        height = raster.height(),
        tiles = snapshot.tiles_fetched,
        path = %out.display(),
        "texture written"
    );
    Ok(())
}
