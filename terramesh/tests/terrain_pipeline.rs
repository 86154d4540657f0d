//! End-to-end pipeline tests: bounding box → tiles → stitched raster →
//! height grid → terrain mesh, against synthetic in-memory elevation tiles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use image::{Rgba, RgbaImage};
use tokio_util::sync::CancellationToken;

use terramesh::coord::{covering_tiles, GeoBoundingBox};
use terramesh::mesh::SectionKind;
use terramesh::progress::Stage;
use terramesh::provider::{AsyncHttpClient, FetchError};
use terramesh::{TerrainConfig, TerrainError, TerrainService};

const TILE_SIZE: u32 = 32;

/// Reference bounding box over San Francisco.
fn reference_bbox() -> GeoBoundingBox {
    GeoBoundingBox::from_corners(37.70, -122.47, 37.80, -122.40).unwrap()
}

/// Encode a height in meters into a terrain-RGB pixel.
fn encode_height(height_m: f64) -> Rgba<u8> {
    let value = ((height_m + 10000.0) * 10.0).round() as u32;
    Rgba([
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
        255,
    ])
}

/// HTTP client that renders a synthetic elevation tile for every request.
///
/// Heights vary deterministically with tile index and pixel position, so
/// stitched rasters have non-trivial relief.
#[derive(Clone, Default)]
struct SyntheticElevationClient {
    requests: Arc<AtomicUsize>,
}

impl SyntheticElevationClient {
    fn render_tile(url: &str) -> Bytes {
        // .../v4/{tileset}/{z}/{x}/{y}.png?...
        let mut parts = url.split('/').skip(5);
        let _zoom: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let x: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let y: u32 = parts
            .next()
            .and_then(|p| p.split('.').next())
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);

        let mut image = RgbaImage::new(TILE_SIZE, TILE_SIZE);
        for py in 0..TILE_SIZE {
            for px in 0..TILE_SIZE {
                let base = f64::from((x + y) % 7) * 40.0;
                let ripple = f64::from((px + py) % 16) * 2.5;
                image.put_pixel(px, py, encode_height(base + ripple));
            }
        }

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        Bytes::from(bytes)
    }
}

impl AsyncHttpClient for SyntheticElevationClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(Self::render_tile(url))
    }

    async fn get_with_accept(&self, url: &str, _accept: &str) -> Result<Bytes, FetchError> {
        self.get(url).await
    }
}

fn make_service(config: TerrainConfig) -> TerrainService<SyntheticElevationClient> {
    TerrainService::new(config, SyntheticElevationClient::default())
}

fn reference_config() -> TerrainConfig {
    TerrainConfig::new("test-token")
        .with_host("https://tiles.example.com")
        .with_tile_size(TILE_SIZE)
        .with_zoom(12)
}

#[test]
fn reference_box_matches_mercator_tile_span() {
    // At zoom 12 the reference box spans exactly 2×3 standard 256px tiles.
    let set = covering_tiles(&reference_bbox(), 12, 256).unwrap();
    assert_eq!(set.xs().collect::<Vec<_>>(), vec![654, 655]);
    assert_eq!(set.ys().collect::<Vec<_>>(), vec![1582, 1583, 1584]);
    assert_eq!(set.tile_count(), 6);
}

#[tokio::test]
async fn end_to_end_terrain_with_walls() {
    let wall_padding = 30.0;
    let config = reference_config()
        .with_wall_padding(wall_padding)
        .with_shadow_quality_normals(true);
    let service = make_service(config);
    let cancel = CancellationToken::new();

    let terrain = service
        .fetch_terrain(&reference_bbox(), &cancel, |_, _| {})
        .await
        .unwrap();

    assert_eq!(terrain.zoom, 12);

    // Non-empty top section at material slot index 4.
    let sections = terrain.mesh.sections();
    assert_eq!(sections.len(), 6);
    assert_eq!(sections[4].kind, SectionKind::Top);
    assert!(!sections[4].triangles.is_empty());

    // Every sampled height sits inside the normalized bounds.
    let min_z = wall_padding as f32;
    let max_z = terrain.heights.relief() + wall_padding as f32;
    for y in 0..terrain.heights.height() {
        for x in 0..terrain.heights.width() {
            let sample = terrain.heights.sample(x, y).unwrap();
            assert!(
                min_z - 1e-3 <= sample && sample <= max_z + 1e-3,
                "sample {} outside [{}, {}]",
                sample,
                min_z,
                max_z
            );
        }
    }

    // Smoothed normals are unit length.
    for normal in terrain.mesh.normals() {
        let len = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-4);
    }
}

#[tokio::test]
async fn end_to_end_texture_dimensions_match_insets() {
    let service = make_service(reference_config());
    let cancel = CancellationToken::new();
    let bbox = reference_bbox();

    let set = covering_tiles(&bbox, 12, TILE_SIZE).unwrap();
    let raster = service
        .fetch_texture(&bbox, &cancel, |_, _| {})
        .await
        .unwrap();

    assert_eq!(raster.width(), set.cropped_width());
    assert_eq!(raster.height(), set.cropped_height());
}

#[tokio::test]
async fn end_to_end_progress_is_monotonic_per_stage() {
    let service = make_service(reference_config().with_wall_padding(10.0));
    let cancel = CancellationToken::new();
    let updates = Mutex::new(Vec::new());

    service
        .fetch_terrain(&reference_bbox(), &cancel, |stage, p| {
            updates.lock().unwrap().push((stage, p));
        })
        .await
        .unwrap();

    let updates = updates.lock().unwrap();
    for stage in [Stage::HeightFetch, Stage::MeshBuild] {
        let staged: Vec<_> = updates
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, p)| *p)
            .collect();
        assert!(!staged.is_empty(), "no progress for {:?}", stage);
        for window in staged.windows(2) {
            assert!(
                window[1].completed > window[0].completed,
                "{:?} progress not monotonic",
                stage
            );
        }
        assert!(staged.last().unwrap().is_complete());
    }
}

#[tokio::test]
async fn end_to_end_cancellation_mid_fetch() {
    let service = make_service(reference_config());
    let cancel = CancellationToken::new();
    let cancel_inner = cancel.clone();
    let after_cancel = Arc::new(AtomicUsize::new(0));
    let after_cancel_probe = Arc::clone(&after_cancel);

    let result = service
        .fetch_terrain(&reference_bbox(), &cancel, move |_, p| {
            if cancel_inner.is_cancelled() {
                after_cancel_probe.fetch_add(1, Ordering::SeqCst);
            }
            if p.completed == 2 {
                cancel_inner.cancel();
            }
        })
        .await;

    assert!(matches!(result, Err(TerrainError::Cancelled)));
    assert_eq!(
        after_cancel.load(Ordering::SeqCst),
        0,
        "progress fired after cancellation"
    );
}
