//! Heightmap decoding
//!
//! Converts a stitched elevation-encoded raster into a grid of real-world
//! heights. Each pixel packs its elevation into the RGB channels:
//!
//! ```text
//! height_m = -10000 + (R · 65536 + G · 256 + B) · 0.1
//! ```
//!
//! This is the published terrain-RGB encoding and is reproduced exactly.
//! After decoding, the grid is normalized by subtracting its minimum (plus
//! an optional wall padding), so the lowest point sits at `padding` and every
//! value is non-negative. The pre-normalization minimum and maximum are kept
//! for wall-height computation.

pub mod retry;

pub use retry::{fetch_with_retry, ZoomLadder};

use crate::error::TerrainError;
use crate::stitch::StitchedRaster;

/// Decode one elevation-encoded pixel into meters.
#[inline]
fn decode_pixel(r: u8, g: u8, b: u8) -> f64 {
    -10000.0 + (f64::from(r) * 65536.0 + f64::from(g) * 256.0 + f64::from(b)) * 0.1
}

/// A grid of normalized terrain heights in meters.
///
/// Row-major, same dimensions as the decoded raster. Every value is
/// `>= wall_padding >= 0`; the pre-normalization bounds are available via
/// [`min`](Self::min) and [`max`](Self::max).
#[derive(Debug, Clone)]
pub struct HeightGrid {
    heights: Vec<f32>,
    width: usize,
    height: usize,
    min: f32,
    max: f32,
}

impl HeightGrid {
    /// Grid width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pre-normalization minimum height (exaggeration applied).
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Pre-normalization maximum height (exaggeration applied).
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Height spread between the lowest and highest sample.
    pub fn relief(&self) -> f32 {
        self.max - self.min
    }

    /// Normalized height at `(x, y)`, or `None` when the cell is out of
    /// bounds or holds no usable sample.
    pub fn sample(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.heights[y * self.width + x];
        value.is_finite().then_some(value)
    }

    /// Build a grid directly from normalized samples (for tests and tools).
    ///
    /// `min`/`max` are the pre-normalization bounds the samples were
    /// normalized against.
    pub fn from_samples(
        heights: Vec<f32>,
        width: usize,
        height: usize,
        min: f32,
        max: f32,
    ) -> Self {
        debug_assert_eq!(heights.len(), width * height);
        Self {
            heights,
            width,
            height,
            min,
            max,
        }
    }
}

/// Decode a stitched elevation raster into a normalized height grid.
///
/// `exaggeration` scales every height before normalization; `wall_padding`
/// is added to every normalized value so the terrain floats that far above
/// the mesh base plane.
///
/// # Errors
///
/// Returns [`TerrainError::Decode`] when the raster has no readable pixels.
pub fn decode_heightmap(
    raster: &StitchedRaster,
    exaggeration: f64,
    wall_padding: f64,
) -> Result<HeightGrid, TerrainError> {
    let image = raster.image();
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return Err(TerrainError::Decode(
            "elevation raster has no pixels".to_string(),
        ));
    }

    let mut raw = Vec::with_capacity(width * height);
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for pixel in image.pixels() {
        let [r, g, b, _] = pixel.0;
        let value = decode_pixel(r, g, b) * exaggeration;
        min = min.min(value);
        max = max.max(value);
        raw.push(value);
    }

    let heights = raw
        .into_iter()
        .map(|value| (value - min + wall_padding) as f32)
        .collect();

    Ok(HeightGrid {
        heights,
        width,
        height,
        min: min as f32,
        max: max as f32,
    })
}
