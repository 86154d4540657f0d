//! Decoded raster tile type.

use image::RgbaImage;

use crate::provider::FetchError;

/// A decoded raster tile.
///
/// Owns the pixel data for one fetched tile. Its logical `(col, row)` grid
/// position is assigned by the fetch orchestrator when the tile is handed to
/// the stitcher; the tile itself is position-agnostic.
#[derive(Debug, Clone)]
pub struct RasterTile {
    image: RgbaImage,
}

impl RasterTile {
    /// Wrap an already-decoded image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode response bytes into a tile.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] when the bytes are not a valid raster
    /// image.
    pub fn decode(bytes: &[u8]) -> Result<Self, FetchError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| FetchError::Decode(format!("{}", e)))?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Tile width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Tile height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the decoded pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the tile, returning the decoded pixels.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
