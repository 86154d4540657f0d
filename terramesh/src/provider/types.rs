//! Provider trait and error types.

use thiserror::Error;

use crate::tile::RasterTile;

/// Minimum zoom level served by the tile endpoints.
pub const PROVIDER_MIN_ZOOM: u8 = 0;

/// Maximum zoom level served by the tile endpoints.
pub const PROVIDER_MAX_ZOOM: u8 = 22;

/// Errors from tile fetching and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A request URL could not be built from the endpoint template.
    #[error("Failed to construct URL: {0}")]
    UrlConstruction(String),

    /// The request produced no HTTP response.
    #[error("No HTTP response: {0}")]
    Transport(String),

    /// The server answered with a status outside [200, 304].
    #[error("Unacceptable HTTP status: {0}")]
    HttpStatus(u16),

    /// Response bytes were not a decodable raster image.
    #[error("Failed to decode raster: {0}")]
    Decode(String),

    /// The requested zoom level is outside the provider's supported range.
    #[error("Unsupported zoom level: {0}")]
    UnsupportedZoom(u8),
}

/// A source of raster tiles addressed by slippy-map indices.
///
/// This is the seam between the fetch orchestrator and the network layer:
/// the orchestrator only needs `(x, y, zoom) → RasterTile`. Implementations
/// must be thread-safe (`Send + Sync`) so fetches can run concurrently.
///
/// No retry happens at this layer; the zoom-degradation policy owns retries
/// for the terrain-height path.
pub trait TileSource: Send + Sync {
    /// Fetch and decode a single tile.
    async fn fetch_tile(&self, x: u32, y: u32, zoom: u8) -> Result<RasterTile, FetchError>;

    /// Human-readable source name for logging.
    fn name(&self) -> &str;

    /// Minimum supported zoom level.
    fn min_zoom(&self) -> u8 {
        PROVIDER_MIN_ZOOM
    }

    /// Maximum supported zoom level.
    fn max_zoom(&self) -> u8 {
        PROVIDER_MAX_ZOOM
    }

    /// Whether the given zoom level is within the supported range.
    fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }
}
