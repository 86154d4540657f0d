//! Raster tileset provider.
//!
//! Fetches individual raster tiles from a z/x/y tileset endpoint.
//!
//! # URL Pattern
//!
//! `{host}/v4/{tileset}/{z}/{x}/{y}.{format}?access_token={token}`
//!
//! - Standard XYZ tile coordinates (x=col west→east, y=row north→south)
//! - Requires an access token
//!
//! # Formats
//!
//! Elevation tilesets must be fetched as PNG: the height encoding packs the
//! elevation into exact RGB values and does not survive lossy compression.
//! Imagery tilesets may use JPEG for smaller transfers.

use tracing::debug;

use super::http::AsyncHttpClient;
use super::types::{FetchError, TileSource};
use crate::tile::RasterTile;

/// Raster tile image format requested from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileImageFormat {
    /// Lossless PNG. Required for elevation-encoded tilesets.
    #[default]
    Png,
    /// JPEG at quality 90. Suitable for imagery.
    Jpg,
}

impl TileImageFormat {
    /// File extension used in the tile URL.
    pub fn extension(&self) -> &'static str {
        match self {
            TileImageFormat::Png => "png",
            TileImageFormat::Jpg => "jpg90",
        }
    }
}

/// Endpoint configuration for a raster tileset.
#[derive(Debug, Clone)]
pub struct RasterEndpoint {
    /// Service host, e.g. `https://api.mapbox.com`.
    pub host: String,
    /// Tileset identifier, e.g. `mapbox.terrain-rgb`.
    pub tileset: String,
    /// Requested tile format.
    pub format: TileImageFormat,
    /// Opaque credential appended as `access_token`.
    pub access_token: String,
}

/// Tile provider for a z/x/y raster tileset.
pub struct RasterTileProvider<C: AsyncHttpClient> {
    http_client: C,
    endpoint: RasterEndpoint,
}

impl<C: AsyncHttpClient> RasterTileProvider<C> {
    /// Creates a new raster tile provider.
    pub fn new(http_client: C, endpoint: RasterEndpoint) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    /// Builds the tile URL for the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UrlConstruction`] when the endpoint template is
    /// incomplete (empty host, tileset, or access token).
    pub fn build_url(&self, x: u32, y: u32, zoom: u8) -> Result<String, FetchError> {
        if self.endpoint.host.is_empty() {
            return Err(FetchError::UrlConstruction("empty host".to_string()));
        }
        if self.endpoint.tileset.is_empty() {
            return Err(FetchError::UrlConstruction("empty tileset".to_string()));
        }
        if self.endpoint.access_token.is_empty() {
            return Err(FetchError::UrlConstruction(
                "empty access token".to_string(),
            ));
        }

        Ok(format!(
            "{}/v4/{}/{}/{}/{}.{}?access_token={}",
            self.endpoint.host,
            self.endpoint.tileset,
            zoom,
            x,
            y,
            self.endpoint.format.extension(),
            self.endpoint.access_token,
        ))
    }
}

impl<C: AsyncHttpClient> TileSource for RasterTileProvider<C> {
    async fn fetch_tile(&self, x: u32, y: u32, zoom: u8) -> Result<RasterTile, FetchError> {
        if !self.supports_zoom(zoom) {
            return Err(FetchError::UnsupportedZoom(zoom));
        }

        let url = self.build_url(x, y, zoom)?;
        debug!(tileset = %self.endpoint.tileset, zoom, x, y, "fetching tile");
        let bytes = self.http_client.get(&url).await?;
        RasterTile::decode(&bytes)
    }

    fn name(&self) -> &str {
        &self.endpoint.tileset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;
    use bytes::Bytes;
    use image::RgbaImage;

    fn sample_endpoint() -> RasterEndpoint {
        RasterEndpoint {
            host: "https://tiles.example.com".to_string(),
            tileset: "example.terrain".to_string(),
            format: TileImageFormat::Png,
            access_token: "tok123".to_string(),
        }
    }

    fn sample_png(width: u32, height: u32) -> Bytes {
        let image = RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        Bytes::from(bytes)
    }

    #[test]
    fn test_url_construction() {
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::new())),
            sample_endpoint(),
        );

        let url = provider.build_url(654, 1582, 12).unwrap();
        assert_eq!(
            url,
            "https://tiles.example.com/v4/example.terrain/12/654/1582.png?access_token=tok123"
        );
    }

    #[test]
    fn test_url_construction_jpg_format() {
        let mut endpoint = sample_endpoint();
        endpoint.format = TileImageFormat::Jpg;
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::new())),
            endpoint,
        );

        let url = provider.build_url(0, 0, 0).unwrap();
        assert!(url.ends_with("/0/0/0.jpg90?access_token=tok123"));
    }

    #[test]
    fn test_url_construction_rejects_empty_token() {
        let mut endpoint = sample_endpoint();
        endpoint.access_token = String::new();
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::new())),
            endpoint,
        );

        assert!(matches!(
            provider.build_url(1, 2, 3),
            Err(FetchError::UrlConstruction(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_tile_success() {
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(sample_png(8, 8))),
            sample_endpoint(),
        );

        let tile = provider.fetch_tile(654, 1582, 12).await.unwrap();
        assert_eq!(tile.width(), 8);
        assert_eq!(tile.height(), 8);
    }

    #[tokio::test]
    async fn test_fetch_tile_unsupported_zoom() {
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(sample_png(8, 8))),
            sample_endpoint(),
        );

        let result = provider.fetch_tile(0, 0, 23).await;
        assert!(matches!(result, Err(FetchError::UnsupportedZoom(23))));
    }

    #[tokio::test]
    async fn test_fetch_tile_http_status_propagates() {
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Err(FetchError::HttpStatus(404))),
            sample_endpoint(),
        );

        let result = provider.fetch_tile(1, 2, 10).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_tile_decode_failure() {
        let provider = RasterTileProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::from_static(b"not an image"))),
            sample_endpoint(),
        );

        let result = provider.fetch_tile(1, 2, 10).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
