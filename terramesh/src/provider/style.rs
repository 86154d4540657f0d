//! Static style image provider.
//!
//! Fetches a single rendered map image centered on a coordinate, used for
//! style-tile texturing where a whole area is rendered server-side instead
//! of being stitched from z/x/y tiles.
//!
//! # URL Pattern
//!
//! `{host}/styles/v1/{style}/static/{lon},{lat},{zoom}/{width}x{height}?access_token={token}&attribution=false&logo=false`
//!
//! Requests carry `Accept: image/*;q=0.8`.

use tracing::debug;

use super::http::AsyncHttpClient;
use super::types::FetchError;
use crate::coord::{tile_center, GeoPoint, TileCoordinate};
use crate::tile::RasterTile;

/// Accept header sent with static style requests.
const STYLE_ACCEPT_HEADER: &str = "image/*;q=0.8";

/// Endpoint configuration for a static style renderer.
#[derive(Debug, Clone)]
pub struct StyleEndpoint {
    /// Service host, e.g. `https://api.mapbox.com`.
    pub host: String,
    /// Style identifier, e.g. `mapbox/satellite-v9`.
    pub style: String,
    /// Opaque credential appended as `access_token`.
    pub access_token: String,
}

/// Provider for server-rendered static style images.
pub struct StaticStyleProvider<C: AsyncHttpClient> {
    http_client: C,
    endpoint: StyleEndpoint,
}

impl<C: AsyncHttpClient> StaticStyleProvider<C> {
    /// Creates a new static style provider.
    pub fn new(http_client: C, endpoint: StyleEndpoint) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    /// Builds the static image URL for a center point, zoom, and pixel size.
    pub fn build_url(
        &self,
        center: GeoPoint,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> Result<String, FetchError> {
        if self.endpoint.host.is_empty() {
            return Err(FetchError::UrlConstruction("empty host".to_string()));
        }
        if self.endpoint.style.is_empty() {
            return Err(FetchError::UrlConstruction("empty style".to_string()));
        }
        if self.endpoint.access_token.is_empty() {
            return Err(FetchError::UrlConstruction(
                "empty access token".to_string(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(FetchError::UrlConstruction(format!(
                "invalid image size {}x{}",
                width, height
            )));
        }

        Ok(format!(
            "{}/styles/v1/{}/static/{},{},{}/{}x{}?access_token={}&attribution=false&logo=false",
            self.endpoint.host,
            self.endpoint.style,
            center.lon,
            center.lat,
            zoom,
            width,
            height,
            self.endpoint.access_token,
        ))
    }

    /// Fetches a static image centered on the given point.
    pub async fn fetch_static(
        &self,
        center: GeoPoint,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> Result<RasterTile, FetchError> {
        let url = self.build_url(center, zoom, width, height)?;
        debug!(style = %self.endpoint.style, zoom, lat = center.lat, lon = center.lon, "fetching static style image");
        let bytes = self.http_client.get_with_accept(&url, STYLE_ACCEPT_HEADER).await?;
        RasterTile::decode(&bytes)
    }

    /// Fetches a static image centered on a tile, for style-tile texturing.
    pub async fn fetch_for_tile(
        &self,
        tile: &TileCoordinate,
        width: u32,
        height: u32,
    ) -> Result<RasterTile, FetchError> {
        let center = tile_center(tile)
            .map_err(|e| FetchError::UrlConstruction(format!("tile centroid: {}", e)))?;
        self.fetch_static(center, tile.zoom, width, height).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;
    use bytes::Bytes;
    use image::RgbaImage;

    fn sample_endpoint() -> StyleEndpoint {
        StyleEndpoint {
            host: "https://tiles.example.com".to_string(),
            style: "example/satellite-v9".to_string(),
            access_token: "tok123".to_string(),
        }
    }

    fn sample_png() -> Bytes {
        let image = RgbaImage::new(16, 16);
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
        let provider = StaticStyleProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::new())),
            sample_endpoint(),
        );
        let center = GeoPoint::new(37.75, -122.44).unwrap();

        let url = provider.build_url(center, 12, 512, 256).unwrap();
        assert_eq!(
            url,
            "https://tiles.example.com/styles/v1/example/satellite-v9/static/-122.44,37.75,12/512x256?access_token=tok123&attribution=false&logo=false"
        );
    }

    #[test]
    fn test_url_construction_rejects_zero_size() {
        let provider = StaticStyleProvider::new(
            MockAsyncHttpClient::with_response(Ok(Bytes::new())),
            sample_endpoint(),
        );
        let center = GeoPoint::new(0.0, 0.0).unwrap();

        assert!(matches!(
            provider.build_url(center, 12, 0, 256),
            Err(FetchError::UrlConstruction(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_static_sends_accept_header() {
        let mock = MockAsyncHttpClient::with_response(Ok(sample_png()));
        let provider = StaticStyleProvider::new(mock, sample_endpoint());
        let center = GeoPoint::new(37.75, -122.44).unwrap();

        let tile = provider.fetch_static(center, 12, 16, 16).await.unwrap();
        assert_eq!(tile.width(), 16);

        let requests = provider.http_client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1.as_deref(), Some("image/*;q=0.8"));
    }

    #[tokio::test]
    async fn test_fetch_for_tile_centers_on_tile() {
        let mock = MockAsyncHttpClient::with_response(Ok(sample_png()));
        let provider = StaticStyleProvider::new(mock, sample_endpoint());

        // Tile (512, 512) at zoom 10 straddles the equator/prime meridian,
        // so the centroid in the URL is near 0,0.
        let tile = TileCoordinate {
            zoom: 10,
            x: 512,
            y: 512,
        };
        provider.fetch_for_tile(&tile, 16, 16).await.unwrap();

        let urls = provider.http_client.requested_urls();
        assert!(urls[0].contains("/static/0.17"), "unexpected url: {}", urls[0]);
    }
}
