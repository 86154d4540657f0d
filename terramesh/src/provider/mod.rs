//! Tile endpoint providers
//!
//! This module provides the HTTP client seam and the providers that turn
//! tile/style endpoint templates into decoded [`RasterTile`](crate::tile::RasterTile)s:
//!
//! - [`RasterTileProvider`] - z/x/y tileset fetches (imagery and elevation)
//! - [`StaticStyleProvider`] - server-rendered images centered on a point
//!
//! Both are generic over [`AsyncHttpClient`] so tests can substitute a mock
//! client instead of real network traffic.

mod http;
mod raster;
mod style;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use raster::{RasterEndpoint, RasterTileProvider, TileImageFormat};
pub use style::{StaticStyleProvider, StyleEndpoint};
pub use types::{FetchError, TileSource, PROVIDER_MAX_ZOOM, PROVIDER_MIN_ZOOM};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
