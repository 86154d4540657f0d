//! Service configuration.

use crate::fetch::DEFAULT_MAX_IN_FLIGHT;
use crate::height::retry::DEFAULT_MAX_ATTEMPTS;
use crate::provider::TileImageFormat;

/// Default per-tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default service host.
pub const DEFAULT_TILE_HOST: &str = "https://api.mapbox.com";

/// Default imagery tileset.
pub const DEFAULT_TEXTURE_TILESET: &str = "mapbox.satellite";

/// Default elevation-encoded tileset.
pub const DEFAULT_ELEVATION_TILESET: &str = "mapbox.terrain-rgb";

/// Configuration for [`TerrainService`](crate::service::TerrainService).
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    /// Tile service host.
    pub tile_host: String,
    /// Opaque credential sent as `access_token`.
    pub access_token: String,
    /// Tileset used for texture fetches.
    pub texture_tileset: String,
    /// Tileset used for elevation fetches (fetched as PNG).
    pub elevation_tileset: String,
    /// Image format for texture tiles.
    pub texture_format: TileImageFormat,
    /// Per-tile edge length in pixels.
    pub tile_size: u32,
    /// Concurrency window for tile fetches.
    pub max_in_flight: usize,
    /// Total fetch attempts for the terrain-height path.
    pub max_attempts: u32,
    /// Vertical exaggeration multiplier applied to decoded heights.
    pub exaggeration: f64,
    /// Wall padding in meters; zero disables skirt walls and the bottom cap.
    pub wall_padding: f64,
    /// Smooth per-vertex normals for shadow-quality shading.
    pub shadow_quality_normals: bool,
    /// Fixed zoom level instead of fitting the bounding box to a viewport.
    pub zoom_override: Option<u8>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_host: DEFAULT_TILE_HOST.to_string(),
            access_token: String::new(),
            texture_tileset: DEFAULT_TEXTURE_TILESET.to_string(),
            elevation_tileset: DEFAULT_ELEVATION_TILESET.to_string(),
            texture_format: TileImageFormat::Jpg,
            tile_size: DEFAULT_TILE_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            exaggeration: 1.0,
            wall_padding: 0.0,
            shadow_quality_normals: false,
            zoom_override: None,
            timeout_secs: 30,
        }
    }
}

impl TerrainConfig {
    /// Create a config with the given access token and defaults elsewhere.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Set the tile service host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.tile_host = host.into();
        self
    }

    /// Set the texture and elevation tilesets.
    pub fn with_tilesets(
        mut self,
        texture: impl Into<String>,
        elevation: impl Into<String>,
    ) -> Self {
        self.texture_tileset = texture.into();
        self.elevation_tileset = elevation.into();
        self
    }

    /// Set the per-tile edge length.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the fetch concurrency window.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Set the total attempts for the terrain-height path.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the vertical exaggeration multiplier.
    pub fn with_exaggeration(mut self, exaggeration: f64) -> Self {
        self.exaggeration = exaggeration;
        self
    }

    /// Set the wall padding in meters (zero disables walls).
    pub fn with_wall_padding(mut self, wall_padding: f64) -> Self {
        self.wall_padding = wall_padding;
        self
    }

    /// Enable shadow-quality smoothed normals.
    pub fn with_shadow_quality_normals(mut self, enabled: bool) -> Self {
        self.shadow_quality_normals = enabled;
        self
    }

    /// Pin the fetch zoom level.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom_override = Some(zoom);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = TerrainConfig::default();
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.max_in_flight, 10);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.exaggeration, 1.0);
        assert_eq!(config.wall_padding, 0.0);
        assert!(!config.shadow_quality_normals);
        assert!(config.zoom_override.is_none());
    }

    #[test]
    fn test_builder_methods_chain() {
        let config = TerrainConfig::new("tok")
            .with_host("https://tiles.example.com")
            .with_tilesets("img", "elev")
            .with_tile_size(512)
            .with_max_in_flight(4)
            .with_max_attempts(5)
            .with_exaggeration(1.5)
            .with_wall_padding(20.0)
            .with_shadow_quality_normals(true)
            .with_zoom(14);

        assert_eq!(config.access_token, "tok");
        assert_eq!(config.tile_host, "https://tiles.example.com");
        assert_eq!(config.texture_tileset, "img");
        assert_eq!(config.elevation_tileset, "elev");
        assert_eq!(config.tile_size, 512);
        assert_eq!(config.max_in_flight, 4);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.exaggeration, 1.5);
        assert_eq!(config.wall_padding, 20.0);
        assert!(config.shadow_quality_normals);
        assert_eq!(config.zoom_override, Some(14));
    }
}
