//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, plus the bounding-box → tile-range
//! derivation (with pixel insets) that drives the fetch/stitch pipeline.

mod types;

pub use types::{
    CoordError, GeoBoundingBox, GeoPoint, Insets, TileCoordinate, TileIndexSet, TilePixel,
    MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Reference viewport edge (pixels) used by [`zoom_for_bounds`].
pub const REFERENCE_VIEWPORT_PX: u64 = 1280;

/// Earth circumference at the equator in meters (WGS84).
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Tile size assumed by [`zoom_for_bounds`] when sizing the viewport.
const VIEWPORT_TILE_SIZE: u32 = 256;

/// Global pixel position of a coordinate at the given zoom.
///
/// Pixels are clamped into `[0, 2^zoom * tile_size)` so coordinates exactly
/// on the antimeridian or pole edge land in the last tile.
fn world_pixel(lat: f64, lon: f64, zoom: u8, tile_size: u32) -> (u64, u64) {
    let n = 2.0_f64.powi(i32::from(zoom));
    let world = n * f64::from(tile_size);

    let xf = (lon + 180.0) / 360.0 * world;

    let lat_rad = lat.to_radians();
    let yf = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;

    let max = world as u64 - 1;
    let gx = (xf.floor().max(0.0) as u64).min(max);
    let gy = (yf.floor().max(0.0) as u64).min(max);
    (gx, gy)
}

/// Converts geographic coordinates to a tile index plus intra-tile pixel offset.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
/// * `tile_size` - Per-tile edge length in pixels
///
/// # Returns
///
/// A `Result` containing the tile and pixel offsets, or an error if inputs
/// are invalid.
#[inline]
pub fn tile_for_coordinate(
    lat: f64,
    lon: f64,
    zoom: u8,
    tile_size: u32,
) -> Result<TilePixel, CoordError> {
    let point = GeoPoint::new(lat, lon)?;
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let (gx, gy) = world_pixel(point.lat, point.lon, zoom, tile_size);
    let ts = u64::from(tile_size);

    Ok(TilePixel {
        tile: TileCoordinate {
            zoom,
            x: (gx / ts) as u32,
            y: (gy / ts) as u32,
        },
        pixel_x: (gx % ts) as u32,
        pixel_y: (gy % ts) as u32,
    })
}

/// Converts a tile index back to the geographic bounds it covers.
#[inline]
pub fn bounding_box_for_tile(tile: &TileCoordinate) -> Result<GeoBoundingBox, CoordError> {
    if tile.zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(tile.zoom));
    }
    let n = 2.0_f64.powi(i32::from(tile.zoom));

    let lon_west = f64::from(tile.x) / n * 360.0 - 180.0;
    let lon_east = f64::from(tile.x + 1) / n * 360.0 - 180.0;

    let lat_at = |row: f64| (PI * (1.0 - 2.0 * row / n)).sinh().atan().to_degrees();
    let lat_north = lat_at(f64::from(tile.y));
    let lat_south = lat_at(f64::from(tile.y + 1));

    GeoBoundingBox::new(
        GeoPoint::new(lat_south, lon_west)?,
        GeoPoint::new(lat_north, lon_east)?,
    )
}

/// Geographic center of a tile, for style-tile centering.
#[inline]
pub fn tile_center(tile: &TileCoordinate) -> Result<GeoPoint, CoordError> {
    Ok(bounding_box_for_tile(tile)?.center())
}

/// Computes the contiguous tile range covering a bounding box.
///
/// Evaluates the four corner combinations of the box, takes the min/max tile
/// x and y to form an inclusive range, and derives edge insets from the
/// sub-tile pixel offsets at the extremes. Cropping the stitched canvas by
/// the insets yields a raster covering exactly the requested bounding box
/// rather than whole-tile granularity.
pub fn covering_tiles(
    bbox: &GeoBoundingBox,
    zoom: u8,
    tile_size: u32,
) -> Result<TileIndexSet, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    let sw = bbox.south_west();
    let ne = bbox.north_east();

    let corners = [
        tile_for_coordinate(ne.lat, sw.lon, zoom, tile_size)?, // north-west
        tile_for_coordinate(ne.lat, ne.lon, zoom, tile_size)?, // north-east
        tile_for_coordinate(sw.lat, sw.lon, zoom, tile_size)?, // south-west
        tile_for_coordinate(sw.lat, ne.lon, zoom, tile_size)?, // south-east
    ];

    let min_x = corners.iter().map(|c| c.tile.x).min().unwrap_or(0);
    let max_x = corners.iter().map(|c| c.tile.x).max().unwrap_or(0);
    let min_y = corners.iter().map(|c| c.tile.y).min().unwrap_or(0);
    let max_y = corners.iter().map(|c| c.tile.y).max().unwrap_or(0);

    let north_west = corners[0];
    let south_east = corners[3];

    let insets = Insets {
        top: north_west.pixel_y,
        left: north_west.pixel_x,
        bottom: tile_size - 1 - south_east.pixel_y,
        right: tile_size - 1 - south_east.pixel_x,
    };

    Ok(TileIndexSet::new(
        zoom, min_x, max_x, min_y, max_y, tile_size, insets,
    ))
}

/// Picks the maximum zoom at which the bounding box still fits within a
/// single [`REFERENCE_VIEWPORT_PX`]-sized viewport.
///
/// Monotonically non-increasing as the box grows.
pub fn zoom_for_bounds(bbox: &GeoBoundingBox) -> u8 {
    let sw = bbox.south_west();
    let ne = bbox.north_east();

    for zoom in (MIN_ZOOM..=MAX_ZOOM).rev() {
        let (west_x, north_y) = world_pixel(ne.lat, sw.lon, zoom, VIEWPORT_TILE_SIZE);
        let (east_x, south_y) = world_pixel(sw.lat, ne.lon, zoom, VIEWPORT_TILE_SIZE);

        let span_x = east_x.saturating_sub(west_x) + 1;
        let span_y = south_y.saturating_sub(north_y) + 1;
        if span_x <= REFERENCE_VIEWPORT_PX && span_y <= REFERENCE_VIEWPORT_PX {
            return zoom;
        }
    }
    MIN_ZOOM
}

/// Ground resolution in meters per pixel at the given latitude and zoom.
#[inline]
pub fn ground_resolution(lat: f64, zoom: u8, tile_size: u32) -> f64 {
    let world_px = 2.0_f64.powi(i32::from(zoom)) * f64::from(tile_size);
    lat.to_radians().cos() * EARTH_CIRCUMFERENCE_M / world_px
}
