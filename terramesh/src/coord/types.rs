//! Coordinate types and validation.

use std::fmt;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (degrees).
pub const MAX_LON: f64 = 180.0;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level supported by the tile grid math.
pub const MAX_ZOOM: u8 = 22;

/// Errors from coordinate validation and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range or not finite.
    InvalidLatitude(f64),
    /// Longitude outside [-180, 180] or not finite.
    InvalidLongitude(f64),
    /// Zoom level beyond [`MAX_ZOOM`].
    InvalidZoom(u8),
    /// Bounding box corners are not strictly ordered south-west < north-east.
    InvalidBounds {
        south_west: (f64, f64),
        north_east: (f64, f64),
    },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => write!(f, "Invalid latitude: {}", lat),
            CoordError::InvalidLongitude(lon) => write!(f, "Invalid longitude: {}", lon),
            CoordError::InvalidZoom(zoom) => write!(f, "Invalid zoom level: {}", zoom),
            CoordError::InvalidBounds {
                south_west,
                north_east,
            } => write!(
                f,
                "Invalid bounds: south-west {:?} must be strictly below and west of north-east {:?}",
                south_west, north_east
            ),
        }
    }
}

impl std::error::Error for CoordError {}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point, validating the Web Mercator coordinate ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// A geographic bounding box.
///
/// Invariant: `south_west.lat < north_east.lat` and
/// `south_west.lon < north_east.lon`; construction fails otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    south_west: GeoPoint,
    north_east: GeoPoint,
}

impl GeoBoundingBox {
    /// Create a bounding box from its south-west and north-east corners.
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Result<Self, CoordError> {
        if south_west.lat >= north_east.lat || south_west.lon >= north_east.lon {
            return Err(CoordError::InvalidBounds {
                south_west: (south_west.lat, south_west.lon),
                north_east: (north_east.lat, north_east.lon),
            });
        }
        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Create a bounding box from raw corner coordinates.
    pub fn from_corners(
        south_lat: f64,
        west_lon: f64,
        north_lat: f64,
        east_lon: f64,
    ) -> Result<Self, CoordError> {
        Self::new(
            GeoPoint::new(south_lat, west_lon)?,
            GeoPoint::new(north_lat, east_lon)?,
        )
    }

    /// South-west corner.
    pub fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    /// North-east corner.
    pub fn north_east(&self) -> GeoPoint {
        self.north_east
    }

    /// Geographic center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lon: (self.south_west.lon + self.north_east.lon) / 2.0,
        }
    }
}

/// A tile index in the slippy-map grid.
///
/// Valid range: `0 <= x, y < 2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoordinate {
    /// Zoom level.
    pub zoom: u8,
    /// Column, increasing eastward.
    pub x: u32,
    /// Row, increasing southward.
    pub y: u32,
}

/// A tile index together with the pixel offset of a coordinate inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePixel {
    /// The tile containing the coordinate.
    pub tile: TileCoordinate,
    /// Horizontal pixel offset within the tile, `[0, tile_size)`.
    pub pixel_x: u32,
    /// Vertical pixel offset within the tile, `[0, tile_size)`.
    pub pixel_y: u32,
}

/// Pixel crop amounts trimming a tile-aligned canvas to an exact bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

/// The contiguous tile range covering a bounding box, with crop insets.
///
/// Produced once per fetch request by
/// [`covering_tiles`](crate::coord::covering_tiles); immutable thereafter.
/// The x and y ranges are inclusive and ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndexSet {
    zoom: u8,
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
    tile_size: u32,
    insets: Insets,
}

impl TileIndexSet {
    pub(crate) fn new(
        zoom: u8,
        min_x: u32,
        max_x: u32,
        min_y: u32,
        max_y: u32,
        tile_size: u32,
        insets: Insets,
    ) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            zoom,
            min_x,
            max_x,
            min_y,
            max_y,
            tile_size,
            insets,
        }
    }

    /// Zoom level of the covered tiles.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Per-tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Crop insets for the stitched canvas.
    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Tile columns, ascending.
    pub fn xs(&self) -> impl Iterator<Item = u32> + '_ {
        self.min_x..=self.max_x
    }

    /// Tile rows, ascending.
    pub fn ys(&self) -> impl Iterator<Item = u32> + '_ {
        self.min_y..=self.max_y
    }

    /// Number of tile columns.
    pub fn width_tiles(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of tile rows.
    pub fn height_tiles(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Total tiles in the grid.
    pub fn tile_count(&self) -> usize {
        self.width_tiles() as usize * self.height_tiles() as usize
    }

    /// Width of the uncropped canvas in pixels.
    pub fn canvas_width(&self) -> u32 {
        self.width_tiles() * self.tile_size
    }

    /// Height of the uncropped canvas in pixels.
    pub fn canvas_height(&self) -> u32 {
        self.height_tiles() * self.tile_size
    }

    /// Width after cropping by the insets.
    pub fn cropped_width(&self) -> u32 {
        self.canvas_width() - self.insets.left - self.insets.right
    }

    /// Height after cropping by the insets.
    pub fn cropped_height(&self) -> u32 {
        self.canvas_height() - self.insets.top - self.insets.bottom
    }

    /// Row-major iteration over `(col, row, tile_x, tile_y)`.
    ///
    /// `col`/`row` are grid positions for the stitch canvas; `tile_x`/`tile_y`
    /// are slippy-map tile indices. Each `(col, row)` pair is yielded exactly
    /// once, so stitch slots are unique by construction.
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32, u32, u32)> + '_ {
        let (min_x, min_y) = (self.min_x, self.min_y);
        (self.min_y..=self.max_y).flat_map(move |y| {
            (min_x..=self.max_x).map(move |x| (x - min_x, y - min_y, x, y))
        })
    }
}
