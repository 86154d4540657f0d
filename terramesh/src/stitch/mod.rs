//! Image stitching
//!
//! Composes a grid of same-size tiles into one canvas, then crops by the
//! [`Insets`](crate::coord::Insets) so the final raster covers exactly the
//! requested bounding box rather than whole-tile granularity.
//!
//! Each `(col, row)` slot targets a unique, non-overlapping sub-rectangle of
//! the canvas, so sequencing the writes is the only synchronization needed;
//! the builder rejects a second write to an already-filled slot.

use std::fmt;

use image::{GenericImage, RgbaImage};

use crate::coord::{Insets, TileIndexSet};
use crate::tile::RasterTile;

/// Errors from canvas assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// Tile dimensions do not match the configured per-tile size.
    SizeMismatch {
        expected: u32,
        width: u32,
        height: u32,
    },
    /// Grid slot outside the canvas.
    SlotOutOfBounds {
        col: u32,
        row: u32,
        cols: u32,
        rows: u32,
    },
    /// Grid slot already holds a tile.
    SlotAlreadyWritten { col: u32, row: u32 },
    /// No tiles were written before finalizing.
    EmptyCanvas,
    /// Pixel copy into the canvas failed.
    Canvas(String),
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchError::SizeMismatch {
                expected,
                width,
                height,
            } => write!(
                f,
                "Tile size {}×{} does not match expected {}×{}",
                width, height, expected, expected
            ),
            StitchError::SlotOutOfBounds {
                col,
                row,
                cols,
                rows,
            } => write!(
                f,
                "Slot ({}, {}) outside {}×{} grid",
                col, row, cols, rows
            ),
            StitchError::SlotAlreadyWritten { col, row } => {
                write!(f, "Slot ({}, {}) already written", col, row)
            }
            StitchError::EmptyCanvas => write!(f, "No tiles written to canvas"),
            StitchError::Canvas(msg) => write!(f, "Canvas write failed: {}", msg),
        }
    }
}

impl std::error::Error for StitchError {}

/// A fully assembled, inset-cropped raster.
#[derive(Debug, Clone)]
pub struct StitchedRaster {
    image: RgbaImage,
}

impl StitchedRaster {
    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixel data.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the raster, returning the pixel data.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Assembles same-size tiles into a canvas and crops it to the bounding box.
///
/// Write each tile with [`add_tile`](Self::add_tile) at the grid position the
/// orchestrator assigned it, in any completion order, then call
/// [`finalize`](Self::finalize).
pub struct ImageBuilder {
    canvas: RgbaImage,
    tile_size: u32,
    cols: u32,
    rows: u32,
    insets: Insets,
    written: Vec<bool>,
    tiles_written: usize,
}

impl ImageBuilder {
    /// Create a builder sized for the given tile range.
    pub fn new(grid: &TileIndexSet) -> Self {
        let cols = grid.width_tiles();
        let rows = grid.height_tiles();
        Self {
            canvas: RgbaImage::new(grid.canvas_width(), grid.canvas_height()),
            tile_size: grid.tile_size(),
            cols,
            rows,
            insets: grid.insets(),
            written: vec![false; cols as usize * rows as usize],
            tiles_written: 0,
        }
    }

    /// Write a tile's pixels into the canvas at `(col × tile_size, row × tile_size)`.
    ///
    /// # Errors
    ///
    /// Fails when the tile is not exactly `tile_size` square, the slot is
    /// outside the grid, or the slot was already written.
    pub fn add_tile(&mut self, col: u32, row: u32, tile: &RasterTile) -> Result<(), StitchError> {
        if tile.width() != self.tile_size || tile.height() != self.tile_size {
            return Err(StitchError::SizeMismatch {
                expected: self.tile_size,
                width: tile.width(),
                height: tile.height(),
            });
        }
        if col >= self.cols || row >= self.rows {
            return Err(StitchError::SlotOutOfBounds {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }

        let slot = (row * self.cols + col) as usize;
        if self.written[slot] {
            return Err(StitchError::SlotAlreadyWritten { col, row });
        }

        self.canvas
            .copy_from(tile.image(), col * self.tile_size, row * self.tile_size)
            .map_err(|e| StitchError::Canvas(format!("{}", e)))?;
        self.written[slot] = true;
        self.tiles_written += 1;
        Ok(())
    }

    /// Number of tiles written so far.
    pub fn tiles_written(&self) -> usize {
        self.tiles_written
    }

    /// Crop the canvas by the stored insets and return the final raster.
    ///
    /// # Errors
    ///
    /// Fails with [`StitchError::EmptyCanvas`] when no tiles were written.
    pub fn finalize(self) -> Result<StitchedRaster, StitchError> {
        if self.tiles_written == 0 {
            return Err(StitchError::EmptyCanvas);
        }

        let width = self.canvas.width() - self.insets.left - self.insets.right;
        let height = self.canvas.height() - self.insets.top - self.insets.bottom;
        let image = image::imageops::crop_imm(
            &self.canvas,
            self.insets.left,
            self.insets.top,
            width,
            height,
        )
        .to_image();

        Ok(StitchedRaster { image })
    }
}
