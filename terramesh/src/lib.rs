//! Terramesh - Terrain textures and meshes from map tile services
//!
//! This library turns a geographic bounding box into a stitched raster image
//! assembled from remotely fetched map tiles and a triangulated 3D terrain
//! mesh derived from an elevation-encoded raster.
//!
//! # Architecture
//!
//! ```text
//! GeoBoundingBox ──► coord ──► TileIndexSet ──► fetch (bounded window)
//!                                                  │ uses provider
//!                                                  ▼
//!                                             stitch ──► StitchedRaster
//!                                                  │
//!                             height (decode + zoom-degradation retry)
//!                                                  │
//!                                                  ▼
//!                                HeightGrid ──► mesh ──► TerrainMesh
//! ```
//!
//! The [`service::TerrainService`] facade wires the full flow; individual
//! subsystems are usable on their own.

pub mod config;
pub mod coord;
pub mod error;
pub mod fetch;
pub mod height;
pub mod mesh;
pub mod progress;
pub mod provider;
pub mod service;
pub mod stitch;
pub mod telemetry;
pub mod tile;

pub use config::TerrainConfig;
pub use coord::{GeoBoundingBox, GeoPoint, TileCoordinate, TileIndexSet};
pub use error::TerrainError;
pub use fetch::FetchOrchestrator;
pub use height::HeightGrid;
pub use mesh::{TerrainMesh, TerrainMeshBuilder};
pub use progress::{Progress, Stage};
pub use service::{Terrain, TerrainService};
pub use stitch::StitchedRaster;
pub use tile::RasterTile;
