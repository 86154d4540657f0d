//! Pipeline telemetry for observability and user feedback.
//!
//! Lock-free atomic counters instrumenting the fetch and mesh pipeline,
//! copied out as a point-in-time snapshot for display.
//!
//! # Architecture
//!
//! ```text
//! Pipeline Stages ─────► PipelineMetrics ─────► TelemetrySnapshot ─────► Views
//!                        (atomic counters)     (point-in-time copy)      (CLI, etc.)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free metrics recorded by the terrain pipeline.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    tiles_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    retries: AtomicU64,
    rasters_stitched: AtomicU64,
    meshes_built: AtomicU64,
    vertices_emitted: AtomicU64,
}

impl PipelineMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record successfully fetched tiles.
    pub fn tiles_fetched(&self, count: u64) {
        self.tiles_fetched.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a failed fetch operation.
    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a zoom-degradation retry.
    pub fn retried(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed stitch.
    pub fn raster_stitched(&self) {
        self.rasters_stitched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed mesh build and its vertex count.
    pub fn mesh_built(&self, vertices: u64) {
        self.meshes_built.fetch_add(1, Ordering::Relaxed);
        self.vertices_emitted.fetch_add(vertices, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            rasters_stitched: self.rasters_stitched.load(Ordering::Relaxed),
            meshes_built: self.meshes_built.load(Ordering::Relaxed),
            vertices_emitted: self.vertices_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub tiles_fetched: u64,
    pub fetch_failures: u64,
    pub retries: u64,
    pub rasters_stitched: u64,
    pub meshes_built: u64,
    pub vertices_emitted: u64,
}
