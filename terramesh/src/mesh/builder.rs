//! Mesh construction from a height grid.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::buffers::MeshBuffers;
use super::{SectionKind, TerrainMesh, SECTION_ORDER};
use crate::error::TerrainError;
use crate::height::HeightGrid;
use crate::progress::Progress;

/// Constant "up" normal used when smoothed normals are not requested.
const UP: [f32; 3] = [0.0, 1.0, 0.0];

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        UP
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

/// Geometry parameters for one mesh build.
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Meters spanned by one grid cell along x.
    pub cell_size_x: f32,
    /// Meters spanned by one grid cell along y (mesh z axis).
    pub cell_size_y: f32,
    /// Padding below the lowest terrain point, in meters. Zero disables the
    /// skirt walls and bottom cap.
    pub wall_padding: f32,
    /// Smooth per-vertex normals from adjacent faces instead of a constant
    /// up vector.
    pub smooth_normals: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            cell_size_x: 1.0,
            cell_size_y: 1.0,
            wall_padding: 0.0,
            smooth_normals: false,
        }
    }
}

impl MeshConfig {
    /// Whether skirt walls and the bottom cap are emitted.
    pub fn walls_enabled(&self) -> bool {
        self.wall_padding > 0.0
    }
}

/// Builds a [`TerrainMesh`] from a [`HeightGrid`].
///
/// Missing height samples are skipped (logged, not fatal); the mesh is built
/// best-effort from the available samples. Cancellation is checked before
/// each section and the builder yields to the scheduler between sections so
/// large grids do not monopolize it.
pub struct TerrainMeshBuilder {
    config: MeshConfig,
}

impl TerrainMeshBuilder {
    /// Create a builder with the given geometry configuration.
    pub fn new(config: MeshConfig) -> Self {
        Self { config }
    }

    /// Build the mesh.
    ///
    /// `progress` receives one update per finished section.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Cancelled`] when the token trips between sections;
    /// [`TerrainError::EmptyGrid`] when no grid cell holds a usable sample.
    pub async fn build<F>(
        &self,
        grid: &HeightGrid,
        cancellation: &CancellationToken,
        progress: F,
    ) -> Result<TerrainMesh, TerrainError>
    where
        F: Fn(Progress),
    {
        let walls = self.config.walls_enabled();
        let total_sections = if walls { 6 } else { 1 };
        let mut done = 0usize;

        if cancellation.is_cancelled() {
            return Err(TerrainError::Cancelled);
        }
        let top = self.build_top(grid);
        if top.vertex_count() == 0 {
            return Err(TerrainError::EmptyGrid);
        }
        done += 1;
        progress(Progress::new(done, total_sections));
        tokio::task::yield_now().await;

        if !walls {
            info!(
                vertices = top.vertex_count(),
                sections = 1,
                "terrain mesh built"
            );
            return Ok(TerrainMesh::from_parts(vec![(SectionKind::Top, top)]));
        }

        let wall_height = grid.relief() + self.config.wall_padding;
        let mut parts: Vec<(SectionKind, MeshBuffers)> = Vec::with_capacity(6);

        for kind in [
            SectionKind::WallSouth,
            SectionKind::WallEast,
            SectionKind::WallNorth,
            SectionKind::WallWest,
        ] {
            if cancellation.is_cancelled() {
                return Err(TerrainError::Cancelled);
            }
            parts.push((kind, self.build_wall(grid, kind, wall_height)));
            done += 1;
            progress(Progress::new(done, total_sections));
            tokio::task::yield_now().await;
        }

        if cancellation.is_cancelled() {
            return Err(TerrainError::Cancelled);
        }
        let bottom = self.build_bottom(grid);
        done += 1;
        progress(Progress::new(done, total_sections));

        parts.push((SectionKind::Top, top));
        parts.push((SectionKind::Bottom, bottom));
        debug_assert!(parts
            .iter()
            .map(|(kind, _)| *kind)
            .eq(SECTION_ORDER.iter().copied()));

        let mesh = TerrainMesh::from_parts(parts);
        info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            sections = mesh.sections().len(),
            "terrain mesh built"
        );
        Ok(mesh)
    }

    /// Top surface: one vertex per valid grid cell, two triangles per fully
    /// valid quad.
    fn build_top(&self, grid: &HeightGrid) -> MeshBuffers {
        let (w, h) = (grid.width(), grid.height());
        let mut bufs = MeshBuffers::with_capacity(w * h);
        let mut index_map: Vec<Option<u32>> = vec![None; w * h];

        for y in 0..h {
            for x in 0..w {
                let Some(height) = grid.sample(x, y) else {
                    debug!(x, y, "skipping grid cell without height sample");
                    continue;
                };

                let position = [
                    x as f32 * self.config.cell_size_x,
                    height,
                    y as f32 * self.config.cell_size_y,
                ];
                let uv = [x as f32 / w as f32, y as f32 / h as f32];
                index_map[y * w + x] = Some(bufs.push_vertex(position, UP, uv));

                if x > 0 && y > 0 {
                    if let (Some(a), Some(b), Some(c), Some(d)) = (
                        index_map[(y - 1) * w + x - 1],
                        index_map[(y - 1) * w + x],
                        index_map[y * w + x - 1],
                        index_map[y * w + x],
                    ) {
                        bufs.push_triangle(a, c, b);
                        bufs.push_triangle(b, c, d);
                    }
                }
            }
        }

        if self.config.smooth_normals {
            smooth_normals(&mut bufs);
        }
        bufs
    }

    /// One skirt wall: paired bottom/top vertices along a grid edge,
    /// quads between consecutive valid pairs.
    fn build_wall(&self, grid: &HeightGrid, kind: SectionKind, wall_height: f32) -> MeshBuffers {
        let (w, h) = (grid.width(), grid.height());
        let (len, normal, flip) = match kind {
            SectionKind::WallSouth => (w, [0.0, 0.0, 1.0], false),
            SectionKind::WallNorth => (w, [0.0, 0.0, -1.0], true),
            SectionKind::WallEast => (h, [1.0, 0.0, 0.0], true),
            SectionKind::WallWest => (h, [-1.0, 0.0, 0.0], false),
            _ => unreachable!("not a wall section"),
        };

        let mut bufs = MeshBuffers::with_capacity(len * 2);
        let u_scale = (len.saturating_sub(1)).max(1) as f32;
        let mut prev: Option<(u32, u32)> = None;

        for i in 0..len {
            let (x, y) = match kind {
                SectionKind::WallSouth => (i, h - 1),
                SectionKind::WallNorth => (i, 0),
                SectionKind::WallEast => (w - 1, i),
                SectionKind::WallWest => (0, i),
                _ => unreachable!(),
            };

            let Some(height) = grid.sample(x, y) else {
                debug!(x, y, ?kind, "skipping wall vertex without height sample");
                prev = None;
                continue;
            };

            let px = x as f32 * self.config.cell_size_x;
            let pz = y as f32 * self.config.cell_size_y;
            let u = i as f32 / u_scale;
            let v = height / wall_height;

            let bottom = bufs.push_vertex([px, 0.0, pz], normal, [u, 0.0]);
            let top = bufs.push_vertex([px, height, pz], normal, [u, v]);

            if let Some((prev_bottom, prev_top)) = prev {
                bufs.push_quad(prev_bottom, prev_top, bottom, top, flip);
            }
            prev = Some((bottom, top));
        }

        bufs
    }

    /// Bottom cap: four corner vertices at the base plane, two triangles.
    fn build_bottom(&self, grid: &HeightGrid) -> MeshBuffers {
        let max_x = (grid.width() - 1) as f32 * self.config.cell_size_x;
        let max_z = (grid.height() - 1) as f32 * self.config.cell_size_y;
        let down = [0.0, -1.0, 0.0];

        let mut bufs = MeshBuffers::with_capacity(4);
        let a = bufs.push_vertex([0.0, 0.0, 0.0], down, [0.0, 0.0]);
        let b = bufs.push_vertex([max_x, 0.0, 0.0], down, [1.0, 0.0]);
        let c = bufs.push_vertex([0.0, 0.0, max_z], down, [0.0, 1.0]);
        let d = bufs.push_vertex([max_x, 0.0, max_z], down, [1.0, 1.0]);
        bufs.push_triangle(a, b, c);
        bufs.push_triangle(b, d, c);
        bufs
    }
}

/// Replace per-vertex normals with the normalized sum of adjacent face
/// normals.
///
/// Face contributions are accumulated across the whole triangle list before
/// any vertex is normalized; normalizing incrementally would make the result
/// depend on traversal order.
fn smooth_normals(bufs: &mut MeshBuffers) {
    let mut accumulated = vec![[0.0f32; 3]; bufs.positions.len()];

    for [a, b, c] in &bufs.indices {
        let (a, b, c) = (*a as usize, *b as usize, *c as usize);
        let face = cross(
            sub(bufs.positions[b], bufs.positions[a]),
            sub(bufs.positions[c], bufs.positions[a]),
        );
        for index in [a, b, c] {
            accumulated[index][0] += face[0];
            accumulated[index][1] += face[1];
            accumulated[index][2] += face[2];
        }
    }

    for (normal, sum) in bufs.normals.iter_mut().zip(accumulated) {
        *normal = normalize(sum);
    }
}
