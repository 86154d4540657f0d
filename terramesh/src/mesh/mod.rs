//! Terrain mesh construction
//!
//! Converts a [`HeightGrid`](crate::height::HeightGrid) into a triangulated
//! mesh: a top surface, optional four vertical skirt walls, and an optional
//! bottom cap closing the volume.
//!
//! # Section order contract
//!
//! Rendering collaborators assign materials by section index, so the
//! emission order of sections is a hard external contract, not an internal
//! detail. With walls enabled the order is [`SECTION_ORDER`]: south wall,
//! east wall, north wall, west wall, top, bottom; the top surface is always
//! section index 4 of 6. With walls disabled only the top section is emitted
//! (index 0). Sections are emitted even when empty so indices stay stable.

mod buffers;
mod builder;

pub use buffers::MeshBuffers;
pub use builder::{MeshConfig, TerrainMeshBuilder};

/// Identity of a mesh section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    WallSouth,
    WallEast,
    WallNorth,
    WallWest,
    Top,
    Bottom,
}

/// Fixed emission order of sections when walls and bottom are present.
///
/// Material slots are assigned by position in this order; the top surface is
/// always index 4.
pub const SECTION_ORDER: [SectionKind; 6] = [
    SectionKind::WallSouth,
    SectionKind::WallEast,
    SectionKind::WallNorth,
    SectionKind::WallWest,
    SectionKind::Top,
    SectionKind::Bottom,
];

/// One mesh section: a triangle list into the shared vertex buffers.
#[derive(Debug, Clone)]
pub struct MeshSection {
    /// Which surface this section is.
    pub kind: SectionKind,
    /// Triangles as indices into the mesh-wide vertex buffers.
    pub triangles: Vec<[u32; 3]>,
}

/// A complete triangulated terrain mesh.
///
/// Vertex data is flat and shared; triangle indices are grouped by section
/// in the fixed emission order. A mesh is rebuilt wholly on each successful
/// terrain fetch and replaces the previous one atomically.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    sections: Vec<MeshSection>,
}

impl TerrainMesh {
    /// Concatenate per-section buffers, rebasing each section's local
    /// indices by the running vertex offset so indices never collide.
    pub fn from_parts(parts: Vec<(SectionKind, MeshBuffers)>) -> Self {
        let total_vertices: usize = parts.iter().map(|(_, b)| b.vertex_count()).sum();
        let mut positions = Vec::with_capacity(total_vertices);
        let mut normals = Vec::with_capacity(total_vertices);
        let mut uvs = Vec::with_capacity(total_vertices);
        let mut sections = Vec::with_capacity(parts.len());

        let mut vertex_offset = 0u32;
        for (kind, bufs) in parts {
            let triangles = bufs
                .indices
                .iter()
                .map(|[a, b, c]| [a + vertex_offset, b + vertex_offset, c + vertex_offset])
                .collect();
            vertex_offset += bufs.vertex_count() as u32;

            positions.extend(bufs.positions);
            normals.extend(bufs.normals);
            uvs.extend(bufs.uvs);
            sections.push(MeshSection { kind, triangles });
        }

        Self {
            positions,
            normals,
            uvs,
            sections,
        }
    }

    /// Vertex positions, `(x, y, z)` with heights on the y axis.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex normals, parallel to [`positions`](Self::positions).
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Per-vertex texture coordinates, parallel to
    /// [`positions`](Self::positions).
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Sections in emission order.
    pub fn sections(&self) -> &[MeshSection] {
        &self.sections
    }

    /// Look up a section by kind.
    pub fn section(&self, kind: SectionKind) -> Option<&MeshSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Total triangle count across all sections.
    pub fn triangle_count(&self) -> usize {
        self.sections.iter().map(|s| s.triangles.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_buffers(x_offset: f32) -> MeshBuffers {
        let mut bufs = MeshBuffers::default();
        let a = bufs.push_vertex([x_offset, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]);
        let b = bufs.push_vertex([x_offset + 1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]);
        let c = bufs.push_vertex([x_offset, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]);
        bufs.push_triangle(a, c, b);
        bufs
    }

    #[test]
    fn test_from_parts_rebases_indices() {
        let mesh = TerrainMesh::from_parts(vec![
            (SectionKind::Top, quad_buffers(0.0)),
            (SectionKind::Bottom, quad_buffers(10.0)),
        ]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.sections()[0].triangles, vec![[0, 2, 1]]);
        assert_eq!(mesh.sections()[1].triangles, vec![[3, 5, 4]]);
    }

    #[test]
    fn test_from_parts_keeps_empty_sections() {
        let mesh = TerrainMesh::from_parts(vec![
            (SectionKind::WallSouth, MeshBuffers::default()),
            (SectionKind::Top, quad_buffers(0.0)),
        ]);

        assert_eq!(mesh.sections().len(), 2);
        assert!(mesh.sections()[0].triangles.is_empty());
        assert_eq!(mesh.section(SectionKind::Top).unwrap().triangles.len(), 1);
    }

    #[test]
    fn test_indices_reference_valid_vertices() {
        let mesh = TerrainMesh::from_parts(vec![
            (SectionKind::Top, quad_buffers(0.0)),
            (SectionKind::Bottom, quad_buffers(5.0)),
        ]);

        let max_index = mesh
            .sections()
            .iter()
            .flat_map(|s| s.triangles.iter())
            .flatten()
            .max()
            .copied()
            .unwrap();
        assert!((max_index as usize) < mesh.vertex_count());
    }

    #[test]
    fn test_section_order_has_top_at_index_four() {
        assert_eq!(SECTION_ORDER[4], SectionKind::Top);
        assert_eq!(SECTION_ORDER[5], SectionKind::Bottom);
    }
}
