//! `terramesh terrain` - fetch elevation, build the mesh, write an OBJ.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::info;

use terramesh::coord::GeoBoundingBox;
use terramesh::mesh::{SectionKind, TerrainMesh};
use terramesh::provider::AsyncHttpClient;
use terramesh::TerrainService;

use super::{stage_progress_bar, CliError};

pub async fn run<C: AsyncHttpClient + Clone>(
    service: &TerrainService<C>,
    bbox: &GeoBoundingBox,
    out: &Path,
    cancellation: &CancellationToken,
) -> Result<(), CliError> {
    let (bar, progress) = stage_progress_bar();

    let terrain = service.fetch_terrain(bbox, cancellation, progress).await?;
    bar.finish_and_clear();

    write_obj(out, &terrain.mesh)?;

    let snapshot = service.metrics().snapshot();
    info!(
        zoom = terrain.zoom,
        vertices = terrain.mesh.vertex_count(),
        triangles = terrain.mesh.triangle_count(),
        tiles = snapshot.tiles_fetched,
        retries = snapshot.retries,
        path = %out.display(),
        "terrain mesh written"
    );
    Ok(())
}

fn section_name(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::WallSouth => "wall_south",
        SectionKind::WallEast => "wall_east",
        SectionKind::WallNorth => "wall_north",
        SectionKind::WallWest => "wall_west",
        SectionKind::Top => "top",
        SectionKind::Bottom => "bottom",
    }
}

/// Write the mesh as a Wavefront OBJ, one group per section so material
/// assignment by section survives the export.
fn write_obj(path: &Path, mesh: &TerrainMesh) -> Result<(), CliError> {
    let file = File::create(path)
        .map_err(|e| CliError::new(format!("failed to create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "o terrain")?;
    for p in mesh.positions() {
        writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for uv in mesh.uvs() {
        writeln!(writer, "vt {} {}", uv[0], uv[1])?;
    }
    for n in mesh.normals() {
        writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
    }

    for section in mesh.sections() {
        writeln!(writer, "g {}", section_name(section.kind))?;
        for [a, b, c] in &section.triangles {
            // OBJ indices are 1-based.
            let (a, b, c) = (a + 1, b + 1, c + 1);
            writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
    }

    writer.flush()?;
    Ok(())
}
