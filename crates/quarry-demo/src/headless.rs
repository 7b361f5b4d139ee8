//! A renderer that keeps no GPU state, only counters.

use quarry_mesh::ChunkGeometry;
use quarry_stream::ChunkRenderer;
use quarry_voxel::ChunkCoord;
use tracing::trace;

/// Stand-in for an uploaded mesh.
#[derive(Debug, PartialEq, Eq)]
pub struct MeshHandle {
    id: u64,
    triangles: usize,
}

/// Tracks what a real renderer would hold resident.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    pub uploads: u64,
    pub releases: u64,
    pub draw_calls: u64,
    /// Triangles currently uploaded.
    pub resident_triangles: usize,
    pub peak_triangles: usize,
}

impl HeadlessRenderer {
    /// Meshes uploaded and not yet released.
    pub fn resident_meshes(&self) -> u64 {
        self.uploads - self.releases
    }
}

impl ChunkRenderer for HeadlessRenderer {
    type Handle = MeshHandle;

    fn upload(&mut self, _coord: ChunkCoord, geometry: &ChunkGeometry) -> MeshHandle {
        self.next_id += 1;
        self.uploads += 1;
        let triangles = geometry.triangle_count();
        self.resident_triangles += triangles;
        self.peak_triangles = self.peak_triangles.max(self.resident_triangles);
        MeshHandle {
            id: self.next_id,
            triangles,
        }
    }

    fn release(&mut self, handle: MeshHandle) {
        self.releases += 1;
        self.resident_triangles -= handle.triangles;
    }

    fn draw(&mut self, handle: &MeshHandle) {
        if handle.triangles > 0 {
            self.draw_calls += 1;
            trace!(mesh = handle.id, triangles = handle.triangles, "Draw");
        }
    }
}
