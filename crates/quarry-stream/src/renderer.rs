//! Boundary to the display side of the engine.

use quarry_mesh::ChunkGeometry;
use quarry_voxel::ChunkCoord;

/// Owns GPU-resident chunk meshes.
///
/// Implementations are only ever called from the thread that drives the
/// [`ChunkStreamer`](crate::ChunkStreamer), so they need not be `Send`.
pub trait ChunkRenderer {
    /// Opaque handle to an uploaded mesh.
    type Handle;

    /// Uploads the geometry of the chunk at `coord`.
    fn upload(&mut self, coord: ChunkCoord, geometry: &ChunkGeometry) -> Self::Handle;

    /// Frees a mesh previously returned by [`upload`](Self::upload).
    fn release(&mut self, handle: Self::Handle);

    /// Draws an uploaded mesh.
    fn draw(&mut self, handle: &Self::Handle);
}
