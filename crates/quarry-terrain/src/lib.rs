//! Terrain population for chunks that have never been saved.

mod flat;

pub use flat::FlatTerrain;

use quarry_voxel::{ChunkCoord, VoxelGrid};

/// Produces the initial voxel content of a chunk absent from storage.
///
/// Implementations must be a pure function of the coordinate (and whatever
/// parameters they were built with): the streaming worker calls `populate`
/// off the main thread, and may do so again after a corrupt payload.
pub trait TerrainGenerator: Send + Sync {
    /// Fills a fresh grid for the chunk at `coord`.
    fn populate(&self, coord: ChunkCoord) -> VoxelGrid;
}
