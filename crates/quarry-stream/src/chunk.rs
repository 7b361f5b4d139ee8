//! A chunk as held by the streamer: voxels plus optional CPU-side geometry.

use quarry_mesh::{ChunkGeometry, build_geometry};
use quarry_voxel::{BlockType, ChunkCoord, VoxelError, VoxelGrid};

/// One chunk of the world.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    grid: VoxelGrid,
    geometry: Option<ChunkGeometry>,
}

impl Chunk {
    /// Creates a chunk with no geometry.
    pub fn new(coord: ChunkCoord, grid: VoxelGrid) -> Self {
        Self {
            coord,
            grid,
            geometry: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Reads one block in chunk-local coordinates.
    pub fn block(&self, x: i32, y: i32, z: i32) -> Result<BlockType, VoxelError> {
        self.grid.get(x, y, z)
    }

    /// Writes one block in chunk-local coordinates.
    ///
    /// Any built geometry is dropped since it no longer matches the voxels.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> Result<(), VoxelError> {
        self.grid.set(x, y, z, block)?;
        self.geometry = None;
        Ok(())
    }

    /// Whether geometry has been built.
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<&ChunkGeometry> {
        self.geometry.as_ref()
    }

    /// Rebuilds the geometry from the current voxels.
    pub fn build_geometry(&mut self) -> &ChunkGeometry {
        self.geometry.insert(build_geometry(&self.grid))
    }

    /// Returns the geometry, building it first if needed.
    pub fn ensure_geometry(&mut self) -> &ChunkGeometry {
        self.geometry.get_or_insert_with(|| build_geometry(&self.grid))
    }

    /// Drops the CPU-side geometry.
    pub fn clear_geometry(&mut self) {
        self.geometry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chunk_has_no_geometry() {
        let chunk = Chunk::new(ChunkCoord::new(2, -3), VoxelGrid::new());
        assert!(!chunk.has_geometry());
        assert_eq!(chunk.coord(), ChunkCoord::new(2, -3));
    }

    #[test]
    fn test_build_and_clear_geometry() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), VoxelGrid::new());
        chunk.set_block(1, 1, 1, BlockType::Stone).unwrap();

        assert_eq!(chunk.build_geometry().face_count(), 6);
        assert!(chunk.has_geometry());
        chunk.clear_geometry();
        assert!(chunk.geometry().is_none());
    }

    #[test]
    fn test_set_block_invalidates_geometry() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), VoxelGrid::new());
        chunk.ensure_geometry();
        assert!(chunk.has_geometry());

        chunk.set_block(0, 0, 0, BlockType::Wood).unwrap();
        assert!(!chunk.has_geometry());
        assert_eq!(chunk.ensure_geometry().face_count(), 6);
        assert_eq!(chunk.block(0, 0, 0).unwrap(), BlockType::Wood);
    }

    #[test]
    fn test_set_block_out_of_range_keeps_geometry() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), VoxelGrid::new());
        chunk.ensure_geometry();
        assert!(chunk.set_block(0, 256, 0, BlockType::Stone).is_err());
        assert!(chunk.has_geometry());
    }
}
