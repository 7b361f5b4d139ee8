//! Dense voxel storage for one 16×256×16 chunk column.
//!
//! Blocks are stored one byte each, x varying fastest, then z, then y:
//! `index = x + WIDTH * (z + DEPTH * y)`. The same order is used by the
//! payload codec, so it is part of the on-disk format.

use crate::block::BlockType;

/// Chunk extent along X in voxels.
pub const CHUNK_WIDTH: usize = 16;

/// Chunk extent along Y (vertical) in voxels.
pub const CHUNK_HEIGHT: usize = 256;

/// Chunk extent along Z in voxels.
pub const CHUNK_DEPTH: usize = 16;

/// Total number of voxels in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_DEPTH;

/// Precondition failures for voxel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VoxelError {
    /// A coordinate lies outside `[0,WIDTH)×[0,HEIGHT)×[0,DEPTH)`.
    #[error("voxel coordinate ({x}, {y}, {z}) out of range")]
    OutOfRange {
        /// Requested X.
        x: i32,
        /// Requested Y.
        y: i32,
        /// Requested Z.
        z: i32,
    },
}

/// Fixed-size block grid owned by a single chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    blocks: Vec<BlockType>,
}

impl VoxelGrid {
    /// Creates a grid filled entirely with air.
    pub fn new() -> Self {
        Self::filled(BlockType::Air)
    }

    /// Creates a grid filled entirely with `block`.
    pub fn filled(block: BlockType) -> Self {
        Self {
            blocks: vec![block; CHUNK_VOLUME],
        }
    }

    /// Returns the block at `(x, y, z)`.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<BlockType, VoxelError> {
        let index = Self::linear_index(x, y, z)?;
        Ok(self.blocks[index])
    }

    /// Sets the block at `(x, y, z)`.
    ///
    /// Out-of-range coordinates fail without touching the grid.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> Result<(), VoxelError> {
        let index = Self::linear_index(x, y, z)?;
        self.blocks[index] = block;
        Ok(())
    }

    /// Overwrites every voxel with `block`.
    pub fn fill(&mut self, block: BlockType) {
        self.blocks.fill(block);
    }

    /// Fills the vertical span `[y_start, y_end)` of column `(x, z)`.
    ///
    /// The span is clipped to the grid height; `x` and `z` must be in range.
    pub fn fill_column(
        &mut self,
        x: i32,
        z: i32,
        y_start: i32,
        y_end: i32,
        block: BlockType,
    ) -> Result<(), VoxelError> {
        Self::linear_index(x, 0, z)?;
        let lo = y_start.max(0);
        let hi = y_end.min(CHUNK_HEIGHT as i32);
        for y in lo..hi {
            self.set(x, y, z, block)?;
        }
        Ok(())
    }

    /// Fills every voxel in the horizontal layers `[y_start, y_end)`, clipped
    /// to the grid height.
    pub fn fill_layers(&mut self, y_start: i32, y_end: i32, block: BlockType) {
        let layer = CHUNK_WIDTH * CHUNK_DEPTH;
        let lo = y_start.clamp(0, CHUNK_HEIGHT as i32) as usize;
        let hi = y_end.clamp(0, CHUNK_HEIGHT as i32) as usize;
        if lo < hi {
            self.blocks[lo * layer..hi * layer].fill(block);
        }
    }

    /// All blocks in storage order.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// Number of voxels that are not air.
    pub fn non_air_count(&self) -> usize {
        self.blocks.iter().filter(|&&b| b != BlockType::Air).count()
    }

    /// Builds a grid from blocks already in storage order.
    ///
    /// The caller guarantees `blocks.len() == CHUNK_VOLUME`.
    pub(crate) fn from_blocks(blocks: Vec<BlockType>) -> Self {
        debug_assert_eq!(blocks.len(), CHUNK_VOLUME);
        Self { blocks }
    }

    /// Whether `(x, y, z)` lies inside the grid.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH as i32).contains(&x)
            && (0..CHUNK_HEIGHT as i32).contains(&y)
            && (0..CHUNK_DEPTH as i32).contains(&z)
    }

    fn linear_index(x: i32, y: i32, z: i32) -> Result<usize, VoxelError> {
        if !Self::in_bounds(x, y, z) {
            return Err(VoxelError::OutOfRange { x, y, z });
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        Ok(x + CHUNK_WIDTH * (z + CHUNK_DEPTH * y))
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}
