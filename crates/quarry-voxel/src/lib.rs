//! Voxel storage for a single chunk: block types, the dense voxel grid,
//! chunk/region coordinates, and the compressed chunk payload codec.

pub mod block;
pub mod codec;
pub mod coord;
pub mod grid;

pub use block::BlockType;
pub use codec::{CodecError, decode, encode};
pub use coord::{ChunkCoord, REGION_SIZE, RegionCoord};
pub use grid::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_VOLUME, CHUNK_WIDTH, VoxelError, VoxelGrid};
