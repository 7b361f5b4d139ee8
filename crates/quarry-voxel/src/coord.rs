//! Chunk and region grid coordinates.

use crate::grid::{CHUNK_DEPTH, CHUNK_WIDTH};

/// Side length of a region in chunks. Each region file holds `REGION_SIZE²` slots.
pub const REGION_SIZE: i32 = 32;

/// Identifies a chunk column in the world's chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the chunk containing the world-space block position `(world_x, world_z)`.
    pub fn containing(world_x: f32, world_z: f32) -> Self {
        Self {
            x: (world_x / CHUNK_WIDTH as f32).floor() as i32,
            z: (world_z / CHUNK_DEPTH as f32).floor() as i32,
        }
    }

    /// Returns the region this chunk belongs to (floored division).
    pub fn region(self) -> RegionCoord {
        RegionCoord {
            x: self.x.div_euclid(REGION_SIZE),
            z: self.z.div_euclid(REGION_SIZE),
        }
    }

    /// Position of this chunk inside its region, each component in `[0, REGION_SIZE)`.
    pub fn local(self) -> (usize, usize) {
        (
            self.x.rem_euclid(REGION_SIZE) as usize,
            self.z.rem_euclid(REGION_SIZE) as usize,
        )
    }

    /// Index of this chunk's entry in its region's location and timestamp tables.
    pub fn slot(self) -> usize {
        let (lx, lz) = self.local();
        lx + lz * REGION_SIZE as usize
    }

    /// Chebyshev (square) distance to `other`, in chunks.
    pub fn square_distance(self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }
}

/// Identifies a region file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    /// Region-grid X coordinate.
    pub x: i32,
    /// Region-grid Z coordinate.
    pub z: i32,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_chunks_floor_into_regions() {
        assert_eq!(ChunkCoord::new(0, 0).region(), RegionCoord::new(0, 0));
        assert_eq!(ChunkCoord::new(31, 31).region(), RegionCoord::new(0, 0));
        assert_eq!(ChunkCoord::new(32, 0).region(), RegionCoord::new(1, 0));
        assert_eq!(ChunkCoord::new(-1, -1).region(), RegionCoord::new(-1, -1));
        assert_eq!(ChunkCoord::new(-32, -33).region(), RegionCoord::new(-1, -2));
    }

    #[test]
    fn test_local_wraps_negative_coordinates() {
        assert_eq!(ChunkCoord::new(-1, -32).local(), (31, 0));
        assert_eq!(ChunkCoord::new(33, -33).local(), (1, 31));
        assert_eq!(ChunkCoord::new(-1, 0).slot(), 31);
        assert_eq!(ChunkCoord::new(0, -1).slot(), 31 * 32);
    }

    #[test]
    fn test_every_slot_in_a_region_is_distinct() {
        let mut seen = vec![false; (REGION_SIZE * REGION_SIZE) as usize];
        for x in -32..0 {
            for z in 64..96 {
                let slot = ChunkCoord::new(x, z).slot();
                assert!(!seen[slot], "slot {slot} reused");
                seen[slot] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_containing_floors_world_position() {
        assert_eq!(ChunkCoord::containing(0.0, 15.9), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(16.0, -0.1), ChunkCoord::new(1, -1));
        assert_eq!(ChunkCoord::containing(-16.0, -16.5), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_square_distance() {
        let c = ChunkCoord::new(0, 0);
        assert_eq!(c.square_distance(ChunkCoord::new(3, -2)), 3);
        assert_eq!(c.square_distance(ChunkCoord::new(-1, 5)), 5);
        assert_eq!(c.square_distance(c), 0);
    }
}
