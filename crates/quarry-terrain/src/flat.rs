//! Flat layered terrain: stone, a few layers of dirt, and a grass cap.

use quarry_voxel::{BlockType, CHUNK_HEIGHT, ChunkCoord, VoxelGrid};

use crate::TerrainGenerator;

/// Dirt layers between the stone and the grass cap.
const DIRT_DEPTH: usize = 4;

/// Every column filled to the same surface height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatTerrain {
    surface_height: usize,
}

impl FlatTerrain {
    /// Creates a generator whose columns hold `surface_height` blocks,
    /// clamped to the chunk height.
    pub fn new(surface_height: usize) -> Self {
        Self {
            surface_height: surface_height.min(CHUNK_HEIGHT),
        }
    }

    /// Number of solid blocks in each column.
    pub fn surface_height(&self) -> usize {
        self.surface_height
    }
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TerrainGenerator for FlatTerrain {
    fn populate(&self, _coord: ChunkCoord) -> VoxelGrid {
        let top = self.surface_height as i32;
        let dirt_start = (top - 1 - DIRT_DEPTH as i32).max(0);

        let mut grid = VoxelGrid::new();
        grid.fill_layers(0, dirt_start, BlockType::Stone);
        grid.fill_layers(dirt_start, top - 1, BlockType::Dirt);
        grid.fill_layers(top - 1, top, BlockType::Grass);
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_voxel::{CHUNK_DEPTH, CHUNK_WIDTH};

    fn column(grid: &VoxelGrid, x: i32, z: i32) -> Vec<BlockType> {
        (0..CHUNK_HEIGHT as i32)
            .map(|y| grid.get(x, y, z).unwrap())
            .collect()
    }

    #[test]
    fn test_layers_from_bottom_to_top() {
        let grid = FlatTerrain::new(10).populate(ChunkCoord::new(0, 0));
        let col = column(&grid, 3, 7);

        assert!(col[..5].iter().all(|&b| b == BlockType::Stone));
        assert!(col[5..9].iter().all(|&b| b == BlockType::Dirt));
        assert_eq!(col[9], BlockType::Grass);
        assert!(col[10..].iter().all(|&b| b == BlockType::Air));
    }

    #[test]
    fn test_every_column_is_identical() {
        let grid = FlatTerrain::default().populate(ChunkCoord::new(-4, 9));
        let reference = column(&grid, 0, 0);
        for z in 0..CHUNK_DEPTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                assert_eq!(column(&grid, x, z), reference, "column ({x}, {z}) differs");
            }
        }
        assert_eq!(grid.non_air_count(), 64 * CHUNK_WIDTH * CHUNK_DEPTH);
    }

    #[test]
    fn test_population_ignores_coordinate() {
        let terrain = FlatTerrain::new(30);
        assert_eq!(
            terrain.populate(ChunkCoord::new(0, 0)),
            terrain.populate(ChunkCoord::new(-100, 57))
        );
    }

    #[test]
    fn test_shallow_surface_has_no_stone() {
        let grid = FlatTerrain::new(3).populate(ChunkCoord::new(0, 0));
        assert_eq!(
            &column(&grid, 0, 0)[..4],
            &[BlockType::Dirt, BlockType::Dirt, BlockType::Grass, BlockType::Air]
        );
    }

    #[test]
    fn test_surface_height_is_clamped() {
        let terrain = FlatTerrain::new(1000);
        assert_eq!(terrain.surface_height(), CHUNK_HEIGHT);
        let grid = terrain.populate(ChunkCoord::new(1, 1));
        assert_eq!(grid.get(0, CHUNK_HEIGHT as i32 - 1, 0).unwrap(), BlockType::Grass);
    }

    #[test]
    fn test_zero_height_is_empty() {
        let grid = FlatTerrain::new(0).populate(ChunkCoord::new(0, 0));
        assert_eq!(grid.non_air_count(), 0);
    }
}
