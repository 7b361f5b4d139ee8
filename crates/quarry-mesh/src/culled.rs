//! Culled-face geometry builder.
//!
//! Emits one quad per solid voxel face whose neighbor inside the chunk is not
//! solid. Faces on the chunk boundary are always emitted, since neighboring
//! chunks may not be loaded.

use quarry_voxel::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, VoxelGrid};

use crate::face_direction::FaceDirection;
use crate::geometry::ChunkGeometry;

/// Builds the visible-face geometry for a grid.
pub fn build_geometry(grid: &VoxelGrid) -> ChunkGeometry {
    let mut geometry = ChunkGeometry::new();

    for y in 0..CHUNK_HEIGHT as i32 {
        for z in 0..CHUNK_DEPTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let Ok(block) = grid.get(x, y, z) else {
                    continue;
                };
                if !block.is_solid() {
                    continue;
                }
                for dir in FaceDirection::ALL {
                    let (nx, ny, nz) = dir.offset(x, y, z);
                    let occluded = grid.get(nx, ny, nz).is_ok_and(|n| n.is_solid());
                    if !occluded {
                        geometry.push_face(x, y, z, dir, block);
                    }
                }
            }
        }
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_voxel::BlockType;

    #[test]
    fn test_empty_grid_has_no_faces() {
        assert!(build_geometry(&VoxelGrid::new()).is_empty());
    }

    #[test]
    fn test_single_block_has_six_faces() {
        let mut grid = VoxelGrid::new();
        grid.set(4, 10, 4, BlockType::Stone).unwrap();
        let geometry = build_geometry(&grid);
        assert_eq!(geometry.face_count(), 6);
        assert_eq!(geometry.indices.len(), 36);
    }

    #[test]
    fn test_shared_face_is_culled() {
        let mut grid = VoxelGrid::new();
        grid.set(4, 10, 4, BlockType::Stone).unwrap();
        grid.set(5, 10, 4, BlockType::Dirt).unwrap();
        assert_eq!(build_geometry(&grid).face_count(), 10);
    }

    #[test]
    fn test_water_does_not_occlude_or_emit() {
        let mut grid = VoxelGrid::new();
        grid.set(4, 10, 4, BlockType::Stone).unwrap();
        grid.set(5, 10, 4, BlockType::Water).unwrap();
        assert_eq!(build_geometry(&grid).face_count(), 6);
    }

    #[test]
    fn test_full_layer_emits_top_bottom_and_border_faces() {
        let mut grid = VoxelGrid::new();
        for z in 0..16 {
            for x in 0..16 {
                grid.set(x, 0, z, BlockType::Stone).unwrap();
            }
        }
        // 256 top + 256 bottom + 4 × 16 border faces.
        assert_eq!(build_geometry(&grid).face_count(), 256 * 2 + 64);
    }
}
