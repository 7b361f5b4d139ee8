//! Chunk geometry holding vertices and indices produced on the CPU.

use quarry_voxel::BlockType;

use crate::face_direction::FaceDirection;

/// Triangle indices for one quad, relative to its first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// A single vertex in a chunk mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    /// Position in chunk-local coordinates.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Block type for material/texture lookup by the renderer.
    pub block: BlockType,
}

/// The output of a geometry pass over one chunk.
///
/// Plain data: the renderer decides how (and on which thread) to upload it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkGeometry {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl ChunkGeometry {
    /// Creates empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the unit face of the voxel at `(x, y, z)` pointing in `direction`.
    pub fn push_face(&mut self, x: i32, y: i32, z: i32, direction: FaceDirection, block: BlockType) {
        let base = self.vertices.len() as u32;
        let normal = direction.normal();
        for corner in direction.corners() {
            self.vertices.push(MeshVertex {
                position: [
                    x as f32 + corner[0],
                    y as f32 + corner[1],
                    z as f32 + corner[2],
                ],
                normal,
                block,
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Number of faces (quads) in the geometry.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of triangles in the geometry.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_face_offsets_indices() {
        let mut geometry = ChunkGeometry::new();
        geometry.push_face(0, 0, 0, FaceDirection::PosY, BlockType::Grass);
        geometry.push_face(2, 5, 1, FaceDirection::NegZ, BlockType::Stone);

        assert_eq!(geometry.face_count(), 2);
        assert_eq!(geometry.triangle_count(), 4);
        assert_eq!(&geometry.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert!(geometry.vertices[4..].iter().all(|v| v.position[2] == 1.0));
        assert_eq!(geometry.vertices[0].block, BlockType::Grass);
    }

    #[test]
    fn test_empty_geometry() {
        let geometry = ChunkGeometry::new();
        assert!(geometry.is_empty());
        assert_eq!(geometry.face_count(), 0);
    }
}
