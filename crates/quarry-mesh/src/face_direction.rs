//! The six cardinal directions a voxel face can point.

/// One of the six cardinal directions a voxel face can point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// −X direction.
    NegX = 0,
    /// +X direction.
    PosX = 1,
    /// −Y direction.
    NegY = 2,
    /// +Y direction.
    PosY = 3,
    /// −Z direction.
    NegZ = 4,
    /// +Z direction.
    PosZ = 5,
}

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::NegX,
        Self::PosX,
        Self::NegY,
        Self::PosY,
        Self::NegZ,
        Self::PosZ,
    ];

    /// Returns the unit normal as `[f32; 3]` for this face direction.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Returns the neighbor coordinate offset for this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        match self {
            Self::PosX => (x + 1, y, z),
            Self::NegX => (x - 1, y, z),
            Self::PosY => (x, y + 1, z),
            Self::NegY => (x, y - 1, z),
            Self::PosZ => (x, y, z + 1),
            Self::NegZ => (x, y, z - 1),
        }
    }

    /// Unit-cube corners of the face, counter-clockwise when viewed from outside.
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Self::NegX => [[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]],
            Self::PosX => [[1., 0., 1.], [1., 0., 0.], [1., 1., 0.], [1., 1., 1.]],
            Self::NegY => [[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]],
            Self::PosY => [[0., 1., 1.], [1., 1., 1.], [1., 1., 0.], [0., 1., 0.]],
            Self::NegZ => [[1., 0., 0.], [0., 0., 0.], [0., 1., 0.], [1., 1., 0.]],
            Self::PosZ => [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
        }
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_lie_on_the_face_plane() {
        for dir in FaceDirection::ALL {
            let n = dir.normal();
            let axis = n.iter().position(|&c| c != 0.0).unwrap();
            let plane = if n[axis] > 0.0 { 1.0 } else { 0.0 };
            for corner in dir.corners() {
                assert_eq!(corner[axis], plane, "{dir:?} corner {corner:?}");
            }
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for dir in FaceDirection::ALL {
            let [a, b, c, _] = dir.corners();
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let n = dir.normal();
            let dot = cross[0] * n[0] + cross[1] * n[1] + cross[2] * n[2];
            assert!(dot > 0.0, "{dir:?} winds inward");
        }
    }

    #[test]
    fn test_offset_matches_normal() {
        for dir in FaceDirection::ALL {
            let (x, y, z) = dir.offset(0, 0, 0);
            let n = dir.normal();
            assert_eq!([x as f32, y as f32, z as f32], n);
        }
    }
}
