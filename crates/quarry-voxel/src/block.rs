//! Block type enumeration stored in every voxel cell (1 byte).
//!
//! The discriminants are part of the on-disk payload format and must never be
//! reordered. Air is always 0 so that a zeroed grid represents empty space.

/// The kind of block occupying a single voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space.
    #[default]
    Air = 0,
    /// Grass-topped soil.
    Grass = 1,
    /// Dirt.
    Dirt = 2,
    /// Stone.
    Stone = 3,
    /// Sand.
    Sand = 4,
    /// Wood log.
    Wood = 5,
    /// Tree leaves.
    Leaves = 6,
    /// Water.
    Water = 7,
    /// Lava.
    Lava = 8,
}

impl BlockType {
    /// Every block type in discriminant order.
    pub const ALL: [BlockType; 9] = [
        Self::Air,
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Sand,
        Self::Wood,
        Self::Leaves,
        Self::Water,
        Self::Lava,
    ];

    /// Decodes a stored byte. Returns `None` for values outside `0..=8`.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Returns the stored byte for this block type.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether the block occupies its cell for meshing and collision.
    ///
    /// Air and water are the only non-solid types.
    pub fn is_solid(self) -> bool {
        !matches!(self, Self::Air | Self::Water)
    }

    /// Whether light and visibility pass through the block.
    pub fn is_transparent(self) -> bool {
        matches!(self, Self::Air | Self::Water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_are_stable() {
        let bytes: Vec<u8> = BlockType::ALL.iter().map(|b| b.to_u8()).collect();
        assert_eq!(bytes, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_from_u8_rejects_unknown_values() {
        assert_eq!(BlockType::from_u8(2), Some(BlockType::Dirt));
        assert_eq!(BlockType::from_u8(8), Some(BlockType::Lava));
        assert_eq!(BlockType::from_u8(9), None);
        assert_eq!(BlockType::from_u8(255), None);
    }

    #[test]
    fn test_air_and_water_are_not_solid() {
        assert!(!BlockType::Air.is_solid());
        assert!(!BlockType::Water.is_solid());
        assert!(BlockType::Stone.is_solid());
        assert!(BlockType::Leaves.is_solid());
        assert!(BlockType::Water.is_transparent());
        assert!(!BlockType::Lava.is_transparent());
    }
}
