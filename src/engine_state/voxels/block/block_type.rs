//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides conversion between the enum and its compact integer form used
//! by the save format.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `None` is the reserved empty cell. Every other variant is a solid, textured
/// material whose UVs, activation height and health come from the
/// [`BlockCatalog`](super::catalog::BlockCatalog).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize,
    Deserialize,
)]
pub enum BlockType {
    /// An empty cell. Never rendered, never collides.
    #[default]
    None = 0,

    /// Grass-topped soil, the usual surface material.
    Grass = 1,

    /// Plain dirt.
    Dirt = 2,

    /// Ice, used for the highest terrain band.
    Ice = 3,

    /// Stone, used for the lowest terrain band.
    Stone = 4,
}

impl BlockType {
    /// Every solid block type, in declaration order.
    pub const SOLID: [BlockType; 4] = [
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Ice,
        BlockType::Stone,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// Returns `None` when the value does not name a known block type, which
    /// only happens for corrupt save data.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        <Self as FromPrimitive>::from_u8(btype)
    }

    /// The compact integer representation of this type.
    pub fn to_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this type occupies its cell.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_conversion_rejects_unknown_values() {
        for block_type in BlockType::SOLID {
            assert_eq!(BlockType::from_int(block_type.to_int()), Some(block_type));
        }
        assert_eq!(BlockType::from_int(0), Some(BlockType::None));
        assert_eq!(BlockType::from_int(200), None);
    }

    #[test]
    fn only_none_is_empty() {
        assert!(!BlockType::None.is_solid());
        assert!(BlockType::SOLID.iter().all(|t| t.is_solid()));
    }
}
