//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the per-type
//! catalog, and the per-cell block data stored in chunk grids.

use block_type::BlockType;
use serde::{Deserialize, Serialize};

pub mod block_side;
pub mod block_type;
pub mod catalog;

/// The underlying integer type used to represent block types in the save format.
pub type BlockTypeSize = u8;

/// A single cell of a chunk grid.
///
/// Health only means something for solid cells: a solid cell always has
/// positive health, and a cell whose health reaches zero becomes empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockCell {
    /// The type of this cell, `BlockType::None` when empty.
    pub block_type: BlockType,
    /// Remaining health, `0.0` for empty cells.
    pub health: f32,
}

impl BlockCell {
    /// An empty cell.
    pub const EMPTY: BlockCell = BlockCell {
        block_type: BlockType::None,
        health: 0.0,
    };

    /// Creates a cell of the given type with the given health.
    ///
    /// A non-positive health, or `BlockType::None`, yields an empty cell so the
    /// health invariant holds for every constructed cell.
    pub fn new(block_type: BlockType, health: f32) -> Self {
        if !block_type.is_solid() || health <= 0.0 || health.is_nan() {
            return BlockCell::EMPTY;
        }

        BlockCell { block_type, health }
    }

    /// Whether the cell is occupied.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.block_type.is_solid()
    }

    /// Reduces health by `amount`, clamping at zero.
    ///
    /// # Returns
    /// `true` if the cell was destroyed by this call (it is now empty).
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.is_solid() {
            return false;
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            *self = BlockCell::EMPTY;
            return true;
        }

        false
    }
}
