//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block and the
//! neighbour each face looks at during face culling.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-side
/// tables. The order is: [LEFT, RIGHT, FRONT, BACK, TOP, BOTTOM], which is
/// also the order faces are emitted for a cell.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The left face (facing negative X)
    Left = 0,

    /// The right face (facing positive X)
    Right = 1,

    /// The front face (facing negative Z)
    Front = 2,

    /// The back face (facing positive Z)
    Back = 3,

    /// The top face (facing positive Y)
    Top = 4,

    /// The bottom face (facing negative Y)
    Bottom = 5,
}

/// Which of a block's three UV quads textures a given side.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FaceTexture {
    Top,
    Side,
    Bottom,
}

impl BlockSide {
    /// Returns an array containing all six block faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Left,
            BlockSide::Right,
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Top,
            BlockSide::Bottom,
        ]
    }

    /// Offset from a cell to the neighbour this face is shared with.
    pub fn neighbour_offset(self) -> Vector3<i32> {
        match self {
            BlockSide::Left => Vector3::new(-1, 0, 0),
            BlockSide::Right => Vector3::new(1, 0, 0),
            BlockSide::Front => Vector3::new(0, 0, -1),
            BlockSide::Back => Vector3::new(0, 0, 1),
            BlockSide::Top => Vector3::new(0, 1, 0),
            BlockSide::Bottom => Vector3::new(0, -1, 0),
        }
    }

    /// The UV quad used for this face: top for +Y, bottom for -Y, side otherwise.
    pub fn texture(self) -> FaceTexture {
        match self {
            BlockSide::Top => FaceTexture::Top,
            BlockSide::Bottom => FaceTexture::Bottom,
            _ => FaceTexture::Side,
        }
    }
}
