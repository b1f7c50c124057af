use crate::engine_state::voxels::block::block_side::BlockSide;

/// Number of vertices emitted for one visible face.
pub const VERTICES_PER_FACE: usize = 4;
/// Number of indices (two triangles) emitted for one visible face.
pub const INDICES_PER_FACE: usize = 6;

// Corner offsets of each face relative to the cell's minimum corner. The
// winding of every face is fixed; UV quads are applied in the same corner order.
const LEFT_VERTICES: [[f32; 3]; 4] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
];

const RIGHT_VERTICES: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
];

const FRONT_VERTICES: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

const BACK_VERTICES: [[f32; 3]; 4] = [
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
];

const TOP_VERTICES: [[f32; 3]; 4] = [
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
];

const BOTTOM_VERTICES: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0],
];

/// Corner offsets of a face, in winding order.
pub fn face_vertices(side: BlockSide) -> &'static [[f32; 3]; 4] {
    match side {
        BlockSide::Left => &LEFT_VERTICES,
        BlockSide::Right => &RIGHT_VERTICES,
        BlockSide::Front => &FRONT_VERTICES,
        BlockSide::Back => &BACK_VERTICES,
        BlockSide::Top => &TOP_VERTICES,
        BlockSide::Bottom => &BOTTOM_VERTICES,
    }
}

/// Generates index data for a face, adjusted by the number of previously generated faces.
///
/// # Arguments
/// * `num_faces_generated` - The number of faces that have been generated so far
///
/// # Returns
/// Two triangles `(0, 1, 2)` and `(0, 2, 3)` over the face's four vertices.
pub fn generate_face_indices(num_faces_generated: u32) -> [u32; INDICES_PER_FACE] {
    let base = num_faces_generated * VERTICES_PER_FACE as u32;
    [base, base + 1, base + 2, base, base + 2, base + 3]
}
