//! Face-culled mesh generation for voxel chunks.
//!
//! Every solid cell contributes one quad per side whose neighbour is empty or
//! outside the chunk. Chunk edges are never stitched against neighbouring
//! chunks, so a solid cell on the boundary always shows its boundary face.
//!
//! # Architecture
//! - [`ChunkMesh`]: reusable vertex, UV and index buffers for one chunk
//! - `face`: per-side corner templates and face index generation

mod face;
mod mesh;

pub use face::{face_vertices, generate_face_indices, INDICES_PER_FACE, VERTICES_PER_FACE};
pub use mesh::*;
