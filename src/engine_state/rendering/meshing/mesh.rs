//! Mesh buffers for a single chunk.
//!
//! A [`ChunkMesh`] holds the vertex, UV and index buffers of a chunk's visible
//! faces. The buffers live as long as the chunk object that owns them and are
//! cleared, not reallocated, on every rebuild.
//!
//! Indices are staged as `u32` while faces are pushed. [`ChunkMesh::finish`]
//! then picks the index width for the finished mesh: 16-bit indices while the
//! vertex count fits, 32-bit otherwise.

use bytemuck::cast_slice;
use cgmath::Point3;

use super::face::{face_vertices, generate_face_indices, VERTICES_PER_FACE};
use crate::engine_state::voxels::block::{block_side::BlockSide, catalog::UvQuad};

/// Largest vertex count that can still be addressed with 16-bit indices.
pub const NARROW_INDEX_LIMIT: usize = u16::MAX as usize;

/// Width of the index buffer handed to the sink.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum IndexFormat {
    #[default]
    U16,
    U32,
}

impl IndexFormat {
    /// The narrowest format able to address `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > NARROW_INDEX_LIMIT {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }
}

/// Borrowed view of a finished index buffer in its chosen width.
#[derive(Copy, Clone, Debug)]
pub enum Indices<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl<'a> Indices<'a> {
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Indices::U16(indices) => cast_slice(indices),
            Indices::U32(indices) => cast_slice(indices),
        }
    }

    /// Iterates the indices widened to `u32`, whatever the stored width.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + 'a> {
        match *self {
            Indices::U16(indices) => Box::new(indices.iter().map(|&i| i as u32)),
            Indices::U32(indices) => Box::new(indices.iter().copied()),
        }
    }
}

/// Vertex, UV and index buffers for the visible faces of one chunk.
///
/// Vertex positions are local to the chunk's origin.
#[derive(Debug, Default)]
pub struct ChunkMesh {
    vertices: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    wide_indices: Vec<u32>,
    narrow_indices: Vec<u16>,
    index_format: IndexFormat,
}

impl ChunkMesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every buffer while keeping its allocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.uvs.clear();
        self.wide_indices.clear();
        self.narrow_indices.clear();
        self.index_format = IndexFormat::U16;
    }

    /// Appends one face of the cell whose minimum corner is `cell`.
    pub fn push_face(&mut self, cell: Point3<f32>, side: BlockSide, uvs: &UvQuad) {
        let faces_so_far = (self.vertices.len() / VERTICES_PER_FACE) as u32;

        for corner in face_vertices(side) {
            self.vertices
                .push([cell.x + corner[0], cell.y + corner[1], cell.z + corner[2]]);
        }
        self.uvs.extend_from_slice(uvs);
        self.wide_indices
            .extend_from_slice(&generate_face_indices(faces_so_far));
    }

    /// Settles the index width for the faces pushed since the last [`clear`](Self::clear).
    pub fn finish(&mut self) {
        self.index_format = IndexFormat::for_vertex_count(self.vertices.len());

        if self.index_format == IndexFormat::U16 {
            self.narrow_indices.clear();
            self.narrow_indices
                .extend(self.wide_indices.iter().map(|&i| i as u16));
            self.wide_indices.clear();
        } else {
            self.narrow_indices.clear();
        }
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// The index buffer in the width chosen by the last [`finish`](Self::finish).
    pub fn indices(&self) -> Indices<'_> {
        match self.index_format {
            IndexFormat::U16 => Indices::U16(&self.narrow_indices),
            IndexFormat::U32 => Indices::U32(&self.wide_indices),
        }
    }

    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        cast_slice(&self.vertices)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        cast_slice(&self.uvs)
    }

    /// Resolves the index buffer into triangles of vertex positions.
    pub fn triangles(&self) -> Vec<[[f32; 3]; 3]> {
        let indices: Vec<u32> = self.indices().iter().collect();
        indices
            .chunks_exact(3)
            .map(|tri| {
                [
                    self.vertices[tri[0] as usize],
                    self.vertices[tri[1] as usize],
                    self.vertices[tri[2] as usize],
                ]
            })
            .collect()
    }
}
