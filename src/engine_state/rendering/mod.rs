//! # Rendering Hand-off
//!
//! The renderer and the physics engine live outside this crate. Chunks hand
//! their finished meshes to a [`MeshSink`], which is expected to upload them
//! to whatever render and collision resources it manages.
//!
//! The same buffers serve both purposes: a chunk submits its mesh once as a
//! render mesh and once as a collision surface after every rebuild.

use std::collections::HashMap;

use cgmath::Point3;
use log::trace;

use crate::engine_state::voxels::chunk::ChunkCoord;

pub mod meshing;

use meshing::{ChunkMesh, IndexFormat};

/// Consumer of finished chunk meshes.
pub trait MeshSink {
    /// Receives the render mesh of a chunk placed at `origin` in world space.
    fn submit_render_mesh(&mut self, coord: ChunkCoord, origin: Point3<f32>, mesh: &ChunkMesh);

    /// Receives the collision surface of a chunk, built from the same buffers.
    fn submit_collision_mesh(&mut self, coord: ChunkCoord, origin: Point3<f32>, mesh: &ChunkMesh);

    /// The chunk at `coord` left the active set; its resources can be released.
    fn retire(&mut self, coord: ChunkCoord);
}

/// A sink that discards every mesh.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMeshSink;

impl MeshSink for NullMeshSink {
    fn submit_render_mesh(&mut self, _coord: ChunkCoord, _origin: Point3<f32>, _mesh: &ChunkMesh) {}

    fn submit_collision_mesh(&mut self, _coord: ChunkCoord, _origin: Point3<f32>, _mesh: &ChunkMesh) {}

    fn retire(&mut self, _coord: ChunkCoord) {}
}

/// Sizes of the last mesh uploaded for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadedMesh {
    pub vertex_count: usize,
    pub index_count: usize,
    pub index_format: IndexFormat,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
    pub uv_bytes: usize,
}

impl UploadedMesh {
    fn from_mesh(mesh: &ChunkMesh) -> Self {
        let indices = mesh.indices();
        UploadedMesh {
            vertex_count: mesh.vertices().len(),
            index_count: indices.len(),
            index_format: indices.format(),
            vertex_bytes: mesh.vertex_bytes().len(),
            index_bytes: indices.as_bytes().len(),
            uv_bytes: mesh.uv_bytes().len(),
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.vertex_bytes + self.index_bytes + self.uv_bytes
    }
}

/// A sink that keeps track of what would have been uploaded.
///
/// Useful for headless runs and for observing the streaming system in tests.
#[derive(Debug, Default)]
pub struct MeshStatsSink {
    live: HashMap<ChunkCoord, UploadedMesh>,
    upload_counts: HashMap<ChunkCoord, usize>,
    render_uploads: usize,
    collision_uploads: usize,
    retired: usize,
}

impl MeshStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last render mesh uploaded for a chunk that has not been retired since.
    pub fn live_mesh(&self, coord: ChunkCoord) -> Option<&UploadedMesh> {
        self.live.get(&coord)
    }

    /// Number of chunks with a live mesh.
    pub fn live_chunks(&self) -> usize {
        self.live.len()
    }

    /// Number of render uploads made for a chunk since it last became live.
    ///
    /// Retiring a chunk forgets its count.
    pub fn uploads_for(&self, coord: ChunkCoord) -> usize {
        self.upload_counts.get(&coord).copied().unwrap_or(0)
    }

    pub fn render_uploads(&self) -> usize {
        self.render_uploads
    }

    pub fn collision_uploads(&self) -> usize {
        self.collision_uploads
    }

    pub fn retired(&self) -> usize {
        self.retired
    }

    /// Bytes held by all live meshes.
    pub fn total_used_bytes(&self) -> usize {
        self.live.values().map(UploadedMesh::total_bytes).sum()
    }
}

impl MeshSink for MeshStatsSink {
    fn submit_render_mesh(&mut self, coord: ChunkCoord, origin: Point3<f32>, mesh: &ChunkMesh) {
        let uploaded = UploadedMesh::from_mesh(mesh);
        trace!(
            "Render mesh for {:?} at {:?}: {} vertices, {:?} indices",
            coord,
            origin,
            uploaded.vertex_count,
            uploaded.index_format
        );

        self.live.insert(coord, uploaded);
        *self.upload_counts.entry(coord).or_insert(0) += 1;
        self.render_uploads += 1;
    }

    fn submit_collision_mesh(&mut self, _coord: ChunkCoord, _origin: Point3<f32>, _mesh: &ChunkMesh) {
        self.collision_uploads += 1;
    }

    fn retire(&mut self, coord: ChunkCoord) {
        self.upload_counts.remove(&coord);
        if self.live.remove(&coord).is_some() {
            self.retired += 1;
        }
    }
}
