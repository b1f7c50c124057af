//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a `W x H x W` column of the world
//! that owns its cells and the mesh built from them.
//!
//! Chunk objects are pooled by the [`World`](super::world::World). A pooled
//! chunk keeps its mesh buffers between uses and is reassigned a coordinate
//! and a grid when it becomes active again.
//!
//! ## Dirty tracking
//!
//! A chunk whose cells diverge from what terrain generation produces is
//! marked as changed. Only changed chunks are cached on eviction and written
//! to save files; everything else is regenerated from noise on demand.

use cgmath::{EuclideanSpace, Point3};
use log::trace;
use serde::{Deserialize, Serialize};

use super::{
    block::{block_side::BlockSide, catalog::BlockLookup, BlockCell},
    terrain::TerrainGenerator,
};
use crate::{
    engine_state::{
        config::WorldConfig,
        rendering::{meshing::ChunkMesh, MeshSink},
    },
    error::Result,
};

pub mod chunk_grid;

use chunk_grid::ChunkGrid;

/// Identity of a chunk: its position in chunk units on the XZ plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk containing a world-space position.
    pub fn from_world_position(position: Point3<f32>, chunk_width: u32) -> Self {
        let width = chunk_width as f32;
        ChunkCoord {
            x: (position.x / width).floor() as i32,
            z: (position.z / width).floor() as i32,
        }
    }

    /// The chunk containing an integer block position.
    pub fn from_block_position(position: Point3<i32>, chunk_width: u32) -> Self {
        let width = chunk_width as i32;
        ChunkCoord {
            x: position.x.div_euclid(width),
            z: position.z.div_euclid(width),
        }
    }

    /// Chebyshev distance in chunk units.
    pub fn distance(&self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// World-space block position of the chunk's minimum corner.
    ///
    /// Saturates for chunks beyond the `i32` block range; the world never
    /// streams those in.
    pub fn origin(&self, chunk_width: u32) -> Point3<i32> {
        let width = chunk_width as i32;
        Point3::new(self.x.saturating_mul(width), 0, self.z.saturating_mul(width))
    }
}

/// Result of damaging a single cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DamageOutcome {
    /// The position held no block.
    Missed,
    /// The block survived with the given health.
    Damaged { remaining: f32 },
    /// The block's health reached zero and the cell is now empty.
    Destroyed,
}

/// A chunk of the voxel world.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    chunk_width: u32,
    grid: ChunkGrid,
    changed: bool,
    mesh: ChunkMesh,
}

impl Chunk {
    /// Creates an unpopulated chunk for a world with the given configuration.
    pub fn new(config: &WorldConfig) -> Self {
        Chunk {
            coord: ChunkCoord::new(0, 0),
            chunk_width: config.chunk_width,
            grid: ChunkGrid::default(),
            changed: false,
            mesh: ChunkMesh::new(),
        }
    }

    /// Fills the chunk with freshly generated terrain for `coord`.
    pub fn generate(&mut self, coord: ChunkCoord, terrain: &TerrainGenerator) {
        self.coord = coord;
        let origin = self.origin();
        terrain.generate(&mut self.grid, origin.x, origin.z);
        self.changed = false;
    }

    /// Populates the chunk with previously modified cells for `coord`.
    ///
    /// The grid stays marked as changed so it is cached again on the next eviction.
    pub fn restore(&mut self, coord: ChunkCoord, grid: ChunkGrid) {
        self.coord = coord;
        self.grid = grid;
        self.changed = true;
    }

    /// Moves the grid out, leaving an unallocated placeholder behind.
    pub fn take_grid(&mut self) -> ChunkGrid {
        std::mem::take(&mut self.grid)
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// World-space block position of the chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        self.coord.origin(self.chunk_width)
    }

    /// Whether any cell was modified since the chunk was generated.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// The cell at a local position, `None` when out of bounds.
    pub fn cell(&self, local: Point3<i32>) -> Option<&BlockCell> {
        self.grid.get(local)
    }

    /// Replaces the cell at a local position.
    ///
    /// # Returns
    /// `false` when the position is outside the chunk and nothing changed.
    pub fn set_block(&mut self, local: Point3<i32>, cell: BlockCell) -> bool {
        match self.grid.get_mut(local) {
            Some(target) => {
                *target = cell;
                self.changed = true;
                true
            }
            None => false,
        }
    }

    /// Damages the block at a local position.
    ///
    /// Only destruction marks the chunk as changed; partial damage is not
    /// considered a divergence from the generated terrain.
    pub fn damage_block(&mut self, local: Point3<i32>, amount: f32) -> DamageOutcome {
        let Some(cell) = self.grid.get_mut(local) else {
            return DamageOutcome::Missed;
        };
        if !cell.is_solid() {
            return DamageOutcome::Missed;
        }

        if cell.apply_damage(amount) {
            self.changed = true;
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Damaged {
                remaining: cell.health,
            }
        }
    }

    /// Rebuilds the mesh from the current cells.
    ///
    /// Faces are emitted for every solid cell side whose neighbour is empty or
    /// outside the chunk.
    pub fn rebuild_mesh(&mut self, catalog: &mut impl BlockLookup) -> Result<()> {
        self.mesh.clear();

        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;

        for x in 0..width {
            for z in 0..width {
                for y in 0..height {
                    let pos = Point3::new(x, y, z);
                    let Some(cell) = self.grid.get(pos) else {
                        continue;
                    };
                    if !cell.is_solid() {
                        continue;
                    }

                    let info = match catalog.lookup(cell.block_type) {
                        Ok(info) => info,
                        Err(e) => {
                            self.mesh.clear();
                            return Err(e);
                        }
                    };
                    let cell_corner = pos.cast::<f32>().unwrap_or(Point3::origin());

                    for side in BlockSide::all() {
                        if self.grid.is_solid(pos + side.neighbour_offset()) {
                            continue;
                        }
                        self.mesh.push_face(cell_corner, side, info.uvs(side.texture()));
                    }
                }
            }
        }

        self.mesh.finish();
        trace!(
            "Rebuilt mesh for {:?}: {} faces, {:?} indices",
            self.coord,
            self.mesh.face_count(),
            self.mesh.index_format()
        );

        Ok(())
    }

    /// Hands the current mesh to a sink as both render mesh and collision surface.
    pub fn submit_mesh(&self, sink: &mut impl MeshSink) {
        let origin = self.origin().cast::<f32>().unwrap_or(Point3::origin());
        sink.submit_render_mesh(self.coord, origin, &self.mesh);
        sink.submit_collision_mesh(self.coord, origin, &self.mesh);
    }
}
