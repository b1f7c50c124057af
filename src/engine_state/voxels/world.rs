//! # World Module
//!
//! This module provides the `World` struct, the streaming manager of the
//! voxel world. It keeps every chunk within a fixed Chebyshev radius of the
//! observer active and meshed, and nothing else.
//!
//! ## Chunk states
//!
//! Every chunk coordinate is in exactly one of three states:
//! - absent: no entry, the chunk is regenerated from noise when needed
//! - cached: the chunk was modified and evicted, its grid waits in the cache
//! - active: a pooled [`Chunk`] holds the grid and its mesh
//!
//! A single map entry per coordinate holds either the cached grid or the
//! index of the active chunk, so a coordinate can never be cached and active
//! at once.
//!
//! ## Chunk pool
//!
//! Chunk objects live in an arena and are never dropped. Evicted chunks go on
//! a free list and are reused for the next coordinate that becomes active,
//! keeping their mesh buffers.

use std::collections::HashMap;

use cgmath::{EuclideanSpace, Point3};
use log::{debug, warn};

use super::{
    block::{
        block_type::BlockType,
        catalog::{BlockCatalog, BlockLookup},
        BlockCell,
    },
    chunk::{chunk_grid::ChunkGrid, Chunk, ChunkCoord, DamageOutcome},
    persistence::SaveData,
    terrain::TerrainGenerator,
};
use crate::{
    engine_state::{config::WorldConfig, rendering::MeshSink},
    error::{Result, WorldError},
};

#[derive(Debug)]
enum ChunkSlot {
    /// Cells of a modified chunk that is not currently active.
    Cached(ChunkGrid),
    /// Index of the active chunk in the arena.
    Active(usize),
}

/// Chunks that changed state during one streaming pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingPass {
    /// Coordinates that became active, in creation order.
    pub loaded: Vec<ChunkCoord>,
    /// Coordinates that left the active set, in eviction order.
    pub evicted: Vec<ChunkCoord>,
}

/// The streamed voxel world.
pub struct World<S: MeshSink> {
    config: WorldConfig,
    catalog: BlockCatalog,
    terrain: TerrainGenerator,
    /// Arena of chunk objects, active or pooled.
    chunks: Vec<Chunk>,
    /// Indices of pooled chunks ready for reuse.
    free_chunks: Vec<usize>,
    slots: HashMap<ChunkCoord, ChunkSlot>,
    /// Chunk the observer was in during the last completed pass.
    observer_chunk: Option<ChunkCoord>,
    sink: S,
}

impl<S: MeshSink> World<S> {
    /// Creates an empty world. No chunk is active until the first observer update.
    ///
    /// # Arguments
    /// * `config` - World parameters, fixed for the lifetime of the world
    /// * `catalog` - Block data used for terrain bands and mesh UVs
    /// * `sink` - Receiver of every chunk mesh the world builds
    pub fn new(config: WorldConfig, mut catalog: BlockCatalog, sink: S) -> Result<Self> {
        config.validate()?;
        let terrain = TerrainGenerator::new(&config, &mut catalog)?;

        Ok(World {
            config,
            catalog,
            terrain,
            chunks: Vec::new(),
            free_chunks: Vec::new(),
            slots: HashMap::new(),
            observer_chunk: None,
            sink,
        })
    }

    /// Recreates a world from a save, pre-seeding the cache with its modified chunks.
    ///
    /// The save determines the chunk dimensions and noise parameters; only the
    /// streaming radius is taken from `radius`.
    pub fn from_save(save: &SaveData, radius: u32, catalog: BlockCatalog, sink: S) -> Result<Self> {
        let mut world = World::new(save.world_config(radius)?, catalog, sink)?;
        for (coord, grid) in save.chunk_grids()? {
            world.slots.insert(coord, ChunkSlot::Cached(grid));
        }

        debug!(
            "Restored world with {} cached chunks",
            world.cached_chunk_count()
        );

        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Chunk the observer was in during the last streaming pass.
    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.observer_chunk
    }

    /// Streams chunks around a new observer position.
    ///
    /// Chunks are only recomputed when the observer's chunk coordinate
    /// changes; otherwise this is a no-op returning `None`. Within a pass all
    /// evictions happen before any chunk is created.
    ///
    /// Positions whose streaming square reaches past the `i32` block range, or
    /// that are not finite, are rejected without touching any chunk.
    pub fn update_observer(&mut self, position: Point3<f32>) -> Result<Option<StreamingPass>> {
        let center = self.streaming_center(position)?;
        if self.observer_chunk == Some(center) {
            return Ok(None);
        }

        let mut pass = StreamingPass::default();
        let radius = self.config.radius;

        let mut outside: Vec<ChunkCoord> = self
            .slots
            .iter()
            .filter_map(|(coord, slot)| match slot {
                ChunkSlot::Active(_) if coord.distance(center) > radius => Some(*coord),
                _ => None,
            })
            .collect();
        outside.sort();

        for coord in outside {
            self.evict(coord);
            pass.evicted.push(coord);
        }

        let radius = radius as i32;
        for x in center.x - radius..=center.x + radius {
            for z in center.z - radius..=center.z + radius {
                let coord = ChunkCoord::new(x, z);
                if matches!(self.slots.get(&coord), Some(ChunkSlot::Active(_))) {
                    continue;
                }

                self.activate(coord)?;
                pass.loaded.push(coord);
            }
        }

        self.observer_chunk = Some(center);
        debug!(
            "Observer entered chunk {:?}: {} chunks loaded, {} evicted, {} cached",
            center,
            pass.loaded.len(),
            pass.evicted.len(),
            self.cached_chunk_count()
        );

        Ok(Some(pass))
    }

    /// Places a block at a world position, replacing whatever was there.
    ///
    /// Placing `BlockType::None` clears the cell. Positions in chunks that are
    /// not active, or outside the world's height, are ignored.
    ///
    /// # Returns
    /// Whether the edit was applied.
    pub fn place_block(&mut self, position: Point3<i32>, block_type: BlockType) -> Result<bool> {
        let Some((index, local)) = self.resolve(position) else {
            debug!("Ignoring placement at unstreamed position {:?}", position);
            return Ok(false);
        };

        let cell = if block_type.is_solid() {
            BlockCell::new(block_type, self.catalog.lookup(block_type)?.health)
        } else {
            BlockCell::EMPTY
        };

        self.chunks[index].set_block(local, cell);
        self.refresh_mesh(index)?;

        Ok(true)
    }

    /// Damages the block at a world position.
    ///
    /// Non-positive or non-finite amounts, empty cells, and positions outside
    /// the active chunks are ignored and reported as [`DamageOutcome::Missed`].
    pub fn damage_block(&mut self, position: Point3<i32>, amount: f32) -> Result<DamageOutcome> {
        if !amount.is_finite() || amount <= 0.0 {
            debug!("Ignoring damage of {} at {:?}", amount, position);
            return Ok(DamageOutcome::Missed);
        }

        let Some((index, local)) = self.resolve(position) else {
            debug!("Ignoring damage at unstreamed position {:?}", position);
            return Ok(DamageOutcome::Missed);
        };

        let outcome = self.chunks[index].damage_block(local, amount);
        if outcome != DamageOutcome::Missed {
            self.refresh_mesh(index)?;
        }

        Ok(outcome)
    }

    /// The cell at a world position, if its chunk is active.
    pub fn block_at(&self, position: Point3<i32>) -> Option<BlockCell> {
        let (index, local) = self.resolve(position)?;
        self.chunks[index].cell(local).copied()
    }

    /// The active chunk at `coord`.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        match self.slots.get(&coord) {
            Some(ChunkSlot::Active(index)) => Some(&self.chunks[*index]),
            _ => None,
        }
    }

    /// The cached grid of an evicted, modified chunk.
    pub fn cached_grid(&self, coord: ChunkCoord) -> Option<&ChunkGrid> {
        match self.slots.get(&coord) {
            Some(ChunkSlot::Cached(grid)) => Some(grid),
            _ => None,
        }
    }

    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        matches!(self.slots.get(&coord), Some(ChunkSlot::Active(_)))
    }

    /// Coordinates of all active chunks, sorted.
    pub fn active_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self
            .slots
            .iter()
            .filter_map(|(coord, slot)| matches!(slot, ChunkSlot::Active(_)).then_some(*coord))
            .collect();
        coords.sort();
        coords
    }

    pub fn active_chunk_count(&self) -> usize {
        self.chunks.len() - self.free_chunks.len()
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, ChunkSlot::Cached(_)))
            .count()
    }

    /// Number of chunk objects ever constructed, active or pooled.
    pub fn allocated_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn pooled_chunk_count(&self) -> usize {
        self.free_chunks.len()
    }

    /// Snapshot of the world for saving: the configuration, the observer
    /// position, and every modified chunk whether cached or still active.
    pub fn save_data(&self, observer: Point3<f32>) -> SaveData {
        let mut modified: Vec<(ChunkCoord, &ChunkGrid)> = self
            .slots
            .iter()
            .filter_map(|(coord, slot)| match slot {
                ChunkSlot::Cached(grid) => Some((*coord, grid)),
                ChunkSlot::Active(index) => {
                    let chunk = &self.chunks[*index];
                    chunk.is_changed().then_some((*coord, chunk.grid()))
                }
            })
            .collect();
        modified.sort_by_key(|(coord, _)| *coord);

        let mut save = SaveData::new(&self.config, observer);
        for (coord, grid) in modified {
            save.push_chunk(coord, grid);
        }

        save
    }

    /// The chunk the streaming square is centred on for an observer at `position`.
    fn streaming_center(&self, position: Point3<f32>) -> Result<ChunkCoord> {
        if !position.x.is_finite() || !position.z.is_finite() {
            return Err(WorldError::ObserverOutOfRange(format!(
                "{:?} is not finite",
                position
            )));
        }

        let center = ChunkCoord::from_world_position(position, self.config.chunk_width);
        let width = i64::from(self.config.chunk_width);
        let radius = i64::from(self.config.radius);
        let in_block_range = |chunk: i32| {
            let first_block = (i64::from(chunk) - radius) * width;
            let last_block = (i64::from(chunk) + radius + 1) * width - 1;
            first_block >= i64::from(i32::MIN) && last_block <= i64::from(i32::MAX)
        };

        if !in_block_range(center.x) || !in_block_range(center.z) {
            return Err(WorldError::ObserverOutOfRange(format!(
                "{:?} streams chunks beyond the block coordinate range",
                position
            )));
        }

        Ok(center)
    }

    /// Maps a world block position to an active chunk and the local position inside it.
    fn resolve(&self, position: Point3<i32>) -> Option<(usize, Point3<i32>)> {
        if position.y < 0 || position.y >= self.config.chunk_height as i32 {
            return None;
        }

        let coord = ChunkCoord::from_block_position(position, self.config.chunk_width);
        let ChunkSlot::Active(index) = self.slots.get(&coord)? else {
            return None;
        };

        let origin = coord.origin(self.config.chunk_width);
        let local = Point3::from_vec(position - origin);
        Some((*index, local))
    }

    /// Makes `coord` active, reviving its cached grid or generating fresh terrain.
    fn activate(&mut self, coord: ChunkCoord) -> Result<()> {
        let index = match self.free_chunks.pop() {
            Some(index) => index,
            None => {
                self.chunks.push(Chunk::new(&self.config));
                self.chunks.len() - 1
            }
        };

        let chunk = &mut self.chunks[index];
        match self.slots.remove(&coord) {
            Some(ChunkSlot::Cached(grid)) => chunk.restore(coord, grid),
            _ => chunk.generate(coord, &self.terrain),
        }

        if let Err(e) = chunk.rebuild_mesh(&mut self.catalog) {
            warn!("Failed to mesh chunk {:?}: {}", coord, e);
            if chunk.is_changed() {
                self.slots.insert(coord, ChunkSlot::Cached(chunk.take_grid()));
            }
            self.free_chunks.push(index);
            return Err(e);
        }

        chunk.submit_mesh(&mut self.sink);
        self.slots.insert(coord, ChunkSlot::Active(index));

        Ok(())
    }

    /// Returns the chunk at `coord` to the pool, caching its grid if it was modified.
    fn evict(&mut self, coord: ChunkCoord) {
        let Some(ChunkSlot::Active(index)) = self.slots.remove(&coord) else {
            return;
        };

        let chunk = &mut self.chunks[index];
        if chunk.is_changed() {
            self.slots.insert(coord, ChunkSlot::Cached(chunk.take_grid()));
        }

        self.sink.retire(coord);
        self.free_chunks.push(index);
    }

    fn refresh_mesh(&mut self, index: usize) -> Result<()> {
        let chunk = &mut self.chunks[index];
        chunk.rebuild_mesh(&mut self.catalog)?;
        chunk.submit_mesh(&mut self.sink);
        Ok(())
    }
}
