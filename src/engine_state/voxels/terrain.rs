//! # Terrain Generation
//!
//! Height-field terrain from 2D Perlin noise. Each column of a chunk is filled
//! from the bottom up to the sampled height, and the block type of every
//! filled cell is chosen from fixed bands of the height fraction `y / H`
//! (stone at the bottom, ice at the top with the default catalog).
//!
//! Generation is a pure function of the world coordinates and the noise
//! parameters. Unmodified chunks are never saved, so regenerating a chunk must
//! reproduce it exactly.

use cgmath::Point3;
use log::trace;
use noise::{NoiseFn, Perlin};

use super::{
    block::{
        block_type::BlockType,
        catalog::{BlockCatalog, BlockLookup},
        BlockCell,
    },
    chunk::chunk_grid::ChunkGrid,
};
use crate::{engine_state::config::WorldConfig, error::Result};

/// Seed of the Perlin permutation table. Fixed so that saves stay reproducible.
pub const NOISE_SEED: u32 = 0;

#[derive(Copy, Clone, Debug, PartialEq)]
struct TerrainBand {
    from_fraction: f32,
    cell: BlockCell,
}

/// Deterministic height and column generator for one world.
pub struct TerrainGenerator {
    perlin: Perlin,
    noise_scale: f64,
    noise_offset: [f64; 2],
    chunk_width: usize,
    chunk_height: usize,
    bands: Vec<TerrainBand>,
}

impl TerrainGenerator {
    /// Builds a generator, taking the band layout and fresh-block health from the catalog.
    pub fn new(config: &WorldConfig, catalog: &mut BlockCatalog) -> Result<Self> {
        let mut bands = Vec::new();
        for (from_fraction, block_type) in catalog.terrain_bands()? {
            let info = catalog.lookup(block_type)?;
            bands.push(TerrainBand {
                from_fraction,
                cell: BlockCell::new(block_type, info.health),
            });
        }

        Ok(TerrainGenerator {
            perlin: Perlin::new(NOISE_SEED),
            noise_scale: config.noise_scale as f64,
            noise_offset: [config.noise_offset[0] as f64, config.noise_offset[1] as f64],
            chunk_width: config.width(),
            chunk_height: config.height(),
            bands,
        })
    }

    /// Terrain surface height of a world column, in `[0, H)`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> usize {
        let sample = self.perlin.get([
            world_x as f64 * self.noise_scale + self.noise_offset[0],
            world_z as f64 * self.noise_scale + self.noise_offset[1],
        ]);

        // Perlin output is centred on zero; shift it into [0, 1] first.
        let normalized = ((sample + 1.0) * 0.5).clamp(0.0, 1.0);
        let height = (normalized * self.chunk_height as f64).floor() as usize;

        height.min(self.chunk_height - 1)
    }

    /// The cell generated at height `y` of a column that reaches at least `y`.
    pub fn cell_for_height(&self, y: usize) -> BlockCell {
        let fraction = y as f32 / self.chunk_height as f32;

        self.bands
            .iter()
            .rev()
            .find(|band| band.from_fraction <= fraction)
            .or_else(|| self.bands.first())
            .map(|band| band.cell)
            .unwrap_or(BlockCell::EMPTY)
    }

    /// Block type at height `y` of the world column `(world_x, world_z)`.
    pub fn block_type_at(&self, world_x: i32, y: usize, world_z: i32) -> BlockType {
        if y > self.height_at(world_x, world_z) {
            return BlockType::None;
        }

        self.cell_for_height(y).block_type
    }

    /// Overwrites `grid` with terrain for a chunk whose origin is at world
    /// `(origin_x, 0, origin_z)`, resizing it to the world's chunk dimensions.
    pub fn generate(&self, grid: &mut ChunkGrid, origin_x: i32, origin_z: i32) {
        grid.reset(self.chunk_width, self.chunk_height);

        for x in 0..self.chunk_width as i32 {
            for z in 0..self.chunk_width as i32 {
                let surface = self.height_at(origin_x + x, origin_z + z);
                for y in 0..=surface {
                    if let Some(cell) = grid.get_mut(Point3::new(x, y as i32, z)) {
                        *cell = self.cell_for_height(y);
                    }
                }
            }
        }

        trace!(
            "Generated terrain at origin ({}, {}) with {} solid cells",
            origin_x,
            origin_z,
            grid.solid_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::catalog::CatalogConfig;

    fn generator(config: &WorldConfig) -> TerrainGenerator {
        let mut catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
        TerrainGenerator::new(config, &mut catalog).unwrap()
    }

    #[test]
    fn heights_are_in_range_and_repeatable() {
        let config = WorldConfig::default();
        let a = generator(&config);
        let b = generator(&config);

        for x in -40..40 {
            for z in -40..40 {
                let h = a.height_at(x * 7, z * 3);
                assert!(h < config.height());
                assert_eq!(h, a.height_at(x * 7, z * 3));
                assert_eq!(h, b.height_at(x * 7, z * 3));
            }
        }
    }

    #[test]
    fn noise_offset_changes_terrain() {
        let base = generator(&WorldConfig::default());
        let shifted = generator(&WorldConfig {
            noise_offset: [13.37, -4.2],
            ..WorldConfig::default()
        });

        let differs = (0..64).any(|x| base.height_at(x, 5) != shifted.height_at(x, 5));
        assert!(differs);
    }

    #[test]
    fn columns_follow_height_bands() {
        let config = WorldConfig::default();
        let terrain = generator(&config);

        assert_eq!(terrain.cell_for_height(0).block_type, BlockType::Stone);
        assert_eq!(terrain.cell_for_height(10).block_type, BlockType::Dirt);
        assert_eq!(terrain.cell_for_height(16).block_type, BlockType::Grass);
        assert_eq!(terrain.cell_for_height(31).block_type, BlockType::Ice);
        assert_eq!(terrain.cell_for_height(0).health, 4.0);

        let h = terrain.height_at(3, 9);
        assert!(terrain.block_type_at(3, h, 9).is_solid());
        if h + 1 < config.height() {
            assert_eq!(terrain.block_type_at(3, h + 1, 9), BlockType::None);
        }
    }

    #[test]
    fn generated_grid_matches_columns() {
        let config = WorldConfig::default();
        let terrain = generator(&config);
        let mut grid = ChunkGrid::new(config.width(), config.height());
        terrain.generate(&mut grid, 32, -16);

        for (pos, cell) in grid.iter() {
            let expected = terrain.block_type_at(32 + pos.x, pos.y as usize, -16 + pos.z);
            assert_eq!(cell.block_type, expected);
            assert_eq!(cell.is_solid(), cell.health > 0.0);
        }

        let mut again = ChunkGrid::default();
        terrain.generate(&mut again, 32, -16);
        assert_eq!(grid, again);
    }
}
