//! # Block Catalog
//!
//! Per-type block data derived from a tile atlas description: the UV quads used
//! for the top, sides and bottom of a block, the terrain height fraction from
//! which the block starts appearing, and the health a fresh block has.
//!
//! Derived [`BlockInfo`]s are memoized the first time a type is looked up.
//! A lookup for a type or tile with no configuration is a content error and is
//! reported as such; callers are not expected to recover from it.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{block_side::FaceTexture, block_type::BlockType};
use crate::error::{Result, WorldError};

/// Four UV corners, in the same order as a face's four vertices.
pub type UvQuad = [[f32; 2]; 4];

/// Named tiles of the texture atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Grass,
    GrassSide,
    Stone,
    Dirt,
    Ice,
    IceSide,
}

/// Position of a tile in the atlas, in tiles, counted from the top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSetup {
    pub tile: Tile,
    pub position: [u32; 2],
}

/// Configuration of a single solid block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSetup {
    pub block_type: BlockType,
    pub tile_top: Tile,
    pub tile_side: Tile,
    pub tile_bottom: Tile,
    /// Fraction of the chunk height, in `[0, 1)`, from which terrain uses this type.
    pub activation_height: f32,
    /// Health of a freshly generated or placed block.
    pub health: f32,
}

/// Atlas layout and block table the catalog derives its data from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Number of tiles along each side of the (square) atlas.
    pub tile_size: u32,
    /// Inset applied to every quad edge, in UV units, to keep mip sampling inside a tile.
    pub uv_epsilon: f32,
    pub tiles: Vec<TileSetup>,
    pub blocks: Vec<BlockSetup>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let tile = |tile, x, y| TileSetup {
            tile,
            position: [x, y],
        };
        let block = |block_type, top, side, bottom, activation_height, health| BlockSetup {
            block_type,
            tile_top: top,
            tile_side: side,
            tile_bottom: bottom,
            activation_height,
            health,
        };

        CatalogConfig {
            tile_size: 16,
            uv_epsilon: 0.001,
            tiles: vec![
                tile(Tile::Grass, 0, 0),
                tile(Tile::GrassSide, 1, 0),
                tile(Tile::Stone, 2, 0),
                tile(Tile::Dirt, 3, 0),
                tile(Tile::Ice, 4, 0),
                tile(Tile::IceSide, 5, 0),
            ],
            blocks: vec![
                block(BlockType::Stone, Tile::Stone, Tile::Stone, Tile::Stone, 0.0, 4.0),
                block(BlockType::Dirt, Tile::Dirt, Tile::Dirt, Tile::Dirt, 0.3, 2.0),
                block(BlockType::Grass, Tile::Grass, Tile::GrassSide, Tile::Dirt, 0.5, 2.0),
                block(BlockType::Ice, Tile::Ice, Tile::IceSide, Tile::Ice, 0.7, 1.0),
            ],
        }
    }
}

/// Derived per-type data consumed by meshing and terrain generation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockInfo {
    pub top_uvs: UvQuad,
    pub side_uvs: UvQuad,
    pub bottom_uvs: UvQuad,
    pub activation_height: f32,
    pub health: f32,
}

impl BlockInfo {
    /// The UV quad for a face that uses the given texture slot.
    pub fn uvs(&self, texture: FaceTexture) -> &UvQuad {
        match texture {
            FaceTexture::Top => &self.top_uvs,
            FaceTexture::Side => &self.side_uvs,
            FaceTexture::Bottom => &self.bottom_uvs,
        }
    }
}

/// Lookup capability for per-type block data.
pub trait BlockLookup {
    /// Returns the derived data for a solid block type.
    fn lookup(&mut self, block_type: BlockType) -> Result<BlockInfo>;
}

/// Memoizing block catalog backed by a [`CatalogConfig`].
#[derive(Debug)]
pub struct BlockCatalog {
    config: CatalogConfig,
    cached_block_infos: HashMap<BlockType, BlockInfo>,
}

impl BlockCatalog {
    /// Creates a catalog after checking the configuration for content errors.
    ///
    /// Missing tiles are not checked here; they surface on the first lookup of
    /// a block that references them.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.tile_size == 0 {
            return Err(WorldError::InvalidCatalog("tile size must be positive".into()));
        }

        let tile_extent = 1.0 / config.tile_size as f32;
        if !(0.0..tile_extent * 0.5).contains(&config.uv_epsilon) {
            return Err(WorldError::InvalidCatalog(format!(
                "uv epsilon {} must lie in [0, {})",
                config.uv_epsilon,
                tile_extent * 0.5
            )));
        }

        for tile in &config.tiles {
            if tile.position[0] >= config.tile_size || tile.position[1] >= config.tile_size {
                return Err(WorldError::InvalidCatalog(format!(
                    "tile {:?} at {:?} lies outside a {}x{} atlas",
                    tile.tile, tile.position, config.tile_size, config.tile_size
                )));
            }
        }

        if config.blocks.is_empty() {
            return Err(WorldError::InvalidCatalog("no block types configured".into()));
        }

        for (i, block) in config.blocks.iter().enumerate() {
            if !block.block_type.is_solid() {
                return Err(WorldError::InvalidCatalog(
                    "the empty block type cannot be configured".into(),
                ));
            }
            if !(block.health > 0.0 && block.health.is_finite()) {
                return Err(WorldError::InvalidCatalog(format!(
                    "{:?} must have positive health, got {}",
                    block.block_type, block.health
                )));
            }
            if !(0.0..1.0).contains(&block.activation_height) {
                return Err(WorldError::InvalidCatalog(format!(
                    "{:?} activation height {} must lie in [0, 1)",
                    block.block_type, block.activation_height
                )));
            }
            if config.blocks[..i]
                .iter()
                .any(|other| other.block_type == block.block_type)
            {
                return Err(WorldError::InvalidCatalog(format!(
                    "{:?} is configured twice",
                    block.block_type
                )));
            }
        }

        Ok(BlockCatalog {
            config,
            cached_block_infos: HashMap::with_capacity(BlockType::SOLID.len()),
        })
    }

    /// The configuration this catalog was built from.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Terrain bands as `(activation_height, block_type)`, lowest band first.
    pub fn terrain_bands(&mut self) -> Result<Vec<(f32, BlockType)>> {
        let block_types: Vec<BlockType> =
            self.config.blocks.iter().map(|b| b.block_type).collect();

        let mut bands = Vec::with_capacity(block_types.len());
        for block_type in block_types {
            let info = self.lookup(block_type)?;
            bands.push((info.activation_height, block_type));
        }
        bands.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        Ok(bands)
    }

    fn derive_block_info(&self, block_type: BlockType) -> Result<BlockInfo> {
        let settings = self
            .config
            .blocks
            .iter()
            .find(|b| b.block_type == block_type)
            .ok_or(WorldError::MissingBlock(block_type))?;

        Ok(BlockInfo {
            top_uvs: self.tile_uvs(settings.tile_top)?,
            side_uvs: self.tile_uvs(settings.tile_side)?,
            bottom_uvs: self.tile_uvs(settings.tile_bottom)?,
            activation_height: settings.activation_height,
            health: settings.health,
        })
    }

    /// UV quad of a tile, flipped so row 0 is the top of the atlas, inset by the epsilon.
    fn tile_uvs(&self, tile: Tile) -> Result<UvQuad> {
        let settings = self
            .config
            .tiles
            .iter()
            .find(|t| t.tile == tile)
            .ok_or(WorldError::MissingTile(tile))?;

        let size = self.config.tile_size as f32;
        let eps = self.config.uv_epsilon;
        let x = settings.position[0] as f32;
        let y = (self.config.tile_size - settings.position[1] - 1) as f32;

        let u0 = x / size + eps;
        let u1 = (x + 1.0) / size - eps;
        let v0 = y / size + eps;
        let v1 = (y + 1.0) / size - eps;

        Ok([[u0, v0], [u0, v1], [u1, v1], [u1, v0]])
    }
}

impl BlockLookup for BlockCatalog {
    fn lookup(&mut self, block_type: BlockType) -> Result<BlockInfo> {
        if let Some(info) = self.cached_block_infos.get(&block_type) {
            return Ok(*info);
        }

        let info = self.derive_block_info(block_type)?;
        debug!("Derived block info for {:?}", block_type);
        self.cached_block_infos.insert(block_type, info);

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn uvs_are_flipped_and_inset() {
        let mut catalog = BlockCatalog::new(CatalogConfig {
            tile_size: 4,
            uv_epsilon: 0.01,
            ..CatalogConfig::default()
        })
        .unwrap();

        // Stone sits at atlas column 2, row 0, which is the top row of UV space.
        let info = catalog.lookup(BlockType::Stone).unwrap();
        let [ll, ul, ur, lr] = info.side_uvs;
        assert!(approx(ll[0], 0.5 + 0.01) && approx(ll[1], 0.75 + 0.01));
        assert!(approx(ul[0], 0.5 + 0.01) && approx(ul[1], 1.0 - 0.01));
        assert!(approx(ur[0], 0.75 - 0.01) && approx(ur[1], 1.0 - 0.01));
        assert!(approx(lr[0], 0.75 - 0.01) && approx(lr[1], 0.75 + 0.01));
    }

    #[test]
    fn grass_uses_distinct_top_side_and_bottom_tiles() {
        let mut catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
        let grass = catalog.lookup(BlockType::Grass).unwrap();
        let dirt = catalog.lookup(BlockType::Dirt).unwrap();

        assert_ne!(grass.top_uvs, grass.side_uvs);
        assert_eq!(grass.bottom_uvs, dirt.top_uvs);
        assert_eq!(grass.uvs(FaceTexture::Side), &grass.side_uvs);
    }

    #[test]
    fn lookups_are_memoized() {
        let mut catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
        let first = catalog.lookup(BlockType::Ice).unwrap();
        assert_eq!(catalog.cached_block_infos.len(), 1);
        let second = catalog.lookup(BlockType::Ice).unwrap();
        assert_eq!(first, second);
        assert_eq!(catalog.cached_block_infos.len(), 1);
    }

    #[test]
    fn missing_block_and_tile_are_reported() {
        let mut config = CatalogConfig::default();
        config.blocks.retain(|b| b.block_type != BlockType::Ice);
        config.tiles.retain(|t| t.tile != Tile::GrassSide);
        let mut catalog = BlockCatalog::new(config).unwrap();

        assert!(matches!(
            catalog.lookup(BlockType::Ice),
            Err(WorldError::MissingBlock(BlockType::Ice))
        ));
        assert!(matches!(
            catalog.lookup(BlockType::Grass),
            Err(WorldError::MissingTile(Tile::GrassSide))
        ));
        assert!(matches!(
            catalog.lookup(BlockType::None),
            Err(WorldError::MissingBlock(BlockType::None))
        ));
    }

    #[test]
    fn invalid_content_is_rejected() {
        let mut config = CatalogConfig::default();
        config.blocks[0].health = 0.0;
        assert!(matches!(
            BlockCatalog::new(config),
            Err(WorldError::InvalidCatalog(_))
        ));

        let mut config = CatalogConfig::default();
        config.blocks[1].activation_height = 1.0;
        assert!(BlockCatalog::new(config).is_err());

        let mut config = CatalogConfig::default();
        config.tiles[0].position = [16, 0];
        assert!(BlockCatalog::new(config).is_err());

        let mut config = CatalogConfig::default();
        let duplicate = config.blocks[0].clone();
        config.blocks.push(duplicate);
        assert!(BlockCatalog::new(config).is_err());
    }

    #[test]
    fn terrain_bands_are_sorted_by_activation_height() {
        let mut catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
        let bands = catalog.terrain_bands().unwrap();
        let types: Vec<BlockType> = bands.iter().map(|b| b.1).collect();
        assert_eq!(
            types,
            vec![BlockType::Stone, BlockType::Dirt, BlockType::Grass, BlockType::Ice]
        );
    }
}
