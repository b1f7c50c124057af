//! # Persistence
//!
//! Binary save files for a world. A save holds the parameters needed to
//! regenerate terrain, the observer's position, and the full grid of every
//! chunk that was modified. Unmodified chunks are never written: loading a
//! save and regenerating them from noise reproduces them exactly.
//!
//! ## File layout
//!
//! A [`SaveHeader`] (magic bytes and format version) followed by a
//! [`SaveData`] value, both `bincode` encoded. Chunk cells are stored in the
//! grid's storage order as `(block type, health)` pairs.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use cgmath::Point3;
use log::info;
use serde::{Deserialize, Serialize};

use super::{
    block::{block_type::BlockType, BlockCell, BlockTypeSize},
    chunk::{chunk_grid::ChunkGrid, ChunkCoord},
};
use crate::{
    engine_state::config::WorldConfig,
    error::{Result, WorldError},
};

/// Identifies a voxel terrain save file.
pub const SAVE_MAGIC: [u8; 4] = *b"VXTS";
/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SaveHeader {
    magic: [u8; 4],
    version: u32,
}

/// The full grid of one modified chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    /// `(block type, health)` per cell, in x, y, z storage order.
    pub cells: Vec<(BlockTypeSize, f32)>,
}

impl ChunkRecord {
    pub fn from_grid(coord: ChunkCoord, grid: &ChunkGrid) -> Self {
        ChunkRecord {
            coord,
            cells: grid
                .cells()
                .iter()
                .map(|cell| (cell.block_type.to_int(), cell.health))
                .collect(),
        }
    }

    /// Decodes the record into a grid of the given dimensions.
    pub fn to_grid(&self, width: usize, height: usize) -> Result<ChunkGrid> {
        let cells = self
            .cells
            .iter()
            .map(|&(btype, health)| {
                BlockType::from_int(btype)
                    .map(|block_type| BlockCell::new(block_type, health))
                    .ok_or_else(|| {
                        WorldError::CorruptSave(format!(
                            "unknown block type {} in chunk {:?}",
                            btype, self.coord
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let cell_count = cells.len();
        ChunkGrid::from_cells(width, height, cells).ok_or_else(|| {
            WorldError::CorruptSave(format!(
                "chunk {:?} has {} cells, expected {}",
                self.coord,
                cell_count,
                width * height * width
            ))
        })
    }
}

/// Everything written to a save file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub chunk_width: i32,
    pub chunk_height: i32,
    pub noise_scale: f32,
    pub noise_offset: [f32; 2],
    pub observer_position: [f32; 3],
    pub modified_chunks: Vec<ChunkRecord>,
}

impl SaveData {
    /// Starts a save for a world with no modified chunks.
    pub fn new(config: &WorldConfig, observer: Point3<f32>) -> Self {
        SaveData {
            chunk_width: config.chunk_width as i32,
            chunk_height: config.chunk_height as i32,
            noise_scale: config.noise_scale,
            noise_offset: config.noise_offset,
            observer_position: observer.into(),
            modified_chunks: Vec::new(),
        }
    }

    pub fn push_chunk(&mut self, coord: ChunkCoord, grid: &ChunkGrid) {
        self.modified_chunks.push(ChunkRecord::from_grid(coord, grid));
    }

    pub fn observer(&self) -> Point3<f32> {
        Point3::from(self.observer_position)
    }

    /// The world configuration recorded in the save, streamed with `radius`.
    pub fn world_config(&self, radius: u32) -> Result<WorldConfig> {
        if self.chunk_width <= 0 || self.chunk_height <= 0 {
            return Err(WorldError::CorruptSave(format!(
                "chunk dimensions must be positive, got {}x{}",
                self.chunk_width, self.chunk_height
            )));
        }

        let config = WorldConfig {
            chunk_width: self.chunk_width as u32,
            chunk_height: self.chunk_height as u32,
            noise_scale: self.noise_scale,
            noise_offset: self.noise_offset,
            radius,
        };
        config
            .validate()
            .map_err(|e| WorldError::CorruptSave(e.to_string()))?;

        Ok(config)
    }

    /// Decodes every modified chunk. When a coordinate appears twice, the later record wins.
    pub fn chunk_grids(&self) -> Result<Vec<(ChunkCoord, ChunkGrid)>> {
        let (width, height) = (self.chunk_width as usize, self.chunk_height as usize);
        let mut grids: Vec<(ChunkCoord, ChunkGrid)> = Vec::with_capacity(self.modified_chunks.len());

        for record in &self.modified_chunks {
            let grid = record.to_grid(width, height)?;
            match grids.iter_mut().find(|(coord, _)| *coord == record.coord) {
                Some(existing) => existing.1 = grid,
                None => grids.push((record.coord, grid)),
            }
        }

        Ok(grids)
    }

    fn validate(&self) -> Result<()> {
        self.world_config(0)?;
        self.chunk_grids()?;
        Ok(())
    }
}

/// Writes `data` to `path`, replacing any existing file.
pub fn save(path: impl AsRef<Path>, data: &SaveData) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    let header = SaveHeader {
        magic: SAVE_MAGIC,
        version: SAVE_VERSION,
    };
    bincode::serialize_into(&mut writer, &header)?;
    bincode::serialize_into(&mut writer, data)?;
    writer.flush()?;

    info!(
        "Saved {} modified chunks to {}",
        data.modified_chunks.len(),
        path.display()
    );

    Ok(())
}

/// Reads a save file.
///
/// # Returns
/// `Ok(None)` when there is no file at `path`; the caller should start a fresh world.
pub fn load(path: impl AsRef<Path>) -> Result<Option<SaveData>> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No save data at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let mut reader = BufReader::new(file);

    let header: SaveHeader = bincode::deserialize_from(&mut reader)
        .map_err(|e| WorldError::CorruptSave(format!("unreadable header: {}", e)))?;
    if header.magic != SAVE_MAGIC {
        return Err(WorldError::CorruptSave("not a voxel terrain save".into()));
    }
    if header.version != SAVE_VERSION {
        return Err(WorldError::CorruptSave(format!(
            "unsupported save version {}",
            header.version
        )));
    }

    let data: SaveData = bincode::deserialize_from(&mut reader)?;
    data.validate()?;

    info!(
        "Loaded {} modified chunks from {}",
        data.modified_chunks.len(),
        path.display()
    );

    Ok(Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config() -> WorldConfig {
        WorldConfig {
            chunk_width: 2,
            chunk_height: 3,
            noise_scale: 0.5,
            noise_offset: [1.5, -2.0],
            radius: 1,
        }
    }

    fn sample_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(2, 3);
        *grid.get_mut(Point3::new(1, 2, 0)).unwrap() = BlockCell::new(BlockType::Ice, 0.25);
        *grid.get_mut(Point3::new(0, 0, 1)).unwrap() = BlockCell::new(BlockType::Stone, 4.0);
        grid
    }

    #[test]
    fn writes_and_reads_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.sav");

        let mut data = SaveData::new(&config(), Point3::new(1.0, 2.0, 3.0));
        data.push_chunk(ChunkCoord::new(-3, 7), &sample_grid());
        save(&path, &data).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, data);
        assert_eq!(loaded.observer(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(loaded.world_config(4).unwrap(), WorldConfig { radius: 4, ..config() });

        let grids = loaded.chunk_grids().unwrap();
        assert_eq!(grids, vec![(ChunkCoord::new(-3, 7), sample_grid())]);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path().join("nothing.sav")).unwrap().is_none());
    }

    #[test]
    fn rejects_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.sav");
        fs::write(&path, b"definitely not a save file").unwrap();

        assert!(matches!(load(&path), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.sav");
        let header = SaveHeader {
            magic: SAVE_MAGIC,
            version: SAVE_VERSION + 1,
        };
        let mut bytes = bincode::serialize(&header).unwrap();
        bytes.extend(bincode::serialize(&SaveData::new(&config(), Point3::new(0.0, 0.0, 0.0))).unwrap());
        fs::write(&path, bytes).unwrap();

        assert!(matches!(load(&path), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn rejects_records_of_the_wrong_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.sav");

        let mut data = SaveData::new(&config(), Point3::new(0.0, 0.0, 0.0));
        data.modified_chunks.push(ChunkRecord {
            coord: ChunkCoord::new(0, 0),
            cells: vec![(0, 0.0); 5],
        });
        save(&path, &data).unwrap();

        assert!(matches!(load(&path), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn rejects_unknown_block_types_and_bad_dimensions() {
        let mut data = SaveData::new(&config(), Point3::new(0.0, 0.0, 0.0));
        data.modified_chunks.push(ChunkRecord {
            coord: ChunkCoord::new(0, 0),
            cells: vec![(200, 1.0); 12],
        });
        assert!(matches!(data.chunk_grids(), Err(WorldError::CorruptSave(_))));

        data.chunk_width = 0;
        assert!(matches!(data.world_config(1), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn rejects_oversized_chunk_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.sav");

        let mut data = SaveData::new(&config(), Point3::new(0.0, 0.0, 0.0));
        data.chunk_width = 1 << 22;
        data.chunk_height = 1 << 22;
        save(&path, &data).unwrap();

        assert!(matches!(load(&path), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn later_duplicate_record_wins() {
        let mut data = SaveData::new(&config(), Point3::new(0.0, 0.0, 0.0));
        data.push_chunk(ChunkCoord::new(1, 1), &ChunkGrid::new(2, 3));
        data.push_chunk(ChunkCoord::new(1, 1), &sample_grid());

        let grids = data.chunk_grids().unwrap();
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].1, sample_grid());
    }
}
