//! Error types for the voxel terrain crate

use thiserror::Error;

use crate::engine_state::voxels::block::{block_type::BlockType, catalog::Tile};

/// Main error type for world generation, streaming and persistence
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("No catalog settings for block type {0:?}")]
    MissingBlock(BlockType),

    #[error("No catalog settings for tile {0:?}")]
    MissingTile(Tile),

    #[error("Invalid block catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("Observer position out of range: {0}")]
    ObserverOutOfRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Save encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Corrupt save data: {0}")]
    CorruptSave(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, WorldError>;
