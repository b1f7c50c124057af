//! # Engine Configuration
//!
//! World parameters that are fixed for the lifetime of a world, plus the
//! session settings around them. Both are plain `serde` values so they can
//! be read from a JSON file; every field has a default.

use std::{
    fs,
    path::{Path, PathBuf},
};

use cgmath::Point3;
use log::info;
use serde::{Deserialize, Serialize};

use super::voxels::block::catalog::CatalogConfig;
use crate::error::{Result, WorldError};

/// Largest chunk width and depth a world accepts, in blocks.
pub const MAX_CHUNK_WIDTH: u32 = 128;
/// Largest chunk height a world accepts, in blocks.
pub const MAX_CHUNK_HEIGHT: u32 = 128;
/// Largest streaming radius, in chunks.
pub const MAX_RADIUS: u32 = 32;

/// Parameters shared by every chunk of a world.
///
/// These are set once when a world starts (or restored from a save) and are
/// handed by value to the streaming manager and the chunks it creates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width and depth of a chunk, in blocks.
    pub chunk_width: u32,
    /// Height of a chunk, in blocks. The world is a single chunk tall.
    pub chunk_height: u32,
    /// Multiplier applied to world coordinates before sampling noise.
    pub noise_scale: f32,
    /// Offset added to scaled world coordinates before sampling noise.
    pub noise_offset: [f32; 2],
    /// Streaming radius around the observer's chunk (Chebyshev distance, in chunks).
    pub radius: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            chunk_width: 16,
            chunk_height: 32,
            noise_scale: 0.025,
            noise_offset: [0.0, 0.0],
            radius: 10,
        }
    }
}

impl WorldConfig {
    /// Checks the configuration for values no world can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_width == 0 || self.chunk_height == 0 {
            return Err(WorldError::InvalidConfig(format!(
                "chunk dimensions must be positive, got {}x{}",
                self.chunk_width, self.chunk_height
            )));
        }
        if self.chunk_width > MAX_CHUNK_WIDTH || self.chunk_height > MAX_CHUNK_HEIGHT {
            return Err(WorldError::InvalidConfig(format!(
                "chunk dimensions {}x{} exceed {}x{}",
                self.chunk_width, self.chunk_height, MAX_CHUNK_WIDTH, MAX_CHUNK_HEIGHT
            )));
        }
        if !self.noise_scale.is_finite() || !self.noise_offset.iter().all(|o| o.is_finite()) {
            return Err(WorldError::InvalidConfig(
                "noise scale and offset must be finite".into(),
            ));
        }
        if self.radius > MAX_RADIUS {
            return Err(WorldError::InvalidConfig(format!(
                "radius {} exceeds {}",
                self.radius, MAX_RADIUS
            )));
        }

        Ok(())
    }

    pub fn width(&self) -> usize {
        self.chunk_width as usize
    }

    pub fn height(&self) -> usize {
        self.chunk_height as usize
    }

    /// Observer position used for a fresh world: above the middle of chunk (0, 0).
    pub fn default_spawn(&self) -> Point3<f32> {
        Point3::new(
            (self.chunk_width / 2) as f32,
            (self.chunk_height + 10) as f32,
            (self.chunk_width / 2) as f32,
        )
    }
}

/// Session settings: the world, its block catalog, and where quick saves go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub catalog: CatalogConfig,
    /// File quick saves are written to and loaded from.
    pub save_file: PathBuf,
    /// Whether starting a session should try to resume from `save_file`.
    pub load_from_save: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            world: WorldConfig::default(),
            catalog: CatalogConfig::default(),
            save_file: PathBuf::from("quicksave.sav"),
            load_from_save: false,
        }
    }
}

impl EngineConfig {
    /// Reads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.world.validate()?;
        info!("Loaded engine config from {}", path.display());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WorldConfig::default().validate().is_ok());
        assert_eq!(
            WorldConfig::default().default_spawn(),
            Point3::new(8.0, 42.0, 8.0)
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = WorldConfig {
            chunk_width: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidConfig(_))
        ));

        let config = WorldConfig {
            noise_scale: f32::NAN,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_dimensions_and_radius_are_rejected() {
        let largest = WorldConfig {
            chunk_width: MAX_CHUNK_WIDTH,
            chunk_height: MAX_CHUNK_HEIGHT,
            radius: MAX_RADIUS,
            ..WorldConfig::default()
        };
        assert!(largest.validate().is_ok());

        for config in [
            WorldConfig { chunk_width: MAX_CHUNK_WIDTH + 1, ..largest.clone() },
            WorldConfig { chunk_height: MAX_CHUNK_HEIGHT + 1, ..largest.clone() },
            WorldConfig { chunk_width: 1 << 22, chunk_height: 1 << 22, ..largest.clone() },
            WorldConfig { radius: MAX_RADIUS + 1, ..largest.clone() },
        ] {
            assert!(matches!(
                config.validate(),
                Err(WorldError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "world": { "chunk_width": 8, "radius": 2 }, "load_from_save": true }"#)
                .unwrap();
        assert_eq!(config.world.chunk_width, 8);
        assert_eq!(config.world.chunk_height, 32);
        assert_eq!(config.world.radius, 2);
        assert!(config.load_from_save);
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "save_file": "world.sav" }"#).unwrap();

        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.save_file, PathBuf::from("world.sav"));
        assert!(EngineConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
