//! # Engine State Module
//!
//! The session layer of the voxel terrain engine.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world and the observer for one session
//! * `config` - World, catalog and session settings
//! * `rendering` - Mesh buffers and the sink they are handed to
//! * `voxels` - Voxel data, chunks, terrain generation, streaming and persistence
//!
//! ## Architecture
//!
//! `EngineState` is the central coordinator: it starts a world (fresh or from
//! a quick save), forwards observer movement and block edits to it, and
//! writes quick saves. Rendering and physics live outside the crate and only
//! see the meshes passed to their [`MeshSink`](rendering::MeshSink).

use std::path::{Path, PathBuf};

use cgmath::Point3;
use log::info;

use config::EngineConfig;
use rendering::MeshSink;
use voxels::{
    block::{block_type::BlockType, catalog::BlockCatalog},
    chunk::DamageOutcome,
    persistence,
    world::{StreamingPass, World},
};

use crate::error::Result;

pub mod config;
pub mod rendering;
pub mod voxels;

/// The main state container for a session
///
/// Holds the streamed world, the observer's last known position and the
/// file quick saves are written to.
///
/// # Examples
///
/// ```no_run
/// use voxel_terrain::engine_state::{config::EngineConfig, rendering::NullMeshSink, EngineState};
/// use cgmath::Point3;
///
/// let mut engine = EngineState::start(&EngineConfig::default(), NullMeshSink)?;
///
/// // Main loop
/// engine.update(Point3::new(40.0, 30.0, 8.0))?;
/// engine.quick_save()?;
/// # Ok::<(), voxel_terrain::error::WorldError>(())
/// ```
pub struct EngineState<S: MeshSink> {
    /// The streamed voxel world
    world: World<S>,
    /// Current observer position in world space
    observer: Point3<f32>,
    /// Destination of quick saves
    save_file: PathBuf,
}

impl<S: MeshSink> EngineState<S> {
    /// Creates a session with a fresh world and the observer at the default spawn point
    ///
    /// The chunks around the spawn point are streamed in before this returns.
    ///
    /// # Arguments
    ///
    /// * `config` - Session settings
    /// * `sink` - Receiver of all chunk meshes
    pub fn new(config: &EngineConfig, sink: S) -> Result<Self> {
        let catalog = BlockCatalog::new(config.catalog.clone())?;
        let world = World::new(config.world.clone(), catalog, sink)?;
        let observer = config.world.default_spawn();
        info!("Starting fresh world at {:?}", observer);

        Self::with_world(world, observer, config.save_file.clone())
    }

    /// Creates a session, resuming from the save file when the configuration asks for it
    ///
    /// A missing save file is not an error: the session starts a fresh world instead.
    pub fn start(config: &EngineConfig, sink: S) -> Result<Self> {
        if !config.load_from_save {
            return Self::new(config, sink);
        }

        match persistence::load(&config.save_file)? {
            Some(save) => {
                let catalog = BlockCatalog::new(config.catalog.clone())?;
                let world = World::from_save(&save, config.world.radius, catalog, sink)?;
                info!(
                    "Resuming world from {} at {:?}",
                    config.save_file.display(),
                    save.observer()
                );

                Self::with_world(world, save.observer(), config.save_file.clone())
            }
            None => Self::new(config, sink),
        }
    }

    fn with_world(mut world: World<S>, observer: Point3<f32>, save_file: PathBuf) -> Result<Self> {
        world.update_observer(observer)?;

        Ok(Self {
            world,
            observer,
            save_file,
        })
    }

    /// Moves the observer and streams chunks around its new position
    ///
    /// A failed pass leaves the stored observer position unchanged.
    ///
    /// # Returns
    ///
    /// The chunks loaded and evicted, or `None` when the observer stayed in its chunk
    pub fn update(&mut self, observer: Point3<f32>) -> Result<Option<StreamingPass>> {
        let pass = self.world.update_observer(observer)?;
        self.observer = observer;

        Ok(pass)
    }

    /// Places a block at a world position. See [`World::place_block`].
    pub fn place_block(&mut self, position: Point3<i32>, block_type: BlockType) -> Result<bool> {
        self.world.place_block(position, block_type)
    }

    /// Damages the block at a world position. See [`World::damage_block`].
    pub fn damage_block(&mut self, position: Point3<i32>, amount: f32) -> Result<DamageOutcome> {
        self.world.damage_block(position, amount)
    }

    /// Writes the world and the observer position to the session's save file
    ///
    /// # Returns
    ///
    /// The path that was written
    pub fn quick_save(&self) -> Result<&Path> {
        let data = self.world.save_data(self.observer);
        persistence::save(&self.save_file, &data)?;

        Ok(&self.save_file)
    }

    pub fn world(&self) -> &World<S> {
        &self.world
    }

    pub fn observer(&self) -> Point3<f32> {
        self.observer
    }
}
