//! # Voxel Terrain
//!
//! A streamed, editable voxel terrain engine.
//!
//! The world is an infinite grid of fixed-size chunk columns generated from
//! 2D Perlin noise. Only the chunks within a configured radius of a moving
//! observer are active; each active chunk builds a face-culled mesh and hands
//! it to a [`MeshSink`](engine_state::rendering::MeshSink) for rendering and
//! collision. Blocks can be placed and damaged, modified chunks survive being
//! streamed out, and the whole world can be quick-saved to a compact binary
//! file that stores nothing but the modified chunks.
//!
//! ## Key Modules
//!
//! * `engine_state` - The session, world streaming, voxel data, meshing and persistence
//! * `error` - The crate's error type
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_terrain::run().unwrap();
//! }
//! ```
//!
//! Embedding the engine directly:
//!
//! ```rust,no_run
//! use cgmath::Point3;
//! use voxel_terrain::engine_state::{
//!     config::EngineConfig, rendering::NullMeshSink, voxels::block::block_type::BlockType,
//!     EngineState,
//! };
//!
//! let mut engine = EngineState::start(&EngineConfig::default(), NullMeshSink)?;
//! engine.place_block(Point3::new(3, 20, 4), BlockType::Ice)?;
//! engine.update(Point3::new(100.0, 40.0, 8.0))?;
//! # Ok::<(), voxel_terrain::error::WorldError>(())
//! ```

use cgmath::{Point3, Vector3};
use log::info;

use engine_state::{
    config::EngineConfig,
    rendering::MeshStatsSink,
    voxels::block::block_type::BlockType,
    EngineState,
};

pub mod engine_state;
pub mod error;

/// Number of chunks the demo observer walks along the x axis.
const DEMO_WALK_CHUNKS: i32 = 4;

/// Runs a headless demo session.
///
/// The first command line argument, if any, is a JSON [`EngineConfig`] file.
/// The demo walks the observer across a few chunks, edits blocks along the
/// way, quick-saves, then resumes the save and reports what was streamed.
pub fn run() -> error::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let mut engine = EngineState::start(&config, MeshStatsSink::new())?;
    log_stats("Initial", &engine);

    let width = config.world.chunk_width as f32;
    let start = engine.observer();
    for step in 1..=DEMO_WALK_CHUNKS {
        let observer = start + Vector3::new(step as f32 * width, 0.0, 0.0);
        if let Some(pass) = engine.update(observer)? {
            info!(
                "Walked to {:?}: {} chunks loaded, {} evicted",
                observer,
                pass.loaded.len(),
                pass.evicted.len()
            );
        }

        // Dig out the surface block below the observer and put ice next to it.
        let column = Point3::new(observer.x.floor() as i32, 0, observer.z.floor() as i32);
        let surface = engine
            .world()
            .terrain()
            .height_at(column.x, column.z) as i32;
        let dug = Point3::new(column.x, surface, column.z);
        let outcome = engine.damage_block(dug, f32::MAX)?;
        engine.place_block(dug + Vector3::new(1, 0, 0), BlockType::Ice)?;
        info!("Dug {:?}: {:?}", dug, outcome);
    }

    log_stats("After walk", &engine);
    let saved = engine.quick_save()?.to_path_buf();
    info!("Quick saved to {}", saved.display());

    let resume_config = EngineConfig {
        load_from_save: true,
        ..config
    };
    let resumed = EngineState::start(&resume_config, MeshStatsSink::new())?;
    log_stats("Resumed", &resumed);

    Ok(())
}

fn log_stats(label: &str, engine: &EngineState<MeshStatsSink>) {
    let world = engine.world();
    let sink = world.sink();
    info!(
        "{}: observer {:?}, {} active chunks, {} cached, {} allocated, {} live meshes using {} bytes",
        label,
        engine.observer(),
        world.active_chunk_count(),
        world.cached_chunk_count(),
        world.allocated_chunk_count(),
        sink.live_chunks(),
        sink.total_used_bytes()
    );
}
