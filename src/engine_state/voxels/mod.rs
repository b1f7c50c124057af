//! # Voxel World Core
//!
//! This module contains the voxel data of the world and the systems that
//! generate, stream, edit and persist it.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block types, face directions, per-cell data and the block catalog
//! * **Chunk**: Fixed-size columns of cells that build their own meshes
//! * **Terrain**: Deterministic height-field generation from Perlin noise
//! * **World**: Streams chunks around the observer, pools chunk objects and caches modified grids
//! * **Persistence**: Binary save files holding only the modified chunks
//!
//! ## Data Flow
//!
//! 1. The observer's position moves into a new chunk
//! 2. World evicts chunks that left the radius and activates those that entered it
//! 3. Activated chunks are revived from the cache or generated from noise
//! 4. Every activated or edited chunk rebuilds its mesh and hands it to the sink
//!
//! Everything runs synchronously on the caller's thread.

pub mod block;
pub mod chunk;
pub mod persistence;
pub mod terrain;
pub mod world;
