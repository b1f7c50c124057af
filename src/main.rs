//! # Voxel Terrain Demo Entry Point
//!
//! Runs a headless session of the voxel terrain engine. It simply calls into
//! the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(e) = voxel_terrain::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
