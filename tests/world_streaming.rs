//! End-to-end streaming, editing and persistence through the public API.

use cgmath::Point3;
use voxel_terrain::engine_state::{
    config::{EngineConfig, WorldConfig},
    rendering::{MeshSink, MeshStatsSink, NullMeshSink},
    voxels::{
        block::{
            block_type::BlockType,
            catalog::{BlockCatalog, CatalogConfig},
            BlockCell,
        },
        chunk::{ChunkCoord, DamageOutcome},
        persistence,
        terrain::TerrainGenerator,
        world::World,
    },
    EngineState,
};

fn world(radius: u32) -> World<MeshStatsSink> {
    let config = WorldConfig {
        radius,
        ..WorldConfig::default()
    };
    let catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
    World::new(config, catalog, MeshStatsSink::new()).unwrap()
}

fn chunk_center(x: i32, z: i32) -> Point3<f32> {
    Point3::new(x as f32 * 16.0 + 8.0, 50.0, z as f32 * 16.0 + 8.0)
}

fn surface<S: MeshSink>(world: &World<S>, x: i32, z: i32) -> Point3<i32> {
    Point3::new(x, world.terrain().height_at(x, z) as i32, z)
}

#[test]
fn observer_step_creates_and_evicts_exactly_one_column() {
    let mut world = world(5);
    world.update_observer(chunk_center(0, 0)).unwrap();
    let before = world.active_coords();

    let pass = world.update_observer(chunk_center(1, 0)).unwrap().unwrap();
    let after = world.active_coords();

    let created: Vec<ChunkCoord> = after.iter().filter(|c| !before.contains(c)).copied().collect();
    let evicted: Vec<ChunkCoord> = before.iter().filter(|c| !after.contains(c)).copied().collect();

    assert!(created.iter().all(|c| c.x == 6));
    assert_eq!(created.len(), 11);
    assert!(evicted.iter().all(|c| c.x == -5));
    assert_eq!(evicted.len(), 11);
    assert_eq!(pass.loaded, created);
    assert_eq!(pass.evicted, evicted);
}

#[test]
fn terrain_is_identical_across_worlds() {
    let config = WorldConfig::default();
    let mut catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
    let terrain = TerrainGenerator::new(&config, &mut catalog).unwrap();

    let mut a = world(1);
    let mut b = world(1);
    a.update_observer(chunk_center(3, -2)).unwrap();
    b.update_observer(chunk_center(3, -2)).unwrap();

    for coord in a.active_coords() {
        let grid = a.chunk(coord).unwrap().grid();
        assert_eq!(grid, b.chunk(coord).unwrap().grid());

        let origin = coord.origin(16);
        for (pos, cell) in grid.iter() {
            let expected = terrain.block_type_at(origin.x + pos.x, pos.y as usize, origin.z + pos.z);
            assert_eq!(cell.block_type, expected);
        }
    }
}

#[test]
fn dug_hole_survives_streaming_out_and_back() {
    let mut world = world(2);
    world.update_observer(chunk_center(0, 0)).unwrap();

    let top = surface(&world, 5, 9);
    let health = world.block_at(top).unwrap().health;
    assert_eq!(
        world.damage_block(top, health).unwrap(),
        DamageOutcome::Destroyed
    );

    world.update_observer(chunk_center(20, 0)).unwrap();
    assert_eq!(world.cached_chunk_count(), 1);
    assert_eq!(world.allocated_chunk_count(), 25);

    world.update_observer(chunk_center(0, 0)).unwrap();
    assert_eq!(world.block_at(top), Some(BlockCell::EMPTY));
    assert_eq!(world.cached_chunk_count(), 0);
}

#[test]
fn meshes_are_narrow_for_terrain_chunks() {
    let mut world = world(1);
    world.update_observer(chunk_center(0, 0)).unwrap();

    for coord in world.active_coords() {
        let mesh = world.sink().live_mesh(coord).unwrap();
        assert!(mesh.vertex_count <= 65535);
        assert_eq!(mesh.index_bytes, mesh.index_count * 2);
        assert_eq!(mesh.vertex_count % 4, 0);
        assert_eq!(mesh.index_count, mesh.vertex_count / 4 * 6);
    }
}

#[test]
fn save_round_trip_restores_modified_and_regenerated_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round_trip.sav");

    let mut original = world(2);
    original.update_observer(chunk_center(0, 0)).unwrap();
    let hole = surface(&original, -25, 3);
    original.place_block(hole, BlockType::None).unwrap();
    let pillar = surface(&original, 12, 12);
    original.place_block(pillar, BlockType::Stone).unwrap();

    // Leave one modified chunk in the cache before saving.
    original.update_observer(chunk_center(1, 0)).unwrap();
    assert_eq!(original.cached_chunk_count(), 1);

    let observer = chunk_center(1, 0);
    persistence::save(&path, &original.save_data(observer)).unwrap();
    let save = persistence::load(&path).unwrap().unwrap();
    assert_eq!(save.modified_chunks.len(), 2);
    assert_eq!(save.observer(), observer);

    let catalog = BlockCatalog::new(CatalogConfig::default()).unwrap();
    let mut restored = World::from_save(&save, 2, catalog, NullMeshSink).unwrap();
    assert_eq!(restored.config(), original.config());
    restored.update_observer(observer).unwrap();
    assert_eq!(restored.active_coords(), original.active_coords());
    for coord in original.active_coords() {
        assert_eq!(
            restored.chunk(coord).unwrap().grid(),
            original.chunk(coord).unwrap().grid()
        );
    }

    restored.update_observer(chunk_center(0, 0)).unwrap();
    assert_eq!(restored.block_at(hole), Some(BlockCell::EMPTY));
}

#[test]
fn session_resumes_from_quick_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.world.radius = 1;
    config.world.noise_offset = [100.0, 200.0];
    config.save_file = dir.path().join("quicksave.sav");

    let mut engine = EngineState::start(&config, NullMeshSink).unwrap();
    let target = Point3::new(2, 0, 2);
    engine.place_block(target, BlockType::Grass).unwrap();
    engine.quick_save().unwrap();

    // The save carries its own noise parameters.
    let mut resume = config.clone();
    resume.load_from_save = true;
    resume.world.noise_offset = [0.0, 0.0];
    let resumed = EngineState::start(&resume, NullMeshSink).unwrap();

    assert_eq!(resumed.world().config().noise_offset, [100.0, 200.0]);
    assert_eq!(
        resumed.world().block_at(target).map(|c| c.block_type),
        Some(BlockType::Grass)
    );
}
