/// Persistence and engine-level tests
/// Chunks written by one engine instance must come back unchanged in the next one
use std::{fs, path::PathBuf};

use cgmath::Point3;
use voxel_streaming::{
    BlockPalette, BlockType, Chunk, ChunkKey, ChunkStore, EngineConfig, EngineState,
    EvictionPolicy, NoiseField, NoiseParameters, TerrainConfig, TerrainGenerator,
};

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("voxel-streaming-{name}-{}", fastrand::u64(..)));
        TempDir(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn engine_config(directory: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.storage.directory = Some(directory.0.clone());
    config.allocator.render_distance = 0;
    config.allocator.load_margin = 0;
    config.allocator.load_budget = 1;
    config.allocator.eviction = Some(EvictionPolicy::Disabled);
    config.terrain.block_palette = BlockPalette::Random;
    config
}

/// A randomly paletted chunk can only be reproduced by reading it back
#[test]
fn chunks_survive_a_restart() {
    let directory = TempDir::new("restart");
    let key = ChunkKey::new(0, -1, 0);
    let viewpoint = Point3::new(4.0, -4.0, 4.0);

    let first = {
        let mut engine = EngineState::new(engine_config(&directory));
        let report = engine.process_viewpoint(viewpoint);
        assert_eq!(report.loaded, 1);
        engine.chunk_allocator.get_chunk(key).unwrap().to_raw()
    };
    assert!(directory.0.join("0_-1_0.chunk").is_file());

    let mut engine = EngineState::new(engine_config(&directory));
    engine.process_viewpoint(viewpoint);
    let second = engine.chunk_allocator.get_chunk(key).unwrap().to_raw();

    assert_eq!(first, second, "reloaded chunk differs from the saved one");
}

/// Edits persisted with `save_chunk` replace the generated data
#[test]
fn saved_edits_are_loaded_instead_of_terrain() {
    let directory = TempDir::new("edits");
    let key = ChunkKey::new(2, 0, -3);

    {
        let mut engine = EngineState::new(engine_config(&directory));
        let mut chunk = Chunk::empty(key);
        chunk.set_block(1, 2, 3, BlockType::DIRT);
        assert!(engine.chunk_allocator.insert_chunk(chunk));
        assert!(engine.chunk_allocator.save_chunk(key).unwrap());
        assert!(!engine.chunk_allocator.save_chunk(ChunkKey::new(9, 0, 9)).unwrap());
    }

    let store = ChunkStore::new(
        Some(directory.0.clone()),
        TerrainGenerator::new(TerrainConfig::default()),
    );
    assert!(store.has_saved_data(key));
    let chunk = store.load(key);
    assert_eq!(chunk.visible_block_count(), 1);
    assert!(chunk.is_block_solid(1, 2, 3));
    assert_eq!(chunk.get_block_type(1, 2, 3), BlockType::DIRT.as_int());
}

/// Garbage on disk is replaced by a generated chunk and overwritten
#[test]
fn corrupt_chunk_files_are_regenerated() {
    let directory = TempDir::new("corrupt");
    let key = ChunkKey::new(0, -2, 0);
    let generator = TerrainGenerator::new(TerrainConfig::default());
    let expected = generator.generate(key).to_raw();

    let store = ChunkStore::new(Some(directory.0.clone()), generator);
    let path = store.path_for(key).unwrap();
    fs::create_dir_all(&directory.0).unwrap();
    fs::write(&path, b"[[1, 2, 3], [0]]").unwrap();

    assert!(store.read(key).is_err());
    assert_eq!(store.load(key).to_raw(), expected);
    assert!(store.read(key).unwrap().is_some(), "regenerated chunk was not written back");
}

#[test]
fn config_file_drives_the_engine() {
    let directory = TempDir::new("config");
    fs::create_dir_all(&directory.0).unwrap();
    let path = directory.0.join("engine.json");
    fs::write(
        &path,
        r#"{
            "allocator": { "render_distance": 1, "load_margin": 0, "load_budget": 100 },
            "storage": { "directory": null }
        }"#,
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    let mut engine = EngineState::new(config);
    let report = engine.process_viewpoint(Point3::new(8.0, 8.0, 8.0));

    assert_eq!(report.loaded, 27);
    assert_eq!(engine.ticks(), 1);
    assert!(engine.chunk_allocator.store().directory().is_none());
    assert!(EngineConfig::load(directory.0.join("missing.json")).is_err());
}

#[test]
fn noise_is_reproducible_across_fields() {
    let parameters = NoiseParameters {
        octaves: 6,
        persistence: 0.6,
        ..NoiseParameters::default()
    };
    let a = NoiseField::new(parameters);
    let b = NoiseField::new(parameters);

    for i in 0..64 {
        let x = i as f64 * 0.37 - 11.0;
        let y = i as f64 * -0.53 + 4.0;
        assert_eq!(a.fbm(x, y), b.fbm(x, y));
        assert!((-1.0..=1.0).contains(&a.fbm(x, y)));
    }

    let generator = TerrainGenerator::new(TerrainConfig::default());
    let key = ChunkKey::new(-3, 0, 7);
    assert_eq!(generator.generate(key).to_raw(), generator.generate(key).to_raw());
}
