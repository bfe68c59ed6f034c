#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! Chunked voxel world streaming: procedural terrain from fractal noise, per-chunk
//! persistence, neighbor-aware face-culled meshing and budgeted loading around a
//! moving viewpoint.
//!
//! ## Key Modules
//!
//! * `engine_state` - The engine container, its configuration and subsystems
//! * `engine_state::voxels` - Chunks, noise, terrain, persistence and the chunk allocator
//! * `engine_state::rendering` - Mesh building and the boundary to a graphics backend
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_streaming::{EngineConfig, EngineState};
//!
//! let mut config = EngineConfig::default();
//! config.storage.directory = None;
//! config.allocator.render_distance = 1;
//!
//! let mut engine = EngineState::new(config);
//! for _ in 0..4 {
//!     engine.process_viewpoint(Point3::new(0.0, 0.0, 0.0));
//! }
//! for (key, render_data) in engine.chunk_allocator.get_to_be_rendered_chunks() {
//!     if render_data.is_drawable() {
//!         // bind render_data.mesh_handle, draw at key.world_origin()
//!         let _ = key.world_origin();
//!     }
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunk keys are three integers, hashed without string formatting
//! * Loading is capped per tick; meshing waits for neighbors instead of guessing
//! * Air is skipped a machine word at a time when meshing
//! * Chunks leaving the window are evicted least recently seen first

use std::path::Path;

use cgmath::{EuclideanSpace, Point3, Vector3};
use log::info;

pub mod engine_state;

pub use engine_state::{
    config::{
        AllocatorConfig, BlockPalette, EngineConfig, EvictionPolicy, StorageConfig, TerrainConfig,
        MAX_LOAD_RADIUS,
    },
    rendering::{
        ChunkNeighbors, ChunkRenderData, Mesh, MeshBuilder, MeshHandle, MeshUploader,
        RetainedMeshes, Vertex,
    },
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{chunk_creation::TerrainGenerator, BoundingBox, Chunk, ChunkKey, CHUNK_DIMENSION},
        chunk_allocator::{ChunkAllocator, TickReport},
        chunk_store::ChunkStore,
        noise::{NoiseField, NoiseParameters},
    },
    EngineState,
};

/// Number of ticks the demo simulates.
pub const DEMO_TICKS: usize = 240;

/// Installs an `env_logger` writing to stdout, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

/// Runs a headless streaming session: a viewpoint walks across the terrain while
/// chunks are streamed around it, then a body is dropped onto the ground.
///
/// # Arguments
///
/// * `config_path` - Optional JSON configuration file; defaults are used otherwise
pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    init_logging();
    info!("Logger initialized");

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut engine = EngineState::new(config);
    let mut position = Point3::new(8.0, 40.0, 8.0);
    let mut total_loaded = 0;
    for tick in 0..DEMO_TICKS {
        // walks one chunk every 16 ticks
        position.x += 1.0;
        let report = engine.process_viewpoint(position);
        total_loaded += report.loaded;
        if tick % 60 == 0 {
            info!(
                "Tick {}: {} rendered, {} pending, {} deferred",
                tick, report.rendered, report.pending, report.deferred
            );
        }
    }

    let allocator = &engine.chunk_allocator;
    let drawable = allocator
        .get_to_be_rendered_chunks()
        .values()
        .filter(|render_data| render_data.is_drawable())
        .count();
    info!(
        "Loaded {} chunks over {} ticks, {} resident, {} drawable, {} faces uploaded",
        total_loaded,
        DEMO_TICKS,
        allocator.chunk_count(),
        drawable,
        allocator.uploader().total_faces()
    );

    let body_size = Vector3::new(0.6, 1.8, 0.6);
    let landed = drop_body(allocator, position, body_size);
    info!("Body dropped at {:?} came to rest at y = {}", position, landed.y);

    Ok(())
}

/// Lets a body fall straight down through the loaded chunks of its column until
/// it rests on solid ground, or falls out of the loaded world.
fn drop_body<U: MeshUploader>(
    allocator: &ChunkAllocator<U>,
    position: Point3<f32>,
    size: Vector3<f32>,
) -> Point3<f32> {
    let column = allocator.chunk_key_at(position.x, position.y, position.z);
    let below = BoundingBox::new(
        Point3::new(position.x, -f32::MAX, position.z),
        position + size,
    );
    let mut chunks: Vec<&Chunk> = allocator
        .find_intersecting_chunks(&below)
        .into_iter()
        .filter(|chunk| chunk.position.x == column.x && chunk.position.z == column.z)
        .collect();
    chunks.sort_by_key(|chunk| std::cmp::Reverse(chunk.position.y));

    let mut landed = position;
    for chunk in chunks {
        let origin = chunk.position.world_origin().to_vec();
        let local = landed - origin;
        // fall to just below this chunk
        let fall = Vector3::new(0.0, -(local.y + 1.0).max(0.0), 0.0);
        let adjusted = chunk.collide(local, size, fall);
        landed = adjusted + origin;
        if adjusted.y > local.y + fall.y {
            break;
        }
    }
    landed
}
