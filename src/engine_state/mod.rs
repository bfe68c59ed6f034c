//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - Engine settings and their JSON loading
//! * `rendering` - Meshing and the boundary to a graphics backend
//! * `voxels` - Voxel data, terrain generation, persistence and chunk streaming
//!
//! ## Architecture
//!
//! `EngineState` owns the chunk allocator and is handed to whatever drives the
//! frame loop; no subsystem reaches the world through global state. Each tick the
//! driver reports the tracked viewpoint, then reads the chunks to render.

use cgmath::Point3;
use log::{debug, info};

use config::EngineConfig;
use rendering::{MeshUploader, RetainedMeshes};
use voxels::{
    chunk::chunk_creation::TerrainGenerator,
    chunk_allocator::{ChunkAllocator, TickReport},
    chunk_store::ChunkStore,
};

pub mod config;
pub mod rendering;
pub mod voxels;

/// The main state container for the voxel engine
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming::{EngineConfig, EngineState};
///
/// let mut config = EngineConfig::default();
/// config.storage.directory = None;
/// config.allocator.render_distance = 1;
///
/// let mut engine_state = EngineState::new(config);
/// let report = engine_state.process_viewpoint(Point3::new(8.0, 8.0, 8.0));
/// assert_eq!(report.loaded, 2);
/// ```
pub struct EngineState<U: MeshUploader = RetainedMeshes> {
    /// Settings the engine was created with
    config: EngineConfig,
    /// Streaming controller owning every loaded chunk
    pub chunk_allocator: ChunkAllocator<U>,
    /// Number of processed ticks
    ticks: u64,
}

impl EngineState<RetainedMeshes> {
    /// Creates an engine that keeps its meshes in memory.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_uploader(config, RetainedMeshes::new())
    }
}

impl<U: MeshUploader> EngineState<U> {
    /// Creates an engine that hands its meshes to `uploader`.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine settings
    /// * `uploader` - Receiver of chunk meshes, usually a graphics backend
    pub fn with_uploader(config: EngineConfig, uploader: U) -> Self {
        let generator = TerrainGenerator::new(config.terrain.clone());
        let store = ChunkStore::new(config.storage.directory.clone(), generator);
        match store.directory() {
            Some(directory) => info!("Storing chunks in {}", directory.display()),
            None => info!("Chunk persistence disabled"),
        }

        let chunk_allocator = ChunkAllocator::new(config.allocator.clone(), store, uploader);

        EngineState {
            config,
            chunk_allocator,
            ticks: 0,
        }
    }

    /// The settings the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one streaming tick for the tracked viewpoint.
    ///
    /// # Arguments
    ///
    /// * `position` - World-space position of the tracked entity, e.g. the camera
    pub fn process_viewpoint(&mut self, position: Point3<f32>) -> TickReport {
        let previous_chunk = self.chunk_allocator.viewpoint_chunk();
        let report = self.chunk_allocator.update(position);
        self.ticks += 1;

        if let Some(previous_chunk) = previous_chunk {
            if previous_chunk != report.viewpoint_chunk {
                debug!(
                    "Tick {}: viewpoint moved from chunk {} to {}",
                    self.ticks, previous_chunk, report.viewpoint_chunk
                );
            }
        }

        report
    }
}
