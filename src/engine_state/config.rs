//! # Configuration Module
//!
//! Engine settings, deserialized from JSON with `serde`.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```json
//! {
//!     "allocator": { "render_distance": 6, "eviction": { "policy": "outside_window" } },
//!     "terrain": { "amplitude": 48.0, "block_palette": "random" },
//!     "storage": { "directory": null }
//! }
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use super::voxels::chunk::CHUNK_DIMENSION;

/// Default directory chunk files are stored in.
pub const DEFAULT_LEVEL_DIRECTORY: &str = "levels";

/// Largest load radius in chunks, margin included, that the allocator streams.
pub const MAX_LOAD_RADIUS: u32 = 32;

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Streaming window and budget
    pub allocator: AllocatorConfig,
    /// Procedural terrain
    pub terrain: TerrainConfig,
    /// Chunk persistence
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&contents).with_context(|| format!("loading {}", path.display()))
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(contents: &str) -> anyhow::Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(contents).context("parsing engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but can't be used.
    pub fn validate(&self) -> anyhow::Result<()> {
        let allocator = &self.allocator;
        ensure!(
            allocator.min_height <= allocator.max_height,
            "min_height {} is above max_height {}",
            allocator.min_height,
            allocator.max_height
        );
        ensure!(
            allocator
                .render_distance
                .checked_add(allocator.load_margin)
                .is_some_and(|radius| radius <= MAX_LOAD_RADIUS),
            "render_distance {} plus load_margin {} exceeds the maximum load radius {}",
            allocator.render_distance,
            allocator.load_margin,
            MAX_LOAD_RADIUS
        );
        if let Some(EvictionPolicy::Bounded { max_loaded_chunks }) = allocator.eviction {
            ensure!(
                max_loaded_chunks >= allocator.load_window_volume(),
                "max_loaded_chunks {} can't hold the {} chunks of the load window",
                max_loaded_chunks,
                allocator.load_window_volume()
            );
        }
        ensure!(self.terrain.octaves <= 16, "octaves must not exceed 16");
        Ok(())
    }
}

/// What happens to loaded chunks that left the load window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Chunks stay loaded for the rest of the session.
    Disabled,
    /// Chunks are dropped as soon as they leave the window.
    OutsideWindow,
    /// Chunks outside the window are dropped, least recently inside it first, while
    /// more than `max_loaded_chunks` are loaded.
    Bounded {
        /// Loaded chunk count above which eviction starts
        max_loaded_chunks: usize,
    },
}

/// Settings of the chunk allocator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Window radius in chunks around the viewpoint chunk, per axis
    pub render_distance: u32,
    /// Extra ring of chunks loaded around the render window but never drawn, so
    /// chunks on the window's edge have their neighbors for meshing
    pub load_margin: u32,
    /// Lowest world height (in blocks) that chunks are loaded for
    pub min_height: i32,
    /// Highest world height (in blocks) that chunks are loaded for
    pub max_height: i32,
    /// Chunks loaded per update at most
    pub load_budget: usize,
    /// Eviction of chunks outside the window; `None` selects a bounded policy
    /// sized from the render distance
    pub eviction: Option<EvictionPolicy>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            render_distance: 4,
            load_margin: 1,
            min_height: -128,
            max_height: 128,
            load_budget: 2,
            eviction: None,
        }
    }
}

impl AllocatorConfig {
    /// Lowest chunk y coordinate inside the vertical band.
    pub fn min_chunk_y(&self) -> i32 {
        self.min_height.div_euclid(CHUNK_DIMENSION as i32)
    }

    /// Highest chunk y coordinate inside the vertical band.
    pub fn max_chunk_y(&self) -> i32 {
        self.max_height.div_euclid(CHUNK_DIMENSION as i32)
    }

    /// Radius of the window chunks are loaded for, margin included.
    pub fn load_radius(&self) -> u32 {
        self.render_distance.saturating_add(self.load_margin)
    }

    /// Upper bound on the number of keys in the load window.
    pub fn load_window_volume(&self) -> usize {
        let side = (self.load_radius() as usize).saturating_mul(2).saturating_add(1);
        let band = (self.max_chunk_y() as i64 - self.min_chunk_y() as i64 + 1).max(0) as usize;
        side.saturating_mul(side).saturating_mul(side.min(band))
    }

    /// The eviction policy in effect.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction.unwrap_or(EvictionPolicy::Bounded {
            max_loaded_chunks: self.load_window_volume().saturating_mul(2),
        })
    }

    /// A copy whose `render_distance` and `load_margin` are reduced so the load
    /// radius does not exceed [`MAX_LOAD_RADIUS`].
    pub fn clamped(&self) -> AllocatorConfig {
        let render_distance = self.render_distance.min(MAX_LOAD_RADIUS);
        AllocatorConfig {
            render_distance,
            load_margin: self.load_margin.min(MAX_LOAD_RADIUS - render_distance),
            ..self.clone()
        }
    }
}

/// Source of block types for generated voxels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPalette {
    /// Grass, dirt and stone by depth below the surface; reproducible per key.
    #[default]
    Layered,
    /// A random type per voxel; only reproducible once persisted.
    Random,
}

/// Settings of procedural terrain generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World block coordinate to noise input scale
    pub horizontal_scale: f64,
    /// Offset added to noise input after scaling
    pub horizontal_offset: f64,
    /// Height in blocks of a noise value of 1
    pub amplitude: f64,
    /// fbm octave count
    pub octaves: u32,
    /// fbm amplitude decay per octave
    pub persistence: f64,
    /// fbm base elevation
    pub base_elevation: f64,
    /// Noise input scale applied on top of `horizontal_scale`
    pub zoom: f64,
    /// Whether caves are carved
    pub caves: bool,
    /// World block coordinate to cave noise input scale
    pub cave_scale: f64,
    /// Cave noise value above which voxels are carved
    pub cave_threshold: f64,
    /// Seed of the cave noise
    pub cave_seed: u32,
    /// Block type assignment
    pub block_palette: BlockPalette,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            horizontal_scale: 0.01,
            horizontal_offset: 0.5,
            amplitude: 32.0,
            octaves: 4,
            persistence: 0.5,
            base_elevation: 0.0,
            zoom: 1.0,
            caves: true,
            cave_scale: 0.05,
            cave_threshold: 0.3,
            cave_seed: 0,
            block_palette: BlockPalette::Layered,
        }
    }
}

/// Settings of chunk persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of chunk files; `null` disables persistence
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            directory: Some(PathBuf::from(DEFAULT_LEVEL_DIRECTORY)),
        }
    }
}
