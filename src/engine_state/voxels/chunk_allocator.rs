//! # Chunk Allocator Module
//!
//! The streaming controller: decides which chunks are loaded, meshed, drawn and
//! evicted as the viewpoint moves.
//!
//! ## Lifecycle
//!
//! Every chunk key goes through `Unloaded → Loaded → Meshed`, and leaves through
//! eviction, which drops the chunk, its render data and its uploaded mesh.
//!
//! ## Per-update pass
//!
//! 1. The viewpoint is converted to chunk coordinates by floor division.
//! 2. The render window is the cube of side `2·render_distance + 1` around that
//!    chunk, clipped to the vertical band. The load window extends it by
//!    `load_margin` chunks so window-edge chunks get their neighbors.
//! 3. Missing keys of the load window are loaded synchronously, render-window keys
//!    first and nearest first, until the per-update budget is spent. The rest is
//!    recomputed and retried on later updates.
//! 4. Keys that are both in the render window and loaded form the rendered set.
//! 5. Unmeshed chunks of the rendered set are meshed once their six neighbors are
//!    loaded; neighbors outside the vertical band never exist and count as air.
//! 6. Chunks outside the load window are evicted according to the eviction policy.
//!
//! Loading is budgeted. Meshing is not; it is only gated on neighbor completeness.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use cgmath::Point3;
use log::{debug, info, trace, warn};
use lru::LruCache;

use crate::engine_state::{
    config::{AllocatorConfig, EvictionPolicy, MAX_LOAD_RADIUS},
    rendering::{ChunkNeighbors, ChunkRenderData, MeshBuilder, MeshUploader, RetainedMeshes},
};

use super::{
    block::block_side::BlockSide,
    chunk::{BoundingBox, Chunk, ChunkKey},
    chunk_store::ChunkStore,
};

/// Summary of one update pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Chunk containing the viewpoint
    pub viewpoint_chunk: ChunkKey,
    /// Number of keys in the render window
    pub desired: usize,
    /// Chunks loaded during this update
    pub loaded: usize,
    /// Keys of the load window still missing after this update
    pub pending: usize,
    /// Chunks in the rendered set
    pub rendered: usize,
    /// Mesh builds completed during this update
    pub meshed: usize,
    /// Mesh builds postponed for missing neighbors
    pub deferred: usize,
    /// Chunks evicted during this update
    pub evicted: usize,
    /// Wall time of the update
    pub elapsed: Duration,
}

/// Result of a single mesh build attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MeshOutcome {
    Built,
    AlreadyMeshed,
    Deferred,
}

/// Owns every loaded chunk and its render data.
///
/// The allocator is the only writer of the chunk and render-data maps. Consumers
/// borrow chunks for the duration of a call.
pub struct ChunkAllocator<U: MeshUploader = RetainedMeshes> {
    config: AllocatorConfig,
    eviction: EvictionPolicy,
    store: ChunkStore,
    uploader: U,
    /// Loaded chunks
    chunks: HashMap<ChunkKey, Chunk>,
    /// Render data, one entry per loaded chunk
    render_data: HashMap<ChunkKey, ChunkRenderData>,
    /// Keys both inside the render window and loaded, as of the last update
    in_render_distance: HashSet<ChunkKey>,
    /// Loaded keys ordered by when they were last inside the load window
    least_recently_seen_chunks: LruCache<ChunkKey, ()>,
    /// Chunk of the viewpoint at the last update
    viewpoint_chunk: Option<ChunkKey>,
}

impl<U: MeshUploader> ChunkAllocator<U> {
    /// Creates an allocator with no chunks loaded.
    ///
    /// A load radius above [`MAX_LOAD_RADIUS`] is clamped.
    ///
    /// # Arguments
    /// * `config` - Window, band, budget and eviction settings
    /// * `store` - Source of chunk data
    /// * `uploader` - Receiver of built meshes
    pub fn new(config: AllocatorConfig, store: ChunkStore, uploader: U) -> Self {
        let clamped = config.clamped();
        if clamped != config {
            warn!(
                "Chunk allocator: load radius {} clamped to {}",
                config.load_radius(),
                clamped.load_radius()
            );
        }
        let config = clamped;
        let eviction = config.eviction_policy();
        debug!(
            "Chunk allocator: render distance {}, load margin {}, chunk band {}..={}, budget {}, eviction {:?}",
            config.render_distance,
            config.load_margin,
            config.min_chunk_y(),
            config.max_chunk_y(),
            config.load_budget,
            eviction
        );

        ChunkAllocator {
            config,
            eviction,
            store,
            uploader,
            chunks: HashMap::new(),
            render_data: HashMap::new(),
            in_render_distance: HashSet::new(),
            least_recently_seen_chunks: LruCache::unbounded(),
            viewpoint_chunk: None,
        }
    }

    /// The allocator settings.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// The eviction policy in effect.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction
    }

    /// The chunk store.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The mesh receiver.
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// The mesh receiver, mutably.
    pub fn uploader_mut(&mut self) -> &mut U {
        &mut self.uploader
    }

    /// Chunk containing the viewpoint at the last update.
    pub fn viewpoint_chunk(&self) -> Option<ChunkKey> {
        self.viewpoint_chunk
    }

    /// The key of the chunk containing a world-space position.
    pub fn chunk_key_at(&self, x: f32, y: f32, z: f32) -> ChunkKey {
        ChunkKey::from_world_position(x, y, z)
    }

    /// Whether `key` lies inside the vertical band. Keys outside are never loaded.
    pub fn is_in_band(&self, key: ChunkKey) -> bool {
        (self.config.min_chunk_y()..=self.config.max_chunk_y()).contains(&key.y)
    }

    /// The render window around `center`: every in-band key within
    /// `render_distance` on each axis.
    pub fn desired_window(&self, center: ChunkKey) -> Vec<ChunkKey> {
        self.window(center, self.config.render_distance)
    }

    /// The load window around `center`: the render window plus the load margin.
    pub fn load_window(&self, center: ChunkKey) -> Vec<ChunkKey> {
        self.window(center, self.config.load_radius())
    }

    /// Keys within `radius` of `center`, clipped to the vertical band and to the
    /// `i32` range; keys that can't be represented are skipped.
    fn window(&self, center: ChunkKey, radius: u32) -> Vec<ChunkKey> {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let min_y = center.y.saturating_sub(radius).max(self.config.min_chunk_y());
        let max_y = center.y.saturating_add(radius).min(self.config.max_chunk_y());

        let mut keys = Vec::new();
        for x in center.x.saturating_sub(radius)..=center.x.saturating_add(radius) {
            for y in min_y..=max_y {
                for z in center.z.saturating_sub(radius)..=center.z.saturating_add(radius) {
                    keys.push(ChunkKey::new(x, y, z));
                }
            }
        }
        keys
    }

    /// Runs an update with the configured load budget.
    pub fn update(&mut self, position: Point3<f32>) -> TickReport {
        let budget = self.config.load_budget;
        self.ensure_chunks_loaded(position.x, position.y, position.z, budget)
    }

    /// Runs one update pass for a viewpoint at world position (`x`, `y`, `z`).
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - World-space viewpoint
    /// * `budget` - Maximum number of chunks loaded by this call
    ///
    /// # Returns
    /// What the pass did. Nothing in the pass fails: unloadable work is deferred.
    pub fn ensure_chunks_loaded(&mut self, x: f32, y: f32, z: f32, budget: usize) -> TickReport {
        let start = web_time::Instant::now();
        let center = self.chunk_key_at(x, y, z);

        if self.viewpoint_chunk != Some(center) {
            info!("Viewpoint entered chunk {}", center);
            self.viewpoint_chunk = Some(center);
        }

        let render_distance = self.config.render_distance as i64;
        let desired = self.desired_window(center);
        let load_window = self.load_window(center);

        let mut missing: Vec<ChunkKey> = load_window
            .iter()
            .copied()
            .filter(|key| !self.chunks.contains_key(key))
            .collect();
        missing.sort_by_key(|key| {
            (
                key.chebyshev_distance(center) > render_distance,
                key.distance_squared(center),
                *key,
            )
        });

        let mut loaded = 0;
        for key in missing.iter().take(budget) {
            if self.load_chunk(*key) {
                loaded += 1;
            }
        }

        for key in &load_window {
            self.least_recently_seen_chunks.promote(key);
        }

        self.in_render_distance = desired
            .iter()
            .copied()
            .filter(|key| self.chunks.contains_key(key))
            .collect();

        let mut meshed = 0;
        let mut deferred = 0;
        for key in &desired {
            if !self.in_render_distance.contains(key) {
                continue;
            }
            match self.try_build_mesh(*key) {
                MeshOutcome::Built => meshed += 1,
                MeshOutcome::Deferred => deferred += 1,
                MeshOutcome::AlreadyMeshed => {}
            }
        }

        let evicted = self.evict(center);

        let report = TickReport {
            viewpoint_chunk: center,
            desired: desired.len(),
            loaded,
            pending: missing.len() - loaded,
            rendered: self.in_render_distance.len(),
            meshed,
            deferred,
            evicted,
            elapsed: start.elapsed(),
        };

        if report.loaded > 0 || report.meshed > 0 || report.evicted > 0 {
            debug!(
                "Chunk update at {}: loaded {}, pending {}, meshed {}, deferred {}, evicted {}, {} chunks loaded in {:?}",
                center,
                report.loaded,
                report.pending,
                report.meshed,
                report.deferred,
                report.evicted,
                self.chunks.len(),
                report.elapsed
            );
        }

        report
    }

    /// Loads the chunk at `key` from the store.
    ///
    /// # Returns
    /// `true` if a chunk was loaded; `false` when it was already loaded or lies
    /// outside the vertical band.
    pub fn load_chunk(&mut self, key: ChunkKey) -> bool {
        if !self.is_in_band(key) {
            trace!("Not loading chunk {} outside the vertical band", key);
            return false;
        }
        if self.chunks.contains_key(&key) {
            return false;
        }

        let chunk = self.store.load(key);
        self.chunks.insert(key, chunk);
        self.render_data.insert(key, ChunkRenderData::default());
        self.least_recently_seen_chunks.put(key, ());
        true
    }

    /// Replaces (or adds) a chunk, for example after editing its blocks.
    ///
    /// The meshes of the chunk and its six neighbors are invalidated, since faces
    /// on both sides of the shared boundaries may change. The chunk is not
    /// persisted; see [`ChunkAllocator::save_chunk`].
    ///
    /// # Returns
    /// `false` if the chunk lies outside the vertical band and was dropped.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> bool {
        let key = chunk.position;
        if !self.is_in_band(key) {
            return false;
        }

        self.chunks.insert(key, chunk);
        self.least_recently_seen_chunks.put(key, ());
        if !self.invalidate_mesh(key) {
            self.render_data.insert(key, ChunkRenderData::default());
        }
        for side in BlockSide::all() {
            self.invalidate_mesh(key.neighbor(side));
        }
        true
    }

    /// Writes the loaded chunk at `key` to the store.
    ///
    /// # Returns
    /// `Ok(false)` when no chunk is loaded at `key`.
    pub fn save_chunk(&self, key: ChunkKey) -> anyhow::Result<bool> {
        match self.chunks.get(&key) {
            Some(chunk) => self.store.save(chunk).map(|_| true),
            None => Ok(false),
        }
    }

    /// Drops the chunk at `key` with its render data and mesh.
    pub fn unload_chunk(&mut self, key: ChunkKey) -> Option<Chunk> {
        let chunk = self.chunks.remove(&key)?;
        if let Some(handle) = self
            .render_data
            .remove(&key)
            .and_then(|render_data| render_data.mesh_handle)
        {
            self.uploader.release(handle);
        }
        self.least_recently_seen_chunks.pop(&key);
        self.in_render_distance.remove(&key);
        trace!("Unloaded chunk {}", key);
        Some(chunk)
    }

    /// Resets the render data of `key`, releasing its mesh. The chunk is meshed
    /// again on the next update that finds it in render distance.
    ///
    /// # Returns
    /// `false` if the chunk isn't loaded.
    pub fn invalidate_mesh(&mut self, key: ChunkKey) -> bool {
        let Some(render_data) = self.render_data.get_mut(&key) else {
            return false;
        };
        if let Some(handle) = render_data.mesh_handle.take() {
            self.uploader.release(handle);
        }
        *render_data = ChunkRenderData::default();
        true
    }

    /// The loaded chunk at `key`.
    pub fn get_chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Every loaded chunk, in no particular order.
    pub fn get_chunks(&self) -> impl Iterator<Item = (&ChunkKey, &Chunk)> {
        self.chunks.iter()
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the chunk at `key` is loaded.
    pub fn is_loaded(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// Render data of the loaded chunk at `key`.
    pub fn get_render_data(&self, key: ChunkKey) -> Option<&ChunkRenderData> {
        self.render_data.get(&key)
    }

    /// Render data of every chunk in render distance as of the last update.
    ///
    /// Renderers skip entries that are empty and draw the others with a model
    /// translation of `key.world_origin()`.
    pub fn get_to_be_rendered_chunks(&self) -> HashMap<ChunkKey, &ChunkRenderData> {
        self.in_render_distance
            .iter()
            .filter_map(|key| self.render_data.get(key).map(|render_data| (*key, render_data)))
            .collect()
    }

    /// Keys in render distance as of the last update.
    pub fn in_render_distance(&self) -> &HashSet<ChunkKey> {
        &self.in_render_distance
    }

    /// Loaded chunks whose bounds intersect `bounds`, a linear scan. Used as the
    /// broad phase of collision queries.
    pub fn find_intersecting_chunks(&self, bounds: &BoundingBox) -> Vec<&Chunk> {
        self.chunks
            .values()
            .filter(|chunk| chunk.bounding_box().intersects(bounds))
            .collect()
    }

    /// The loaded chunk containing a world-space position.
    pub fn chunk_at_world_position(&self, position: Point3<f32>) -> Option<&Chunk> {
        self.get_chunk(self.chunk_key_at(position.x, position.y, position.z))
    }

    /// Neighbors of `key` for meshing, or `None` while an in-band neighbor is missing.
    fn neighbors_of(&self, key: ChunkKey) -> Option<ChunkNeighbors<'_>> {
        let mut neighbors: ChunkNeighbors<'_> = ChunkNeighbors::empty();
        for side in BlockSide::all() {
            let neighbor_key = key.neighbor(side);
            match self.chunks.get(&neighbor_key) {
                Some(chunk) => neighbors = neighbors.with(side, chunk),
                None if self.is_in_band(neighbor_key) => return None,
                None => {}
            }
        }
        Some(neighbors)
    }

    fn try_build_mesh(&mut self, key: ChunkKey) -> MeshOutcome {
        if self
            .render_data
            .get(&key)
            .map_or(true, |render_data| render_data.meshed)
        {
            return MeshOutcome::AlreadyMeshed;
        }

        let mesh = {
            let Some(chunk) = self.chunks.get(&key) else {
                return MeshOutcome::AlreadyMeshed;
            };
            let Some(neighbors) = self.neighbors_of(key) else {
                trace!("Deferring mesh of chunk {}: neighbors missing", key);
                return MeshOutcome::Deferred;
            };
            MeshBuilder::build(chunk, &neighbors)
        };

        let faces = mesh.face_count();
        let is_empty = mesh.is_empty();
        let mesh_handle = if is_empty {
            None
        } else {
            Some(self.uploader.upload(key, mesh))
        };

        if let Some(render_data) = self.render_data.get_mut(&key) {
            if let Some(previous) = render_data.mesh_handle.take() {
                self.uploader.release(previous);
            }
            *render_data = ChunkRenderData {
                mesh_handle,
                is_empty,
                meshed: true,
            };
        }

        trace!("Meshed chunk {} with {} faces", key, faces);
        MeshOutcome::Built
    }

    /// Applies the eviction policy around `center`.
    fn evict(&mut self, center: ChunkKey) -> usize {
        let load_radius = self.config.load_radius() as i64;
        let outside_window = |key: &ChunkKey| key.chebyshev_distance(center) > load_radius;

        match self.eviction {
            EvictionPolicy::Disabled => 0,
            EvictionPolicy::OutsideWindow => {
                let keys: Vec<ChunkKey> =
                    self.chunks.keys().copied().filter(|key| outside_window(key)).collect();
                for key in &keys {
                    self.unload_chunk(*key);
                }
                keys.len()
            }
            EvictionPolicy::Bounded { max_loaded_chunks } => {
                let mut evicted = 0;
                while self.chunks.len() > max_loaded_chunks {
                    let Some(key) = self
                        .least_recently_seen_chunks
                        .peek_lru()
                        .map(|(key, _)| *key)
                        .filter(|key| outside_window(key))
                    else {
                        break;
                    };
                    self.unload_chunk(key);
                    evicted += 1;
                }
                evicted
            }
        }
    }
}
