//! Rendering boundary of the voxel engine.
//!
//! This module contains everything between voxel data and a graphics backend:
//! the vertex format, the mesh builder, the per-chunk render data kept by the
//! chunk allocator and the [`MeshUploader`] contract a backend implements to
//! receive meshes.
//!
//! The engine never draws anything itself. Each frame a renderer asks the
//! allocator for the chunks in render distance, skips the ones whose render data
//! is empty and draws the mesh behind each handle with the chunk's world origin
//! as model translation.

use std::collections::HashMap;

use log::trace;

use crate::engine_state::voxels::chunk::ChunkKey;

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkNeighbors, Face, Mesh, MeshBuilder};
pub use vertex::{Vertex, VERTEX_ATTRIBUTES};

/// Opaque reference to geometry owned by a [`MeshUploader`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Render state of one loaded chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkRenderData {
    /// Handle of the uploaded mesh; `None` until a non-empty mesh was built
    pub mesh_handle: Option<MeshHandle>,
    /// Whether the last build emitted no faces, or no build happened yet
    pub is_empty: bool,
    /// Whether a mesh build has completed for the current chunk data
    pub meshed: bool,
}

impl Default for ChunkRenderData {
    fn default() -> Self {
        ChunkRenderData {
            mesh_handle: None,
            is_empty: true,
            meshed: false,
        }
    }
}

impl ChunkRenderData {
    /// Whether a renderer should issue a draw for this chunk.
    pub fn is_drawable(&self) -> bool {
        !self.is_empty && self.mesh_handle.is_some()
    }
}

/// Receives chunk meshes on behalf of a graphics backend.
///
/// Uploads are only requested for non-empty meshes. A handle is released exactly
/// once, when its chunk is evicted or its mesh invalidated.
pub trait MeshUploader {
    /// Takes ownership of `mesh` and returns the handle it will be drawn by.
    fn upload(&mut self, key: ChunkKey, mesh: Mesh) -> MeshHandle;

    /// Frees the geometry behind `handle`.
    fn release(&mut self, handle: MeshHandle);
}

/// A [`MeshUploader`] that keeps meshes in memory.
///
/// Used headless and in tests, and by backends that upload lazily.
#[derive(Default)]
pub struct RetainedMeshes {
    meshes: HashMap<MeshHandle, (ChunkKey, Mesh)>,
    next: u64,
}

impl RetainedMeshes {
    /// Creates an empty store.
    pub fn new() -> Self {
        RetainedMeshes::default()
    }

    /// The mesh behind `handle`.
    pub fn get(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(&handle).map(|(_, mesh)| mesh)
    }

    /// The chunk a mesh was uploaded for.
    pub fn key_of(&self, handle: MeshHandle) -> Option<ChunkKey> {
        self.meshes.get(&handle).map(|(key, _)| *key)
    }

    /// Number of live meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh is live.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total number of faces over all live meshes.
    pub fn total_faces(&self) -> usize {
        self.meshes.values().map(|(_, mesh)| mesh.face_count()).sum()
    }
}

impl MeshUploader for RetainedMeshes {
    fn upload(&mut self, key: ChunkKey, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next);
        self.next += 1;
        trace!("Retaining mesh {:?} for chunk {} ({} faces)", handle, key, mesh.face_count());
        self.meshes.insert(handle, (key, mesh));
        handle
    }

    fn release(&mut self, handle: MeshHandle) {
        self.meshes.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

    #[test]
    fn retained_meshes_hand_out_unique_handles() {
        let mut meshes = RetainedMeshes::new();
        let mut mesh = Mesh::new();
        mesh.add_face(&Face::new(0, 0, 0, BlockType::DIRT.as_int(), BlockSide::TOP));

        let first = meshes.upload(ChunkKey::new(0, 0, 0), mesh.clone());
        let second = meshes.upload(ChunkKey::new(1, 0, 0), mesh);
        assert_ne!(first, second);
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes.total_faces(), 2);
        assert_eq!(meshes.key_of(second), Some(ChunkKey::new(1, 0, 0)));

        meshes.release(first);
        assert!(meshes.get(first).is_none());
        assert!(meshes.get(second).is_some());
    }

    #[test]
    fn render_data_starts_empty_and_unmeshed() {
        let render_data = ChunkRenderData::default();
        assert!(render_data.is_empty);
        assert!(!render_data.meshed);
        assert!(!render_data.is_drawable());
    }
}
