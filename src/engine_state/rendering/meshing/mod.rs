//! Mesh generation for voxel chunks.
//!
//! This module converts a chunk's block and visibility grid into a renderable
//! [`Mesh`], emitting only the faces that border air.
//!
//! # Algorithm
//! For every solid voxel, each of the six face-adjacent voxels is looked up: in the
//! chunk itself, or across the boundary in the neighbor chunk on that side when
//! the voxel sits on the chunk's outer layer. A face is emitted only when the
//! adjacent voxel is not solid, so interior faces are culled and a voxel yields at
//! most six quads.
//!
//! Air voxels are skipped as a whole by iterating the set bits of the visibility
//! vector.
//!
//! # Neighbors
//! A build needs all six face-adjacent chunks. Callers that can't supply a chunk
//! which will never exist pass [`EMPTY_CHUNK`] in its place; callers missing a chunk
//! that may still arrive should defer the build instead of treating it as air.

use cgmath::Point3;

mod mesh;

pub use mesh::*;

use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    chunk::{Chunk, CHUNK_DIMENSION, EMPTY_CHUNK},
};

/// The six face-adjacent chunks of the chunk being meshed, indexed by `BlockSide`.
#[derive(Clone, Copy)]
pub struct ChunkNeighbors<'a> {
    sides: [&'a Chunk; 6],
}

impl<'a> ChunkNeighbors<'a> {
    /// Neighbors in `BlockSide` order: [FRONT, BACK, LEFT, RIGHT, TOP, BOTTOM].
    pub fn new(sides: [&'a Chunk; 6]) -> Self {
        ChunkNeighbors { sides }
    }

    /// Replaces the neighbor on `side`.
    pub fn with(mut self, side: BlockSide, chunk: &'a Chunk) -> Self {
        self.sides[side as usize] = chunk;
        self
    }

    /// The neighbor on `side`.
    pub fn get(&self, side: BlockSide) -> &'a Chunk {
        self.sides[side as usize]
    }
}

impl ChunkNeighbors<'static> {
    /// Air on every side.
    pub fn empty() -> Self {
        let empty: &'static Chunk = &EMPTY_CHUNK;
        ChunkNeighbors { sides: [empty; 6] }
    }
}

/// Stateless builder of chunk meshes.
pub struct MeshBuilder;

impl MeshBuilder {
    /// Builds the mesh of `chunk`.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to mesh
    /// * `neighbors` - Its six face-adjacent chunks
    ///
    /// # Returns
    /// The visible faces of `chunk`, empty when the chunk is all air or fully occluded.
    pub fn build(chunk: &Chunk, neighbors: &ChunkNeighbors) -> Mesh {
        let mut mesh = Mesh::new();

        for (position, block_type) in chunk.visible_blocks() {
            for side in BlockSide::all() {
                if Self::is_adjacent_solid(chunk, neighbors, position, side) {
                    continue;
                }
                mesh.add_face(&Face::new(
                    position.x,
                    position.y,
                    position.z,
                    block_type,
                    side,
                ));
            }
        }

        mesh
    }

    /// Whether the voxel across `side` of `position` is solid, crossing into the
    /// neighbor chunk at the boundary.
    fn is_adjacent_solid(
        chunk: &Chunk,
        neighbors: &ChunkNeighbors,
        position: Point3<usize>,
        side: BlockSide,
    ) -> bool {
        let offset = side.offset();
        let dimension = CHUNK_DIMENSION as i32;
        let x = position.x as i32 + offset.x;
        let y = position.y as i32 + offset.y;
        let z = position.z as i32 + offset.z;

        let inside = |coordinate: i32| (0..dimension).contains(&coordinate);
        if inside(x) && inside(y) && inside(z) {
            return chunk.is_solid_at(x, y, z);
        }

        neighbors.get(side).is_solid_at(
            x.rem_euclid(dimension),
            y.rem_euclid(dimension),
            z.rem_euclid(dimension),
        )
    }
}
