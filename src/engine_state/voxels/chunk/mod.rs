//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data.
//!
//! ## Storage
//!
//! Each chunk keeps two dense arrays in the same linear order,
//! `index = x + y·D + z·D²` with `D = CHUNK_DIMENSION`:
//! - `block_types`: one `BlockTypeSize` per voxel
//! - `block_visibility`: a bit vector where 1 = solid/occluding and 0 = air
//!
//! Visibility is decoupled from the block type, so a voxel can keep its type while
//! being carved out (caves) or be an "invisible solid".
//!
//! ### Performance Characteristics
//! - **Solidity Check**: O(1) - Just check the bit in `block_visibility`
//! - **Block Lookup**: O(1) - Direct index into `block_types`
//! - **Memory Usage**: 1 byte + 1 bit per voxel

use anyhow::ensure;
use bitvec::prelude::*;
use cgmath::Point3;
use once_cell::sync::Lazy;

use chunk_iteration::VisibleBlockIterator;

use super::block::{block_type::BlockType, BlockTypeSize};

pub mod bounding_box;
pub mod chunk_creation;
pub mod chunk_iteration;
pub mod chunk_key;
pub mod collision;

pub use bounding_box::BoundingBox;
pub use chunk_key::ChunkKey;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: usize = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// The shared all-air chunk substituted for neighbors that can never be loaded.
///
/// It is immutable; nothing can write through it into another chunk.
pub static EMPTY_CHUNK: Lazy<Chunk> = Lazy::new(|| Chunk::empty(ChunkKey::new(0, 0, 0)));

/// Converts chunk-relative coordinates into an index of the chunk arrays.
#[inline]
pub fn linear_index(x: usize, y: usize, z: usize) -> usize {
    x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE
}

/// Inverse of [`linear_index`].
#[inline]
pub fn delinearize(index: usize) -> Point3<usize> {
    Point3::new(
        index % CHUNK_DIMENSION,
        (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        index / CHUNK_PLANE_SIZE,
    )
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data. The position and the bounding
/// box are fixed for the chunk's lifetime.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkKey,

    /// Block type id per voxel, `CHUNK_SIZE` entries.
    block_types: Box<[BlockTypeSize]>,

    /// Solid (1) or air (0) per voxel, `CHUNK_SIZE` bits.
    block_visibility: BitVec,

    /// World-space bounds derived from `position`.
    bounding_box: BoundingBox,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are invisible air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn empty(position: ChunkKey) -> Self {
        Chunk {
            position,
            block_types: vec![BlockType::AIR.as_int(); CHUNK_SIZE].into_boxed_slice(),
            block_visibility: bitvec![0; CHUNK_SIZE],
            bounding_box: BoundingBox::for_chunk(position),
        }
    }

    /// Creates a new chunk filled with visible blocks of one type.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `block_type` - The type every voxel gets
    pub fn solid(position: ChunkKey, block_type: BlockType) -> Self {
        Chunk {
            position,
            block_types: vec![block_type.as_int(); CHUNK_SIZE].into_boxed_slice(),
            block_visibility: bitvec![1; CHUNK_SIZE],
            bounding_box: BoundingBox::for_chunk(position),
        }
    }

    /// Restores a chunk from its raw arrays, as produced by [`Chunk::to_raw`].
    ///
    /// # Errors
    /// Fails when either array doesn't hold exactly `CHUNK_SIZE` entries or a
    /// visibility entry is neither 0 nor 1. Accepting such data would lead to
    /// out-of-bounds indexing further down the pipeline.
    pub fn from_raw(
        position: ChunkKey,
        block_types: Vec<BlockTypeSize>,
        block_visibility: Vec<u8>,
    ) -> anyhow::Result<Self> {
        ensure!(
            block_types.len() == CHUNK_SIZE,
            "chunk {position} has {} block types, expected {CHUNK_SIZE}",
            block_types.len()
        );
        ensure!(
            block_visibility.len() == CHUNK_SIZE,
            "chunk {position} has {} visibility flags, expected {CHUNK_SIZE}",
            block_visibility.len()
        );
        ensure!(
            block_visibility.iter().all(|flag| *flag <= 1),
            "chunk {position} has visibility flags other than 0 and 1"
        );

        Ok(Chunk {
            position,
            block_types: block_types.into_boxed_slice(),
            block_visibility: block_visibility.iter().map(|flag| *flag == 1).collect(),
            bounding_box: BoundingBox::for_chunk(position),
        })
    }

    /// The raw `(block_types, block_visibility)` pair in linear order.
    pub fn to_raw(&self) -> (Vec<BlockTypeSize>, Vec<u8>) {
        (
            self.block_types.to_vec(),
            self.block_visibility.iter().map(|bit| *bit as u8).collect(),
        )
    }

    /// World-space bounds of this chunk.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Block type ids in linear order.
    pub fn block_types(&self) -> &[BlockTypeSize] {
        &self.block_types
    }

    /// Visibility bits in linear order.
    pub fn block_visibility(&self) -> &BitSlice {
        &self.block_visibility
    }

    /// Gets the type id of the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn get_block_type(&self, x: usize, y: usize, z: usize) -> BlockTypeSize {
        self.block_types[linear_index(x, y, z)]
    }

    /// Checks if the block at the specified chunk-relative coordinates is solid.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn is_block_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.block_visibility[linear_index(x, y, z)]
    }

    /// Like [`Chunk::is_block_solid`], but coordinates outside the chunk read as air.
    pub fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
        let range = 0..CHUNK_DIMENSION as i32;
        if !range.contains(&x) || !range.contains(&y) || !range.contains(&z) {
            return false;
        }
        self.is_block_solid(x as usize, y as usize, z as usize)
    }

    /// Sets the type of a block without touching its visibility.
    pub fn set_block_type(&mut self, x: usize, y: usize, z: usize, block_type: BlockTypeSize) {
        self.block_types[linear_index(x, y, z)] = block_type;
    }

    /// Sets whether a block is solid without touching its type.
    pub fn set_block_visibility(&mut self, x: usize, y: usize, z: usize, solid: bool) {
        self.block_visibility.set(linear_index(x, y, z), solid);
    }

    /// Places a block: stores its type and marks it solid unless it is air.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.set_block_type(x, y, z, block_type.as_int());
        self.set_block_visibility(x, y, z, block_type != BlockType::AIR);
    }

    /// Iterates over every solid voxel, yielding its position and type.
    pub fn visible_blocks(&self) -> VisibleBlockIterator<'_> {
        VisibleBlockIterator::new(self)
    }

    /// Number of solid voxels.
    pub fn visible_block_count(&self) -> usize {
        self.block_visibility.count_ones()
    }
}
