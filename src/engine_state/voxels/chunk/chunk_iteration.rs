//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid voxels of a chunk.
//!
//! The iterator walks the set bits of the chunk's visibility bit vector, so air
//! is skipped a machine word at a time instead of voxel by voxel. This is the
//! coarse skip the mesher relies on: no geometry work is ever done for air.

use bitvec::slice::IterOnes;
use cgmath::Point3;

use crate::engine_state::voxels::block::BlockTypeSize;

use super::{delinearize, Chunk};

/// An iterator over all solid voxels in a chunk, in linear order.
///
/// Yields the chunk-relative position and the block type of each solid voxel.
pub struct VisibleBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Remaining set bits of the visibility vector
    ones: IterOnes<'a, usize, bitvec::order::Lsb0>,
}

impl<'a> VisibleBlockIterator<'a> {
    /// Creates a new `VisibleBlockIterator` positioned before the first solid voxel.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        VisibleBlockIterator {
            chunk_ref,
            ones: chunk_ref.block_visibility().iter_ones(),
        }
    }
}

impl<'a> Iterator for VisibleBlockIterator<'a> {
    type Item = (Point3<usize>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        Some((delinearize(index), self.chunk_ref.block_types()[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkKey};

    #[test]
    fn yields_only_solid_voxels_in_linear_order() {
        let mut chunk = Chunk::empty(ChunkKey::new(0, 0, 0));
        chunk.set_block(5, 0, 0, BlockType::DIRT);
        chunk.set_block(0, 1, 0, BlockType::GRASS);
        chunk.set_block(0, 0, 2, BlockType::STONE);

        let blocks: Vec<_> = chunk.visible_blocks().collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(5, 0, 0), BlockType::DIRT.as_int()),
                (Point3::new(0, 1, 0), BlockType::GRASS.as_int()),
                (Point3::new(0, 0, 2), BlockType::STONE.as_int()),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::empty(ChunkKey::new(0, 0, 0));
        assert_eq!(chunk.visible_blocks().count(), 0);
    }
}
