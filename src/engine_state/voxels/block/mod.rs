//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling and the texture table
//! consulted by the mesher.

use phf::phf_map;

use block_side::BlockSide;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is used for efficient storage and serialization of block data.
pub type BlockTypeSize = u8;

/// Texture indices used for unknown block types (the air entry).
pub const DEFAULT_TEXTURE_INDICES: [u32; 6] = [0, 0, 0, 0, 0, 0];

/// Maps each block type id to its texture index for each face.
///
/// The inner array is ordered like `BlockSide`:
/// [Front, Back, Left, Right, Top, Bottom]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: phf::Map<u8, [u32; 6]> = phf_map! {
    0u8 => [0, 0, 0, 0, 0, 0], // AIR
    1u8 => [2, 2, 2, 2, 2, 2], // DIRT
    2u8 => [1, 1, 1, 1, 0, 2], // GRASS (top: 0, bottom: dirt, sides: 1)
    3u8 => [4, 4, 4, 4, 4, 4], // WOOD
    4u8 => [3, 3, 3, 3, 3, 3], // STONE
};

/// Gets the texture indices for all faces of a block given its type as an integer.
///
/// Unknown block types map to [`DEFAULT_TEXTURE_INDICES`] instead of failing.
pub fn get_texture_indices_from_int(btype_int: BlockTypeSize) -> [u32; 6] {
    BLOCK_TYPE_TO_TEXTURE_INDICES
        .get(&btype_int)
        .copied()
        .unwrap_or(DEFAULT_TEXTURE_INDICES)
}

/// Gets the texture index of a single face of a block type.
pub fn get_face_texture_index(btype_int: BlockTypeSize, side: BlockSide) -> u32 {
    get_texture_indices_from_int(btype_int)[side as usize]
}
