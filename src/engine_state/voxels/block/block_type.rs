//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, conversion and
//! the palettes used by terrain generation.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive allows conversion from the compact integer form
/// stored in chunks and chunk files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    AIR,

    /// A basic dirt block, found just below the surface.
    DIRT,

    /// A grass block with different textures on top and sides.
    GRASS,

    /// A wooden block with a bark texture on all sides.
    WOOD,

    /// Plain stone, the bulk of deep terrain.
    STONE,
}

/// Depth below the terrain surface (in blocks) that is still covered with grass.
pub const GRASS_DEPTH: f32 = 1.0;
/// Depth below the terrain surface (in blocks) down to which dirt is placed.
pub const DIRT_DEPTH: f32 = 4.0;

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `None` when the value doesn't correspond to a known block type.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(btype)
    }

    /// Generates a random block type in the small range the random palette draws from
    /// (DIRT, GRASS or WOOD).
    pub fn get_random_type() -> Self {
        Self::get_block_type_from_int(fastrand::u8(1..4)).unwrap_or(BlockType::DIRT)
    }

    /// Picks the block type of a solid voxel from its depth below the terrain surface.
    ///
    /// # Arguments
    /// * `depth` - Surface height minus the voxel's world height (always positive for solid voxels)
    pub fn for_depth(depth: f32) -> Self {
        if depth <= GRASS_DEPTH {
            BlockType::GRASS
        } else if depth <= DIRT_DEPTH {
            BlockType::DIRT
        } else {
            BlockType::STONE
        }
    }

    /// The compact integer form of this block type.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}
