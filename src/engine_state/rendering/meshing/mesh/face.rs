use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockTypeSize};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-left,
/// upper-right) as seen from outside the block, so `lr - ll` crossed with `ul - ll`
/// points along the outward normal of `block_side`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<usize>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<usize>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<usize>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<usize>,
    /// The block type as an integer, used for texture mapping
    pub block_type_int: BlockTypeSize,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in chunk space
    /// * `block_type_int` - The type of the block, used for texture mapping
    /// * `block_side` - Which side of the block this face represents
    pub fn new(
        i: usize,
        j: usize,
        k: usize,
        block_type_int: BlockTypeSize,
        block_side: BlockSide,
    ) -> Self {
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::RIGHT => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::LEFT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_type_int,
            block_side,
        }
    }

    /// The corners in vertex order: lower-left, lower-right, upper-left, upper-right.
    pub fn corners(&self) -> [Point3<usize>; 4] {
        [self.ll, self.lr, self.ul, self.ur]
    }
}
