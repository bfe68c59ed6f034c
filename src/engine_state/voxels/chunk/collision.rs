//! # Collision Module
//!
//! Coarse axis-aligned collision of a box against the solid voxels of one chunk.
//!
//! All coordinates are chunk-local block units. Each axis is resolved on its own
//! from the original position: the box is stretched along that axis to cover both
//! its start and end position, and the voxels ahead of the box in the direction of
//! travel are checked. On a hit the axis is snapped to the face of the nearest
//! blocking voxel, otherwise the full velocity is applied.
//!
//! Only voxels inside `0..CHUNK_DIMENSION` are considered; a caller that needs
//! collisions across chunk borders selects the chunks first (see
//! `ChunkAllocator::find_intersecting_chunks`) and translates the box into each
//! chunk's local space.

use cgmath::{Point3, Vector3};

use super::{Chunk, CHUNK_DIMENSION};

impl Chunk {
    /// Moves a box by `velocity`, stopping it at solid voxels of this chunk.
    ///
    /// # Arguments
    /// * `position` - Minimum corner of the box, chunk-local
    /// * `size` - Extent of the box on each axis
    /// * `velocity` - Requested displacement
    ///
    /// # Returns
    /// The adjusted minimum corner. Axes with zero velocity are left untouched.
    pub fn collide(
        &self,
        position: Point3<f32>,
        size: Vector3<f32>,
        velocity: Vector3<f32>,
    ) -> Point3<f32> {
        let mut adjusted = position;
        for axis in 0..3 {
            adjusted[axis] = self.resolve_axis(position, size, velocity, axis);
        }
        adjusted
    }

    fn resolve_axis(
        &self,
        position: Point3<f32>,
        size: Vector3<f32>,
        velocity: Vector3<f32>,
        axis: usize,
    ) -> f32 {
        let start = position[axis];
        let delta = velocity[axis];
        let moved = start + delta;
        if delta == 0.0 {
            return moved;
        }

        let last = CHUNK_DIMENSION as i32 - 1;
        let mut lower = [0i32; 3];
        let mut upper = [0i32; 3];
        for a in 0..3 {
            let (min, max) = if a == axis {
                (start.min(moved), (start + size[a]).max(moved + size[a]))
            } else {
                (position[a], position[a] + size[a])
            };
            lower[a] = (min.floor() as i32).max(0);
            upper[a] = (max.ceil() as i32 - 1).min(last);
        }

        // only voxels ahead of the box can stop it
        if delta > 0.0 {
            lower[axis] = lower[axis].max((start + size[axis]).floor() as i32);
        } else {
            upper[axis] = upper[axis].min(start.ceil() as i32 - 1);
        }

        let mut blocking: Option<i32> = None;
        for z in lower[2]..=upper[2] {
            for y in lower[1]..=upper[1] {
                for x in lower[0]..=upper[0] {
                    if !self.is_solid_at(x, y, z) {
                        continue;
                    }
                    let cell = [x, y, z][axis];
                    blocking = Some(match blocking {
                        None => cell,
                        Some(current) if delta > 0.0 => current.min(cell),
                        Some(current) => current.max(cell),
                    });
                }
            }
        }

        match blocking {
            None => moved,
            Some(cell) if delta > 0.0 => moved.min(cell as f32 - size[axis]),
            Some(cell) => moved.max(cell as f32 + 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkKey};

    fn chunk_with(blocks: &[(usize, usize, usize)]) -> Chunk {
        let mut chunk = Chunk::empty(ChunkKey::new(0, 0, 0));
        for &(x, y, z) in blocks {
            chunk.set_block(x, y, z, BlockType::STONE);
        }
        chunk
    }

    #[test]
    fn snaps_to_block_boundary_on_hit() {
        let chunk = chunk_with(&[(5, 0, 0)]);
        let adjusted = chunk.collide(
            Point3::new(4.5, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        );

        assert!(adjusted.x + 1.0 <= 5.0);
        assert_eq!(adjusted.y, 0.0);
        assert_eq!(adjusted.z, 0.0);
    }

    #[test]
    fn unaffected_axes_move_by_full_velocity() {
        let chunk = chunk_with(&[(5, 0, 0)]);
        let adjusted = chunk.collide(
            Point3::new(4.5, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 0.5, 2.0),
        );

        assert!(adjusted.x <= 5.0);
        assert_eq!(adjusted.y, 0.5);
        assert_eq!(adjusted.z, 2.0);
    }

    #[test]
    fn free_space_applies_velocity() {
        let chunk = chunk_with(&[]);
        let adjusted = chunk.collide(
            Point3::new(2.0, 3.0, 4.0),
            Vector3::new(0.5, 1.8, 0.5),
            Vector3::new(-1.5, 0.25, 3.0),
        );

        assert_eq!(adjusted, Point3::new(0.5, 3.25, 7.0));
    }

    #[test]
    fn falling_body_lands_on_ground() {
        let chunk = chunk_with(&[(3, 2, 3)]);
        let adjusted = chunk.collide(
            Point3::new(3.2, 4.0, 3.2),
            Vector3::new(0.6, 1.8, 0.6),
            Vector3::new(0.0, -3.0, 0.0),
        );

        assert_eq!(adjusted.y, 3.0);
    }

    #[test]
    fn touching_block_keeps_position() {
        let chunk = chunk_with(&[(5, 0, 0)]);
        let adjusted = chunk.collide(
            Point3::new(4.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.75, 0.0, 0.0),
        );

        assert_eq!(adjusted.x, 4.0);
    }

    #[test]
    fn blocks_behind_the_body_are_ignored() {
        let chunk = chunk_with(&[(2, 0, 0)]);
        let adjusted = chunk.collide(
            Point3::new(4.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        );

        assert_eq!(adjusted.x, 5.0);
    }

    #[test]
    fn voxels_outside_the_chunk_are_not_considered() {
        let chunk = Chunk::solid(ChunkKey::new(0, 0, 0), BlockType::DIRT);
        let adjusted = chunk.collide(
            Point3::new(17.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        );

        assert_eq!(adjusted.x, 18.0);
    }
}
