//! Structured chunk addresses.

use std::fmt;

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::CHUNK_DIMENSION;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Position of a chunk in chunk space (world units = chunk coordinate × `CHUNK_DIMENSION`).
///
/// Used as the map key for chunks and their render data. Hashing three integers
/// avoids formatting and parsing a string on every lookup in the streaming loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Chunk x coordinate
    pub x: i32,
    /// Chunk y coordinate
    pub y: i32,
    /// Chunk z coordinate
    pub z: i32,
}

impl ChunkKey {
    /// Creates a key from chunk coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkKey { x, y, z }
    }

    /// The key of the chunk containing a world-space position (floor division on each axis).
    ///
    /// Positions beyond the representable chunk range saturate to `i32::MIN`/`i32::MAX`.
    pub fn from_world_position(x: f32, y: f32, z: f32) -> Self {
        let dimension = CHUNK_DIMENSION as f32;
        ChunkKey {
            x: (x / dimension).floor() as i32,
            y: (y / dimension).floor() as i32,
            z: (z / dimension).floor() as i32,
        }
    }

    /// The face-adjacent key across `side` (±1 on exactly one axis).
    pub fn neighbor(self, side: BlockSide) -> Self {
        self.offset(side.offset())
    }

    /// This key shifted by `delta` chunks, saturating at the ends of the `i32` range.
    pub fn offset(self, delta: Vector3<i32>) -> Self {
        ChunkKey {
            x: self.x.saturating_add(delta.x),
            y: self.y.saturating_add(delta.y),
            z: self.z.saturating_add(delta.z),
        }
    }

    /// World-space position of the chunk's minimum corner. Renderers use this as
    /// the model translation of the chunk mesh.
    pub fn world_origin(self) -> Point3<f32> {
        let dimension = CHUNK_DIMENSION as f32;
        Point3::new(
            self.x as f32 * dimension,
            self.y as f32 * dimension,
            self.z as f32 * dimension,
        )
    }

    /// Largest per-axis distance to `other`, in chunks.
    pub fn chebyshev_distance(self, other: ChunkKey) -> i64 {
        let [dx, dy, dz] = self.axis_distances(other);
        dx.max(dy).max(dz)
    }

    /// Squared euclidean distance to `other`, in chunks.
    pub fn distance_squared(self, other: ChunkKey) -> i128 {
        self.axis_distances(other)
            .iter()
            .map(|distance| (*distance as i128) * (*distance as i128))
            .sum()
    }

    /// The world block coordinates of the chunk's minimum corner. Wider than `i32`
    /// so keys near the ends of the range still map to exact block positions.
    pub fn world_block_origin(self) -> [i64; 3] {
        let dimension = CHUNK_DIMENSION as i64;
        [
            self.x as i64 * dimension,
            self.y as i64 * dimension,
            self.z as i64 * dimension,
        ]
    }

    fn axis_distances(self, other: ChunkKey) -> [i64; 3] {
        [
            (self.x as i64 - other.x as i64).abs(),
            (self.y as i64 - other.y as i64).abs(),
            (self.z as i64 - other.z as i64).abs(),
        ]
    }

    /// File name stem used by the chunk store, `{x}_{y}_{z}`.
    pub fn file_stem(self) -> String {
        format!("{}_{}_{}", self.x, self.y, self.z)
    }
}

impl From<Point3<i32>> for ChunkKey {
    fn from(position: Point3<i32>) -> Self {
        ChunkKey::new(position.x, position.y, position.z)
    }
}

impl From<ChunkKey> for Point3<i32> {
    fn from(key: ChunkKey) -> Self {
        Point3::new(key.x, key.y, key.z)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_positions_floor_towards_negative_infinity() {
        assert_eq!(ChunkKey::from_world_position(0.0, 15.9, 16.0), ChunkKey::new(0, 0, 1));
        assert_eq!(ChunkKey::from_world_position(-0.1, -16.0, -16.1), ChunkKey::new(-1, -1, -2));
    }

    #[test]
    fn neighbors_differ_on_one_axis() {
        let key = ChunkKey::new(3, -2, 7);
        for side in BlockSide::all() {
            let neighbor = key.neighbor(side);
            assert_eq!(key.chebyshev_distance(neighbor), 1);
            assert_eq!(key.distance_squared(neighbor), 1);
            assert_eq!(neighbor.neighbor(side.opposite()), key);
        }
    }

    #[test]
    fn display_and_file_stem() {
        let key = ChunkKey::new(-1, 0, 12);
        assert_eq!(key.to_string(), "-1:0:12");
        assert_eq!(key.file_stem(), "-1_0_12");
    }

    #[test]
    fn far_positions_saturate_without_overflow() {
        let far = ChunkKey::from_world_position(f32::MAX, -f32::MAX, 1.0e10);
        assert_eq!(far, ChunkKey::new(i32::MAX, i32::MIN, 625_000_000));

        assert_eq!(far.neighbor(BlockSide::RIGHT), far);
        assert_eq!(far.neighbor(BlockSide::BOTTOM), far);
        assert_eq!(far.chebyshev_distance(ChunkKey::new(i32::MIN, 0, 0)), u32::MAX as i64);
        assert_eq!(
            far.distance_squared(ChunkKey::new(0, 0, 625_000_000)),
            (i32::MAX as i128).pow(2) + (i32::MIN as i128).pow(2)
        );
        assert_eq!(far.world_block_origin()[0], i32::MAX as i64 * 16);
    }

    #[test]
    fn world_origin_scales_by_chunk_dimension() {
        assert_eq!(ChunkKey::new(1, -2, 0).world_origin(), Point3::new(16.0, -32.0, 0.0));
    }
}
