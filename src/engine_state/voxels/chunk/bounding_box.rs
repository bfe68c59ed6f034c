//! Axis-aligned bounding boxes for chunks and spatial queries.

use cgmath::{Point3, Vector3};

use super::{chunk_key::ChunkKey, CHUNK_DIMENSION};

/// An axis-aligned box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f32>,
    /// Maximum corner
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Creates a box from two corners, ordering each axis.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        BoundingBox {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a box from its minimum corner and size.
    pub fn from_position_and_size(position: Point3<f32>, size: Vector3<f32>) -> Self {
        Self::new(position, position + size)
    }

    /// The world-space volume covered by the chunk at `key`.
    pub fn for_chunk(key: ChunkKey) -> Self {
        let min = key.world_origin();
        let dimension = CHUNK_DIMENSION as f32;
        BoundingBox {
            min,
            max: min + Vector3::new(dimension, dimension, dimension),
        }
    }

    /// Whether the two boxes overlap. Touching faces count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Whether `point` lies inside the box (inclusive).
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Half of the box size on each axis.
    pub fn half_extent(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_boxes_tile_space() {
        let a = BoundingBox::for_chunk(ChunkKey::new(0, 0, 0));
        let b = BoundingBox::for_chunk(ChunkKey::new(1, 0, 0));
        let far = BoundingBox::for_chunk(ChunkKey::new(3, 0, 0));

        assert_eq!(a.max.x, b.min.x);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&far));
        assert_eq!(a.center(), Point3::new(8.0, 8.0, 8.0));
        assert_eq!(a.half_extent(), Vector3::new(8.0, 8.0, 8.0));
    }

    #[test]
    fn new_orders_corners() {
        let bounds = BoundingBox::new(Point3::new(2.0, -1.0, 5.0), Point3::new(-2.0, 1.0, 3.0));
        assert_eq!(bounds.min, Point3::new(-2.0, -1.0, 3.0));
        assert!(bounds.contains_point(Point3::new(0.0, 0.0, 4.0)));
        assert!(!bounds.contains_point(Point3::new(0.0, 0.0, 6.0)));
    }
}
