//! Vertex data structures for chunk meshes.
//!
//! This module defines the vertex format emitted by the mesh builder. The layout is
//! `#[repr(C)]` and `Pod`, so a renderer can copy a vertex slice into a GPU buffer
//! as raw bytes.

use cgmath::{Point3, Vector3};

/// A vertex of a chunk mesh.
///
/// Positions are chunk-local; the renderer places the mesh with the chunk's
/// world origin as model translation.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Index: u32 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk's minimum corner
    pub position: [f32; 3],
    /// Outward normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Index of the texture in the texture array
    pub texture_index: u32,
}

/// Shader attribute layout of [`Vertex`]: (location, byte offset, component count).
pub const VERTEX_ATTRIBUTES: [(u32, usize, usize); 4] = [
    (0, 0, 3),
    (1, 12, 3),
    (2, 24, 2),
    (3, 32, 1),
];

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local position
    /// * `normal` - Outward face normal
    /// * `tex_coords` - UV coordinates
    /// * `texture_index` - Index of the texture in the texture array
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        tex_coords: [f32; 2],
        texture_index: u32,
    ) -> Self {
        Vertex {
            position: position.into(),
            normal: normal.into(),
            tex_coords,
            texture_index,
        }
    }

    /// Size of one vertex in bytes, the stride of a vertex buffer.
    pub const fn stride() -> usize {
        std::mem::size_of::<Vertex>()
    }
}
