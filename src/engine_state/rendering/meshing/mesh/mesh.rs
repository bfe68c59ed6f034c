//! Mesh data structures for chunk rendering.
//!
//! A [`Mesh`] is a flat vertex stream plus a triangle index list, four vertices
//! and six indices per quad, ready to be copied into GPU buffers.

use crate::engine_state::{
    rendering::Vertex,
    voxels::block::{block_side::BlockSide, get_face_texture_index},
};

use super::face::Face;

/// UV coordinates of the four face corners, in [`Face::corners`] order.
const FACE_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Geometry of one chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    /// The vertex data, four per face
    pub vertices: Vec<Vertex>,
    /// The index data, six per face
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Appends the quad of `face`.
    pub fn add_face(&mut self, face: &Face) {
        let num_faces_generated = self.face_count() as u32;
        self.vertices.extend(Self::generate_face_vertices(face));
        self.indices
            .extend(Self::generate_face_indices(num_faces_generated));
    }

    /// Generates vertex data for a single face of a block.
    ///
    /// # Returns
    /// The four corners of the face. The vertices are ordered in a way that forms
    /// two counter-clockwise triangles when combined with the indices from
    /// `generate_face_indices`.
    pub fn generate_face_vertices(face: &Face) -> [Vertex; 4] {
        let texture_index = get_face_texture_index(face.block_type_int, face.block_side);
        let normal = face.block_side.normal();
        let corners = face.corners();

        std::array::from_fn(|corner| {
            let position = corners[corner].map(|coordinate| coordinate as f32);
            Vertex::new(position, normal, FACE_TEX_COORDS[corner], texture_index)
        })
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Six indices forming two triangles for the face.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Number of quads in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of quads facing `side`.
    pub fn face_count_for_side(&self, side: BlockSide) -> usize {
        let normal: [f32; 3] = side.normal().into();
        self.vertices
            .chunks_exact(4)
            .filter(|quad| quad[0].normal == normal)
            .count()
    }

    /// Whether no face was emitted.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertex stream as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index list as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
