//! Mesh generation for voxel rendering.
//!
//! This module provides the data structures used to turn voxel data into
//! GPU-friendly geometry.
//!
//! # Architecture
//! - [`Mesh`]: a complete chunk mesh with vertices and indices
//! - [`Face`]: a single quad of a voxel with its corners and properties

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
