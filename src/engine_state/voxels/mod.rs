//! # Voxel Engine Core
//!
//! This module contains the voxel data side of the engine: representing,
//! generating, persisting and streaming a chunked voxel world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: block types, block faces and the face texture table
//! * **Noise**: the deterministic noise field terrain is derived from
//! * **Chunk**: fixed-size 3D arrays of blocks, their keys, bounds, generation and collision
//! * **Chunk store**: per-chunk files on disk, with generation as the fallback
//! * **Chunk allocator**: the budgeted, viewpoint-driven streaming loop
//!
//! ## Data Flow
//!
//! 1. The allocator computes the chunk window around the viewpoint
//! 2. Missing chunks are read from the store, which generates unsaved ones
//! 3. Chunks whose neighbors are all loaded are meshed and uploaded
//! 4. The renderer draws the render data of the chunks in render distance

pub mod block;
pub mod chunk;
pub mod chunk_allocator;
pub mod chunk_store;
pub mod noise;
