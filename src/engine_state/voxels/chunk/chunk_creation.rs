//! # Chunk Creation Module
//!
//! Procedural terrain for chunks that have never been saved.
//!
//! ## Algorithm
//!
//! For every voxel the world-absolute coordinates are computed from the chunk key.
//! - **Visibility**: solid when the voxel's world height is below the terrain
//!   surface `fbm(x·scale + offset, z·scale + offset) · amplitude`; a second, 3D
//!   noise pass optionally carves caves by clearing visibility where the sample
//!   exceeds a threshold.
//! - **Block type**: with the `Layered` palette the type follows the depth below
//!   the surface (grass, dirt, stone), so a chunk key always regenerates the same
//!   blocks. The `Random` palette draws a random type per voxel instead.
//!
//! Visibility never depends on the palette and is fully reproducible.

use log::debug;

use crate::engine_state::{
    config::{BlockPalette, TerrainConfig},
    voxels::{
        block::block_type::BlockType,
        noise::{NoiseField, NoiseParameters},
    },
};

use super::{Chunk, ChunkKey, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// Fills chunks with procedurally generated terrain.
pub struct TerrainGenerator {
    config: TerrainConfig,
    noise: NoiseField,
}

impl TerrainGenerator {
    /// Creates a generator and precomputes its noise tables.
    pub fn new(config: TerrainConfig) -> Self {
        let noise = NoiseField::new(NoiseParameters {
            zoom: config.zoom,
            octaves: config.octaves,
            persistence: config.persistence,
            base_elevation: config.base_elevation,
            seed: config.cave_seed,
        });

        TerrainGenerator { config, noise }
    }

    /// The settings this generator was built with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// World height of the terrain surface above column (`world_x`, `world_z`).
    pub fn surface_height(&self, world_x: i64, world_z: i64) -> f64 {
        let scale = self.config.horizontal_scale;
        let offset = self.config.horizontal_offset;
        let height = self.noise.sample(
            world_x as f64 * scale + offset,
            world_z as f64 * scale + offset,
        );
        height * self.config.amplitude
    }

    /// Whether the cave pass clears the voxel at the given world coordinates.
    pub fn is_cave(&self, world_x: i64, world_y: i64, world_z: i64) -> bool {
        if !self.config.caves {
            return false;
        }
        let scale = self.config.cave_scale;
        let sample = self.noise.noise3d(
            world_x as f64 * scale,
            world_y as f64 * scale,
            world_z as f64 * scale,
        );
        sample > self.config.cave_threshold
    }

    /// Generates a fully populated chunk for `position`.
    pub fn generate(&self, position: ChunkKey) -> Chunk {
        let mut chunk = Chunk::empty(position);
        let [origin_x, origin_y, origin_z] = position.world_block_origin();

        let mut heights = [0.0; CHUNK_PLANE_SIZE];
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let world_x = origin_x + x as i64;
                let world_z = origin_z + z as i64;
                heights[x + z * CHUNK_DIMENSION] = self.surface_height(world_x, world_z);
            }
        }

        for z in 0..CHUNK_DIMENSION {
            let world_z = origin_z + z as i64;
            for y in 0..CHUNK_DIMENSION {
                let world_y = origin_y + y as i64;
                for x in 0..CHUNK_DIMENSION {
                    let world_x = origin_x + x as i64;
                    let height = heights[x + z * CHUNK_DIMENSION];
                    let below_surface = (world_y as f64) < height;

                    let block_type = match self.config.block_palette {
                        BlockPalette::Random => BlockType::get_random_type(),
                        BlockPalette::Layered if below_surface => {
                            BlockType::for_depth((height - world_y as f64) as f32)
                        }
                        BlockPalette::Layered => BlockType::AIR,
                    };
                    chunk.set_block_type(x, y, z, block_type.as_int());

                    let solid = below_surface && !self.is_cave(world_x, world_y, world_z);
                    chunk.set_block_visibility(x, y, z, solid);
                }
            }
        }

        debug!(
            "Generated procedural chunk at {} ({} solid blocks)",
            position,
            chunk.visible_block_count()
        );

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(config: TerrainConfig) -> TerrainGenerator {
        TerrainGenerator::new(config)
    }

    #[test]
    fn layered_generation_is_reproducible() {
        let generator = generator(TerrainConfig::default());
        let key = ChunkKey::new(3, 0, -2);

        let first = generator.generate(key);
        let second = generator.generate(key);
        assert_eq!(first.to_raw(), second.to_raw());
    }

    #[test]
    fn random_palette_keeps_visibility_deterministic() {
        let generator = generator(TerrainConfig {
            block_palette: BlockPalette::Random,
            ..TerrainConfig::default()
        });
        let key = ChunkKey::new(0, 0, 0);

        let first = generator.generate(key);
        let second = generator.generate(key);
        assert_eq!(first.block_visibility(), second.block_visibility());
        assert!(first
            .block_types()
            .iter()
            .all(|block_type| (1..4).contains(block_type)));
    }

    #[test]
    fn deep_chunks_are_solid_and_high_chunks_are_air_without_caves() {
        let generator = generator(TerrainConfig {
            caves: false,
            ..TerrainConfig::default()
        });

        // the surface never leaves [-amplitude, amplitude]
        let deep = generator.generate(ChunkKey::new(0, -4, 0));
        let high = generator.generate(ChunkKey::new(0, 4, 0));

        assert_eq!(deep.visible_block_count(), crate::engine_state::voxels::chunk::CHUNK_SIZE);
        assert_eq!(high.visible_block_count(), 0);
        assert!(deep
            .block_types()
            .iter()
            .all(|block_type| *block_type == BlockType::STONE.as_int()));
    }

    #[test]
    fn solid_voxels_sit_below_the_surface() {
        let generator = generator(TerrainConfig::default());
        let key = ChunkKey::new(1, 0, 1);
        let chunk = generator.generate(key);

        let [origin_x, origin_y, origin_z] = key.world_block_origin();
        for (position, _) in chunk.visible_blocks() {
            let world_x = origin_x + position.x as i64;
            let world_y = origin_y + position.y as i64;
            let world_z = origin_z + position.z as i64;
            assert!((world_y as f64) < generator.surface_height(world_x, world_z));
        }
    }

    #[test]
    fn keys_at_the_ends_of_the_range_generate() {
        let generator = generator(TerrainConfig::default());
        for key in [
            ChunkKey::new(i32::MAX, 0, i32::MIN),
            ChunkKey::new(i32::MIN, i32::MIN, i32::MAX),
            ChunkKey::new(625_000_000, 0, 0),
        ] {
            let chunk = generator.generate(key);
            assert_eq!(chunk.position, key);
        }
    }

    #[test]
    fn caves_only_remove_blocks() {
        let with_caves = generator(TerrainConfig::default());
        let without_caves = generator(TerrainConfig {
            caves: false,
            ..TerrainConfig::default()
        });
        let key = ChunkKey::new(0, -1, 0);

        let carved = with_caves.generate(key);
        let full = without_caves.generate(key);
        for index in carved.block_visibility().iter_ones() {
            assert!(full.block_visibility()[index]);
        }
    }
}
