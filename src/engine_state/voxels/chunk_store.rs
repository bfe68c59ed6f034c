//! # Chunk Store Module
//!
//! Persistence of chunk voxel data, one file per chunk key.
//!
//! A chunk file is named `{x}_{y}_{z}.chunk` and holds the JSON pair
//! `(block_types, block_visibility)`, both `CHUNK_SIZE` small integers in linear
//! order. Files are written next to their final name first and renamed into place,
//! so a reader never observes a half-written chunk.
//!
//! The store is the single source of truth for chunks it has seen: a key is
//! generated at most once and persisted right away. Every storage failure is
//! logged and handled by generating instead, so [`ChunkStore::load`] always
//! returns a fully populated chunk.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, warn};

use super::{
    block::BlockTypeSize,
    chunk::{chunk_creation::TerrainGenerator, Chunk, ChunkKey},
};

/// File extension of persisted chunks.
pub const CHUNK_FILE_EXTENSION: &str = "chunk";

/// On-disk layout: `(block_types, block_visibility)`.
type ChunkFileContents = (Vec<BlockTypeSize>, Vec<u8>);

/// Loads chunks from disk, generating and persisting the ones that were never saved.
pub struct ChunkStore {
    /// Directory holding the chunk files; `None` keeps everything in memory
    directory: Option<PathBuf>,
    generator: TerrainGenerator,
}

impl ChunkStore {
    /// Creates a store rooted at `directory`. The directory is created on the first save.
    ///
    /// # Arguments
    /// * `directory` - Where chunk files live, or `None` to disable persistence
    /// * `generator` - Terrain used for keys without saved data
    pub fn new(directory: Option<PathBuf>, generator: TerrainGenerator) -> Self {
        ChunkStore { directory, generator }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(generator: TerrainGenerator) -> Self {
        Self::new(None, generator)
    }

    /// Directory the store reads and writes, if persistence is enabled.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// The generator used for unsaved keys.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: ChunkKey) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|directory| directory.join(format!("{}.{CHUNK_FILE_EXTENSION}", key.file_stem())))
    }

    /// Whether a file exists for `key`. Its contents are not validated.
    pub fn has_saved_data(&self, key: ChunkKey) -> bool {
        self.path_for(key).is_some_and(|path| path.is_file())
    }

    /// Returns the chunk for `key`.
    ///
    /// Saved data is restored bit for bit. Without saved data, or when the saved
    /// data can't be read or fails validation, the chunk is generated and saved.
    pub fn load(&self, key: ChunkKey) -> Chunk {
        match self.read(key) {
            Ok(Some(chunk)) => {
                debug!("Loaded chunk {} from disk", key);
                return chunk;
            }
            Ok(None) => {}
            Err(error) => warn!("Discarding saved data of chunk {}: {:#}", key, error),
        }

        let chunk = self.generator.generate(key);
        if let Err(error) = self.save(&chunk) {
            warn!("Failed to persist chunk {}: {:#}", key, error);
        }
        chunk
    }

    /// Reads and validates the saved data for `key`.
    ///
    /// # Returns
    /// `Ok(None)` when persistence is disabled or no file exists.
    pub fn read(&self, key: ChunkKey) -> anyhow::Result<Option<Chunk>> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let (block_types, block_visibility): ChunkFileContents =
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing {}", path.display()))?;

        Chunk::from_raw(key, block_types, block_visibility).map(Some)
    }

    /// Writes `chunk` to its file, replacing any previous contents.
    ///
    /// Does nothing when persistence is disabled.
    pub fn save(&self, chunk: &Chunk) -> anyhow::Result<()> {
        let (Some(directory), Some(path)) = (&self.directory, self.path_for(chunk.position)) else {
            return Ok(());
        };

        fs::create_dir_all(directory)
            .with_context(|| format!("creating chunk directory {}", directory.display()))?;

        let temporary_path = path.with_extension("tmp");
        let file = File::create(&temporary_path)
            .with_context(|| format!("creating {}", temporary_path.display()))?;
        let mut writer = BufWriter::new(file);
        let contents: ChunkFileContents = chunk.to_raw();
        serde_json::to_writer(&mut writer, &contents)
            .with_context(|| format!("serializing chunk {}", chunk.position))?;
        writer
            .flush()
            .with_context(|| format!("writing {}", temporary_path.display()))?;
        drop(writer);

        fs::rename(&temporary_path, &path)
            .with_context(|| format!("moving chunk file into place at {}", path.display()))?;

        debug!("Persisted chunk {} to {}", chunk.position, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::TerrainConfig,
        voxels::{block::block_type::BlockType, chunk::CHUNK_SIZE},
    };

    fn temporary_directory() -> PathBuf {
        std::env::temp_dir().join(format!("voxel-streaming-store-{:016x}", fastrand::u64(..)))
    }

    fn store_in(directory: &Path) -> ChunkStore {
        ChunkStore::new(
            Some(directory.to_path_buf()),
            TerrainGenerator::new(TerrainConfig::default()),
        )
    }

    #[test]
    fn path_uses_key_components() {
        let store = store_in(Path::new("levels"));
        assert_eq!(
            store.path_for(ChunkKey::new(-3, 0, 12)),
            Some(PathBuf::from("levels/-3_0_12.chunk"))
        );

        let in_memory = ChunkStore::in_memory(TerrainGenerator::new(TerrainConfig::default()));
        assert_eq!(in_memory.path_for(ChunkKey::new(0, 0, 0)), None);
    }

    #[test]
    fn load_persists_generated_chunks() {
        let directory = temporary_directory();
        let store = store_in(&directory);
        let key = ChunkKey::new(1, 0, -1);

        assert!(!store.has_saved_data(key));
        let generated = store.load(key);
        assert!(store.has_saved_data(key));

        let restored = store_in(&directory).load(key);
        assert_eq!(restored.to_raw(), generated.to_raw());

        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn saved_edits_win_over_generation() {
        let directory = temporary_directory();
        let store = store_in(&directory);
        let key = ChunkKey::new(0, 5, 0);

        let mut chunk = Chunk::empty(key);
        chunk.set_block(4, 4, 4, BlockType::WOOD);
        store.save(&chunk).unwrap();

        let loaded = store.load(key);
        assert_eq!(loaded.visible_block_count(), 1);
        assert_eq!(loaded.get_block_type(4, 4, 4), BlockType::WOOD.as_int());

        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn malformed_files_are_regenerated() {
        let directory = temporary_directory();
        let store = store_in(&directory);
        let key = ChunkKey::new(0, -4, 0);
        let path = store.path_for(key).unwrap();

        fs::create_dir_all(&directory).unwrap();
        fs::write(&path, "[[1, 2, 3], [0, 1, 0]]").unwrap();
        assert!(store.read(key).is_err());

        let chunk = store.load(key);
        assert_eq!(chunk.block_types().len(), CHUNK_SIZE);
        assert!(store.read(key).unwrap().is_some());

        fs::write(&path, "not json").unwrap();
        assert!(store.read(key).is_err());
        assert_eq!(store.load(key).block_types().len(), CHUNK_SIZE);

        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn in_memory_store_never_saves() {
        let store = ChunkStore::in_memory(TerrainGenerator::new(TerrainConfig::default()));
        let key = ChunkKey::new(0, 0, 0);

        let chunk = store.load(key);
        assert!(store.save(&chunk).is_ok());
        assert!(!store.has_saved_data(key));
        assert!(store.read(key).unwrap().is_none());
    }
}
