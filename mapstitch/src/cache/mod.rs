//! On-disk tile cache.
//!
//! One file per tile coordinate at a deterministic path; entries are
//! immutable once written (tile content is deterministic per key), which
//! makes the store safe to share across concurrent fetch tasks and
//! across runs without locking.

mod path;

pub use path::tile_path;

use crate::coord::TileCoord;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content-addressed disk store for raw tile image bytes.
pub struct TileStore {
    root: PathBuf,
    provider: String,
    ext: String,
}

impl TileStore {
    /// Creates a store rooted at `root` for one provider's tiles.
    ///
    /// Nothing is created on disk until the first write; directories are
    /// made lazily per tile.
    pub fn new(root: PathBuf, provider: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            root,
            provider: provider.into(),
            ext: ext.into(),
        }
    }

    /// Path a tile is (or would be) stored at.
    pub fn path_for(&self, tile: &TileCoord) -> PathBuf {
        tile_path(&self.root, &self.provider, tile, &self.ext)
    }

    /// Reads a cached tile, if present.
    pub async fn get(&self, tile: &TileCoord) -> Option<Vec<u8>> {
        let path = self.path_for(tile);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                trace!(tile = %tile, bytes = bytes.len(), "cache hit");
                Some(bytes)
            }
            Err(_) => None,
        }
    }

    /// Persists a tile's raw bytes, creating parent directories as needed.
    pub async fn put(&self, tile: &TileCoord, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(tile);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(tile = %tile, path = %path.display(), "tile cached");
        Ok(())
    }
}
