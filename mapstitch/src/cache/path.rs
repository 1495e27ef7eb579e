//! Cache path construction.

use crate::coord::TileCoord;
use std::path::{Path, PathBuf};

/// Construct the full path for a cached tile image.
///
/// Creates a hierarchical path structure:
/// ```text
/// <cache_dir>/<provider>/<zoom>/<col>/<row>.<ext>
/// ```
///
/// Each tile coordinate maps to exactly one path, so concurrent writers
/// of the same tile write identical bytes and no coordination is needed.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use mapstitch::cache::tile_path;
/// use mapstitch::coord::TileCoord;
///
/// let path = tile_path(
///     &PathBuf::from("/cache"),
///     "cyclosm",
///     &TileCoord::new(2123, 1456, 12),
///     "png",
/// );
/// assert_eq!(path, PathBuf::from("/cache/cyclosm/12/2123/1456.png"));
/// ```
pub fn tile_path(cache_dir: &Path, provider: &str, tile: &TileCoord, ext: &str) -> PathBuf {
    cache_dir
        .join(provider)
        .join(tile.zoom.to_string())
        .join(tile.col.to_string())
        .join(format!("{}.{}", tile.row, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_hierarchical_path() {
        let path = tile_path(
            &PathBuf::from("/cache"),
            "ign",
            &TileCoord::new(2076, 1436, 12),
            "jpg",
        );
        assert_eq!(path, PathBuf::from("/cache/ign/12/2076/1436.jpg"));
    }

    #[test]
    fn negative_indices_address_distinct_files() {
        let a = tile_path(
            &PathBuf::from("/cache"),
            "x",
            &TileCoord::new(-1, 0, 3),
            "png",
        );
        let b = tile_path(
            &PathBuf::from("/cache"),
            "x",
            &TileCoord::new(1, 0, 3),
            "png",
        );
        assert_ne!(a, b);
    }
}
