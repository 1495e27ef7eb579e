//! CyclOSM tile provider.
//!
//! OpenStreetMap-based cycling map served from the standard slippy-map
//! grid (256 px tiles, `2^zoom` matrix).
//!
//! # URL Pattern
//!
//! `https://{a,b,c}.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png`
//!
//! Requests rotate across the `a`, `b`, `c` subdomains for load
//! balancing, the same way browsers spread slippy-map traffic.

use super::types::TileProvider;
use crate::coord::TileCoord;
use std::sync::atomic::{AtomicU8, Ordering};

const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// CyclOSM raster tile provider.
///
/// No API key is required. Coordinates follow standard XYZ tiling:
/// column 0 at the west edge, row 0 at the north edge.
pub struct CyclOsmProvider {
    /// Counter for round-robin subdomain selection
    server_counter: AtomicU8,
}

impl CyclOsmProvider {
    pub fn new() -> Self {
        Self {
            server_counter: AtomicU8::new(0),
        }
    }

    /// Gets the next subdomain in round-robin fashion.
    fn next_subdomain(&self) -> &'static str {
        let current = self.server_counter.fetch_add(1, Ordering::Relaxed);
        SUBDOMAINS[(current % SUBDOMAINS.len() as u8) as usize]
    }
}

impl Default for CyclOsmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TileProvider for CyclOsmProvider {
    fn tile_url(&self, tile: &TileCoord) -> String {
        format!(
            "https://{}.tile-cyclosm.openstreetmap.fr/cyclosm/{}/{}/{}.png",
            self.next_subdomain(),
            tile.zoom,
            tile.col,
            tile.row
        )
    }

    fn name(&self) -> &str {
        "cyclosm"
    }

    fn tile_format(&self) -> &str {
        "png"
    }

    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8 {
        20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_slippy_url() {
        let provider = CyclOsmProvider::new();
        let url = provider.tile_url(&TileCoord::new(2123, 1456, 12));
        assert_eq!(
            url,
            "https://a.tile-cyclosm.openstreetmap.fr/cyclosm/12/2123/1456.png"
        );
    }

    #[test]
    fn rotates_subdomains() {
        let provider = CyclOsmProvider::new();
        let tile = TileCoord::new(0, 0, 1);
        let first = provider.tile_url(&tile);
        let second = provider.tile_url(&tile);
        let third = provider.tile_url(&tile);
        let fourth = provider.tile_url(&tile);

        assert!(first.starts_with("https://a."));
        assert!(second.starts_with("https://b."));
        assert!(third.starts_with("https://c."));
        assert_eq!(first, fourth);
    }

    #[test]
    fn supports_standard_zoom_range() {
        let provider = CyclOsmProvider::new();
        assert!(provider.supports_zoom(0));
        assert!(provider.supports_zoom(20));
        assert!(!provider.supports_zoom(21));
    }
}
