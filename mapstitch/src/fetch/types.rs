//! Fetch result types.

use crate::coord::TileCoord;
use image::RgbImage;

/// How a tile was obtained, or why it wasn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Decoded from the on-disk cache, no network traffic
    Cached,
    /// Downloaded from the provider (and cached unless disabled)
    Fetched,
    /// Download or decode failed; the mosaic leaves this region blank
    Missing,
}

/// One tile's fetch result, paired positionally with the bounding-box
/// enumeration by the mosaic composer.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub coord: TileCoord,
    pub outcome: TileOutcome,
    /// Decoded image; `None` exactly when the outcome is `Missing`
    pub image: Option<RgbImage>,
}

impl TileResult {
    pub fn cached(coord: TileCoord, image: RgbImage) -> Self {
        Self {
            coord,
            outcome: TileOutcome::Cached,
            image: Some(image),
        }
    }

    pub fn fetched(coord: TileCoord, image: RgbImage) -> Self {
        Self {
            coord,
            outcome: TileOutcome::Fetched,
            image: Some(image),
        }
    }

    pub fn missing(coord: TileCoord) -> Self {
        Self {
            coord,
            outcome: TileOutcome::Missing,
            image: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.outcome == TileOutcome::Missing
    }
}
