//! Provider types and traits

use crate::coord::TileCoord;
use std::fmt;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Zoom level not supported by this provider
    UnsupportedZoom(u8),
    /// Invalid response data from provider
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Trait for map tile sources.
///
/// A provider owns the URL template addressing its tiles and nothing
/// else: the fetcher performs the actual HTTP traffic so that providers
/// stay trivially testable and trait-object friendly.
pub trait TileProvider: Send + Sync {
    /// Builds the URL for one tile, substituting zoom/column/row into the
    /// provider's template.
    fn tile_url(&self, tile: &TileCoord) -> String;

    /// Returns the provider's name for logging and cache layout.
    fn name(&self) -> &str;

    /// File extension of tile images as served (`"png"`, `"jpg"`),
    /// used for cache file naming.
    fn tile_format(&self) -> &str;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Checks if this provider supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }
}
