//! Capability catalog types.

use std::collections::HashMap;
use thiserror::Error;

/// Per-zoom geometry of a WMTS tile matrix.
///
/// Populated once per run from the capability document and never mutated
/// afterward. The optional index bounds come from the layer's
/// `TileMatrixLimits` section when the provider publishes them.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMatrixInfo {
    /// WMTS scale denominator for this zoom
    pub scale_denominator: f64,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Projected X of the grid's top-left corner
    pub origin_x: f64,
    /// Projected Y of the grid's top-left corner
    pub origin_y: f64,
    /// Smallest valid tile row, if published
    pub min_row: Option<u32>,
    /// Largest valid tile row, if published
    pub max_row: Option<u32>,
    /// Smallest valid tile column, if published
    pub min_col: Option<u32>,
    /// Largest valid tile column, if published
    pub max_col: Option<u32>,
}

/// Mapping from zoom level to tile matrix geometry for one layer.
///
/// Built once at engine start for catalog-driven providers, read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    entries: HashMap<u8, TileMatrixInfo>,
}

impl Capabilities {
    pub fn new(entries: HashMap<u8, TileMatrixInfo>) -> Self {
        Self { entries }
    }

    pub fn get(&self, zoom: u8) -> Option<&TileMatrixInfo> {
        self.entries.get(&zoom)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors raised while resolving tile matrix geometry.
///
/// All of these are fatal: without the grid geometry no tile address can
/// be computed, so the whole run aborts.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Capability document could not be retrieved
    #[error("failed to fetch capability document: {0}")]
    Fetch(String),

    /// I/O error reading or writing the cached document
    #[error("capability cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not parseable XML
    #[error("capability document is not valid XML: {0}")]
    Xml(String),

    /// Requested layer has no entry in the document
    #[error("layer '{0}' not found in capability document")]
    LayerNotFound(String),

    /// Requested zoom has no tile matrix entry
    #[error("no tile matrix for zoom {0} in capability document")]
    ZoomNotFound(u8),

    /// A tile matrix entry is missing or has a malformed field
    #[error("malformed tile matrix entry for zoom '{zoom}': {detail}")]
    MalformedEntry { zoom: String, detail: String },
}
