//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and integer tile coordinates in a provider's tile matrix. Two grid
//! families exist: the closed-form slippy-map grid used by OpenStreetMap
//! style servers, and catalog-driven Web Mercator matrices whose geometry
//! comes from a WMTS capability document.

mod matrix;
mod slippy;
mod types;


pub use matrix::MercatorMatrixGrid;
pub use slippy::SlippyGrid;
pub use types::{
    CoordError, GeoPoint, TileBox, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM,
};

/// Two-way transform between geographic degrees and tile indices.
///
/// One implementation exists per grid family; the engine selects the
/// implementation at configuration time and uses it through this trait
/// for tile enumeration and for geo-reference bounds.
pub trait TileGrid: Send + Sync {
    /// Converts a geographic point to the tile containing it.
    ///
    /// Indices truncate toward negative infinity (floor), matching how
    /// tile grids address pixel regions. Never rounds.
    fn to_tile(&self, point: GeoPoint, zoom: u8) -> Result<TileCoord, CoordError>;

    /// Converts a tile coordinate back to the geographic position of its
    /// top-left (north-west) corner.
    fn to_point(&self, tile: TileCoord) -> GeoPoint;

    /// Tile pixel dimensions `(width, height)` in this grid.
    fn tile_size(&self) -> (u32, u32);
}
