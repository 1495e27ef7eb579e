//! Catalog-driven Web Mercator tile matrix.

use super::types::{CoordError, GeoPoint, TileCoord};
use super::TileGrid;
use crate::catalog::TileMatrixInfo;
use std::f64::consts::PI;

/// WGS84 / Web Mercator sphere radius in meters.
const EARTH_RADIUS: f64 = 6_378_137.0;

/// OGC standardized rendering pixel size in meters (0.28 mm).
const RENDER_PIXEL_SIZE: f64 = 0.000_28;

/// Tile grid whose geometry comes from a WMTS capability document.
///
/// Works in the provider's projected plane (Web Mercator meters). The
/// grid is bound to one zoom level because scale denominator and origin
/// are per-zoom properties of the tile matrix.
#[derive(Debug, Clone)]
pub struct MercatorMatrixGrid {
    zoom: u8,
    info: TileMatrixInfo,
    /// Projected side length of one tile in meters
    tile_span: f64,
}

impl MercatorMatrixGrid {
    /// Builds the grid for one zoom level from its matrix entry.
    pub fn new(zoom: u8, info: TileMatrixInfo) -> Self {
        let tile_span = info.scale_denominator * RENDER_PIXEL_SIZE * info.tile_height as f64;
        Self {
            zoom,
            info,
            tile_span,
        }
    }

    /// Forward Mercator: degrees to projected meters.
    fn project(point: GeoPoint) -> (f64, f64) {
        let x = EARTH_RADIUS * point.lon.to_radians();
        let y = EARTH_RADIUS * (point.lat.to_radians() / 2.0 + PI / 4.0).tan().ln();
        (x, y)
    }

    /// Inverse Mercator latitude, analytic. The bounded root-finding some
    /// servers document for this step is unnecessary: `atan(sinh(y/R))`
    /// inverts the forward formula exactly.
    fn unproject(x: f64, y: f64) -> GeoPoint {
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (y / EARTH_RADIUS).sinh().atan().to_degrees();
        GeoPoint { lat, lon }
    }
}

impl TileGrid for MercatorMatrixGrid {
    fn to_tile(&self, point: GeoPoint, zoom: u8) -> Result<TileCoord, CoordError> {
        if zoom != self.zoom {
            return Err(CoordError::InvalidZoom(zoom));
        }
        if !(super::MIN_LAT..=super::MAX_LAT).contains(&point.lat) {
            return Err(CoordError::InvalidLatitude(point.lat));
        }
        if !(super::MIN_LON..=super::MAX_LON).contains(&point.lon) {
            return Err(CoordError::InvalidLongitude(point.lon));
        }

        let (x, y) = Self::project(point);

        // Columns grow eastward from the origin, rows southward.
        let col = ((x - self.info.origin_x) / self.tile_span).floor() as i32;
        let row = ((self.info.origin_y - y) / self.tile_span).floor() as i32;

        Ok(TileCoord { col, row, zoom })
    }

    fn to_point(&self, tile: TileCoord) -> GeoPoint {
        let x = self.info.origin_x + tile.col as f64 * self.tile_span;
        let y = self.info.origin_y - tile.row as f64 * self.tile_span;
        Self::unproject(x, y)
    }

    fn tile_size(&self) -> (u32, u32) {
        (self.info.tile_width, self.info.tile_height)
    }
}
