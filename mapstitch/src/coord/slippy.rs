//! Closed-form slippy-map tile grid.

use super::types::{CoordError, GeoPoint, TileCoord, MAX_ZOOM};
use super::TileGrid;
use std::f64::consts::PI;

/// The `2^zoom` tile grid used by OpenStreetMap-style tile servers.
///
/// Both conversion directions are analytic; the inverse latitude uses the
/// hyperbolic-sine closed form rather than any numeric solving.
#[derive(Debug, Clone, Copy)]
pub struct SlippyGrid {
    tile_size: u32,
}

impl SlippyGrid {
    /// Creates a grid with the given square tile size in pixels.
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }
}

impl Default for SlippyGrid {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TileGrid for SlippyGrid {
    fn to_tile(&self, point: GeoPoint, zoom: u8) -> Result<TileCoord, CoordError> {
        if !(super::MIN_LAT..=super::MAX_LAT).contains(&point.lat) {
            return Err(CoordError::InvalidLatitude(point.lat));
        }
        if !(super::MIN_LON..=super::MAX_LON).contains(&point.lon) {
            return Err(CoordError::InvalidLongitude(point.lon));
        }
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }

        let n = 2.0_f64.powi(zoom as i32);
        let lat_rad = point.lat.to_radians();

        // The domain edges floor one step past the grid (lon 180 / the
        // southern bound land at n, the northern bound at -1); this grid
        // has no tiles outside 0..n, so edge inputs clamp to it.
        let last = (1i32 << zoom) - 1;
        let col = (((point.lon + 180.0) / 360.0 * n).floor() as i32).clamp(0, last);
        let row = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as i32).clamp(0, last);

        Ok(TileCoord { col, row, zoom })
    }

    fn to_point(&self, tile: TileCoord) -> GeoPoint {
        let n = 2.0_f64.powi(tile.zoom as i32);

        let lon = tile.col as f64 / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * tile.row as f64 / n)).sinh().atan().to_degrees();

        GeoPoint { lat, lon }
    }

    fn tile_size(&self) -> (u32, u32) {
        (self.tile_size, self.tile_size)
    }
}
