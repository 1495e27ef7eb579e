//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by the engine
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 21;

/// A geographic point in decimal degrees.
///
/// Plain value type; validation happens at the grid boundary
/// ([`TileGrid::to_tile`](crate::coord::TileGrid::to_tile)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checks that the point lies inside the Web Mercator domain.
    pub fn in_mercator_domain(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LON..=MAX_LON).contains(&self.lon)
    }
}

impl FromStr for GeoPoint {
    type Err = CoordError;

    /// Parses a `"lat,lon"` string as produced by map UIs and the CLI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let lat = parts
            .next()
            .ok_or_else(|| CoordError::MalformedPoint(s.to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordError::MalformedPoint(s.to_string()))?;
        let lon = parts
            .next()
            .ok_or_else(|| CoordError::MalformedPoint(s.to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordError::MalformedPoint(s.to_string()))?;
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Tile coordinates in a provider's tile matrix.
///
/// Indices are signed: some tile matrices place their origin so that
/// valid cells sit at negative columns or rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// X coordinate (east-west), 0 at the grid origin
    pub col: i32,
    /// Y coordinate (north-south), 0 at the grid origin
    pub row: i32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(col: i32, row: i32, zoom: u8) -> Self {
        Self { col, row, zoom }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// A rectangle of tiles at one zoom level.
///
/// Invariant: `min.col <= max.col`, `min.row <= max.row`, both corners at
/// the same zoom. Enforced at construction, before any network access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBox {
    /// North-west corner tile
    pub min: TileCoord,
    /// South-east corner tile
    pub max: TileCoord,
}

impl TileBox {
    pub fn new(min: TileCoord, max: TileCoord) -> Result<Self, CoordError> {
        if min.zoom != max.zoom {
            return Err(CoordError::ZoomMismatch {
                min: min.zoom,
                max: max.zoom,
            });
        }
        if min.col > max.col || min.row > max.row {
            return Err(CoordError::EmptyBox { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn zoom(&self) -> u8 {
        self.min.zoom
    }

    /// Number of tile columns covered.
    pub fn width_tiles(&self) -> u32 {
        (self.max.col - self.min.col + 1) as u32
    }

    /// Number of tile rows covered.
    pub fn height_tiles(&self) -> u32 {
        (self.max.row - self.min.row + 1) as u32
    }

    /// Total tile count.
    pub fn len(&self) -> usize {
        self.width_tiles() as usize * self.height_tiles() as usize
    }

    pub fn is_empty(&self) -> bool {
        false // the constructor rejects empty boxes
    }

    /// Iterates the box in row-major order: northernmost row first,
    /// west to east within a row. The mosaic composer pairs fetch
    /// results positionally with this enumeration.
    pub fn iter_row_major(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let zoom = self.zoom();
        let (min_col, max_col) = (self.min.col, self.max.col);
        (self.min.row..=self.max.row).flat_map(move |row| {
            (min_col..=max_col).map(move |col| TileCoord::new(col, row, zoom))
        })
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside the Web Mercator domain
    InvalidLatitude(f64),
    /// Longitude outside the valid range
    InvalidLongitude(f64),
    /// Zoom level outside the supported range
    InvalidZoom(u8),
    /// Point string that does not parse as "lat,lon"
    MalformedPoint(String),
    /// Bounding box corners at different zoom levels
    ZoomMismatch { min: u8, max: u8 },
    /// Bounding box with min tile past max tile on some axis
    EmptyBox { min: TileCoord, max: TileCoord },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::MalformedPoint(s) => {
                write!(f, "Malformed point: '{}' (expected \"lat,lon\")", s)
            }
            CoordError::ZoomMismatch { min, max } => {
                write!(f, "Bounding box corners at different zooms: {} vs {}", min, max)
            }
            CoordError::EmptyBox { min, max } => {
                write!(
                    f,
                    "Empty bounding box: min tile {} is past max tile {}",
                    min, max
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
