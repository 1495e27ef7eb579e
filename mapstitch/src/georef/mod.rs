//! Geo-reference embedding.
//!
//! Computes the true geographic bounds of the composed raster and shells
//! out to GDAL's `gdal_translate` to write the final geo-tagged file.
//! The bounds come from the *outer* edges of the extreme tiles: the min
//! tile's top-left corner and the far corner of the max tile (one whole
//! tile past its index). Using the near corner instead would undershoot
//! the coverage by one tile row and column.

use crate::coord::{GeoPoint, TileBox, TileCoord, TileGrid};
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Default embedding utility.
pub const DEFAULT_TRANSLATE_COMMAND: &str = "gdal_translate";

/// Output formats of the final geo-tagged export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Geospatial PDF
    Pdf,
    /// GeoTIFF raster
    GeoTiff,
}

impl OutputFormat {
    /// GDAL driver name.
    pub fn driver(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "PDF",
            OutputFormat::GeoTiff => "GTiff",
        }
    }

    /// File extension of the export.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::GeoTiff => "tif",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "geotiff" | "gtiff" | "tif" | "tiff" => Ok(OutputFormat::GeoTiff),
            other => Err(format!("unrecognized output format '{}'", other)),
        }
    }
}

/// Geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Outer bounds of a tile box under the given grid.
    ///
    /// North-west from the min tile's own corner; south-east from
    /// `max + (1,1)`, the far corner convention.
    pub fn of_tile_box(tile_box: &TileBox, grid: &dyn TileGrid) -> Self {
        let nw: GeoPoint = grid.to_point(tile_box.min);
        let se: GeoPoint = grid.to_point(TileCoord::new(
            tile_box.max.col + 1,
            tile_box.max.row + 1,
            tile_box.zoom(),
        ));
        Self {
            west: nw.lon,
            south: se.lat,
            east: se.lon,
            north: nw.lat,
        }
    }
}

/// Errors raised by the embedding step. All fatal.
#[derive(Debug, Error)]
pub enum GeoRefError {
    /// The utility could not be spawned (typically: not installed)
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The utility exited with a failure status
    #[error("'{command}' failed with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Invokes the external geospatial-metadata-embedding utility.
pub struct GeoReferencer {
    command: String,
}

impl GeoReferencer {
    pub fn new() -> Self {
        Self::with_command(DEFAULT_TRANSLATE_COMMAND)
    }

    /// Uses a different embedding command. Tests point this at a no-op
    /// binary so runs do not require GDAL.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Embeds WGS84 bounds into the mosaic, producing the final export.
    ///
    /// Equivalent to:
    /// `gdal_translate -of <driver> -a_srs WGS84
    ///  -a_ullr <west> <north> <east> <south> <mosaic> <output>`
    pub async fn embed(
        &self,
        mosaic_path: &Path,
        output_path: &Path,
        bounds: GeoBounds,
        format: OutputFormat,
    ) -> Result<(), GeoRefError> {
        debug!(
            command = %self.command,
            driver = format.driver(),
            west = bounds.west,
            south = bounds.south,
            east = bounds.east,
            north = bounds.north,
            "embedding geo-reference"
        );

        let output = Command::new(&self.command)
            .arg("-of")
            .arg(format.driver())
            .arg("-a_srs")
            .arg("WGS84")
            .arg("-a_ullr")
            .arg(bounds.west.to_string())
            .arg(bounds.north.to_string())
            .arg(bounds.east.to_string())
            .arg(bounds.south.to_string())
            .arg(mosaic_path)
            .arg(output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GeoRefError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GeoRefError::Failed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        info!(path = %output_path.display(), "geo-referenced export written");
        Ok(())
    }
}

impl Default for GeoReferencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::SlippyGrid;

    #[test]
    fn bounds_use_the_far_corner_of_the_max_tile() {
        let grid = SlippyGrid::default();
        let tile_box =
            TileBox::new(TileCoord::new(2123, 1456, 12), TileCoord::new(2127, 1459, 12)).unwrap();

        let bounds = GeoBounds::of_tile_box(&tile_box, &grid);
        let nw = grid.to_point(tile_box.min);
        let far = grid.to_point(TileCoord::new(2128, 1460, 12));

        assert_eq!(bounds.west, nw.lon);
        assert_eq!(bounds.north, nw.lat);
        assert_eq!(bounds.east, far.lon);
        assert_eq!(bounds.south, far.lat);

        // The requested rectangle is fully covered, not undershot.
        assert!(bounds.east > grid.to_point(tile_box.max).lon);
        assert!(bounds.south < grid.to_point(tile_box.max).lat);
    }

    #[test]
    fn format_maps_to_gdal_drivers_and_extensions() {
        assert_eq!(OutputFormat::Pdf.driver(), "PDF");
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::GeoTiff.driver(), "GTiff");
        assert_eq!(OutputFormat::GeoTiff.extension(), "tif");

        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!(
            "GeoTIFF".parse::<OutputFormat>().unwrap(),
            OutputFormat::GeoTiff
        );
        assert!("svg".parse::<OutputFormat>().is_err());
    }

    fn bounds() -> GeoBounds {
        GeoBounds {
            west: 6.59,
            south: 45.68,
            east: 7.03,
            north: 45.92,
        }
    }

    #[tokio::test]
    async fn failing_command_surfaces_a_fatal_error() {
        let referencer = GeoReferencer::with_command("false");
        let err = referencer
            .embed(
                Path::new("in.jpg"),
                Path::new("out.pdf"),
                bounds(),
                OutputFormat::Pdf,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GeoRefError::Failed { .. }));
    }

    #[tokio::test]
    async fn missing_binary_surfaces_a_spawn_error() {
        let referencer = GeoReferencer::with_command("definitely-not-a-real-binary");
        let err = referencer
            .embed(
                Path::new("in.jpg"),
                Path::new("out.pdf"),
                bounds(),
                OutputFormat::Pdf,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GeoRefError::Spawn { .. }));
    }

    #[tokio::test]
    async fn successful_command_is_ok() {
        let referencer = GeoReferencer::with_command("true");
        referencer
            .embed(
                Path::new("in.jpg"),
                Path::new("out.pdf"),
                bounds(),
                OutputFormat::Pdf,
            )
            .await
            .unwrap();
    }
}
