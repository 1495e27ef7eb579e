//! Mosaic composition.
//!
//! Lays fetched tiles out on one raster sized to the bounding box. Tiles
//! are pasted at fixed offsets derived from their grid position, so the
//! result is identical no matter what order the tiles arrived in.
//! Missing tiles leave their region at the (black) background.

use crate::coord::TileBox;
use crate::fetch::TileResult;
use image::{imageops, RgbImage};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while persisting the composed raster.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// Parent directory could not be created
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding failed
    #[error("failed to encode mosaic: {0}")]
    Encode(#[from] image::ImageError),
}

/// Pastes tile images into a raster covering the whole bounding box.
///
/// The canvas measures `width_tiles × tile_w` by `height_tiles × tile_h`
/// pixels. Results are matched to offsets by their own coordinate, not
/// by position in the slice, so a reordered input would still compose
/// correctly; the fetcher nevertheless guarantees enumeration order.
pub fn compose(
    results: &[TileResult],
    tile_box: &TileBox,
    tile_w: u32,
    tile_h: u32,
) -> RgbImage {
    let width = tile_box.width_tiles() * tile_w;
    let height = tile_box.height_tiles() * tile_h;
    let mut canvas = RgbImage::new(width, height);

    let mut pasted = 0usize;
    for result in results {
        let Some(image) = &result.image else {
            continue;
        };
        let x = (result.coord.col - tile_box.min.col) as i64 * tile_w as i64;
        let y = (result.coord.row - tile_box.min.row) as i64 * tile_h as i64;

        if image.width() != tile_w || image.height() != tile_h {
            // Still pasted; replace() clips at the canvas edge.
            warn!(
                tile = %result.coord,
                width = image.width(),
                height = image.height(),
                "tile does not match the grid's declared tile size"
            );
        }
        imageops::replace(&mut canvas, image, x, y);
        pasted += 1;
    }

    debug!(
        width,
        height,
        pasted,
        total = results.len(),
        "mosaic composed"
    );
    canvas
}

/// Persists the intermediate raster as JPEG, creating parent directories.
pub fn write_jpeg(image: &RgbImage, path: &Path) -> Result<(), MosaicError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, image::ImageFormat::Jpeg)?;
    debug!(path = %path.display(), "mosaic written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use image::Rgb;

    fn tile_box() -> TileBox {
        TileBox::new(TileCoord::new(10, 20, 6), TileCoord::new(12, 21, 6)).unwrap()
    }

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb(color))
    }

    #[test]
    fn canvas_matches_box_size_equations() {
        let tile_box = tile_box();
        let results: Vec<TileResult> = tile_box
            .iter_row_major()
            .map(|c| TileResult::fetched(c, solid([1, 1, 1])))
            .collect();

        let mosaic = compose(&results, &tile_box, 4, 4);
        assert_eq!(mosaic.width(), tile_box.width_tiles() * 4);
        assert_eq!(mosaic.height(), tile_box.height_tiles() * 4);
        assert_eq!((mosaic.width(), mosaic.height()), (12, 8));
    }

    #[test]
    fn tiles_land_at_their_grid_offsets() {
        let tile_box = tile_box();
        let mut results: Vec<TileResult> = Vec::new();
        for (i, coord) in tile_box.iter_row_major().enumerate() {
            results.push(TileResult::fetched(coord, solid([i as u8 + 1, 0, 0])));
        }

        let mosaic = compose(&results, &tile_box, 4, 4);

        // First tile of the second row (col 10, row 21) is index 3 in
        // row-major order, so its red channel is 4.
        assert_eq!(mosaic.get_pixel(0, 4).0[0], 4);
        // Last tile (col 12, row 21) is index 5.
        assert_eq!(mosaic.get_pixel(11, 7).0[0], 6);
    }

    #[test]
    fn missing_tiles_leave_black_regions_and_full_size() {
        let tile_box = tile_box();
        let results: Vec<TileResult> = tile_box
            .iter_row_major()
            .map(|c| {
                if c == TileCoord::new(11, 20, 6) {
                    TileResult::missing(c)
                } else {
                    TileResult::fetched(c, solid([255, 255, 255]))
                }
            })
            .collect();

        let mosaic = compose(&results, &tile_box, 4, 4);
        assert_eq!((mosaic.width(), mosaic.height()), (12, 8));

        // The missing tile's region stays at the background color.
        assert_eq!(mosaic.get_pixel(4, 0).0, [0, 0, 0]);
        assert_eq!(mosaic.get_pixel(7, 3).0, [0, 0, 0]);
        // Neighbours are painted.
        assert_eq!(mosaic.get_pixel(3, 0).0, [255, 255, 255]);
        assert_eq!(mosaic.get_pixel(8, 0).0, [255, 255, 255]);
    }

    #[test]
    fn write_jpeg_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.jpg");
        write_jpeg(&solid([10, 20, 30]), &path).unwrap();
        assert!(path.exists());
    }
}
