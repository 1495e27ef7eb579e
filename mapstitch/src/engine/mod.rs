//! Run orchestration.
//!
//! [`TiledMapEngine`] drives one assembly run end to end: validate the
//! request, resolve the grid geometry, fetch the tiles, compose the
//! mosaic, and hand the result to the geo-reference embedder. Stage
//! transitions and tile counters are published through a shared
//! [`ProgressHandle`] so a frontend can poll without participating in
//! the pipeline.

mod config;
mod progress;

pub use config::{EngineConfig, DEFAULT_CAPABILITIES_FILE};
pub use progress::{Progress, ProgressHandle, Stage};

use crate::cache::TileStore;
use crate::catalog::{CapabilitiesCatalog, CatalogError};
use crate::coord::{
    CoordError, GeoPoint, MercatorMatrixGrid, SlippyGrid, TileBox, TileCoord, TileGrid, MAX_ZOOM,
};
use crate::fetch::TileFetcher;
use crate::georef::{GeoBounds, GeoRefError, GeoReferencer};
use crate::mosaic::{self, MosaicError};
use crate::provider::{AsyncHttpClient, BackendConfig, IgnProvider, IGN_LAYER};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Fatal errors aborting an assembly run.
///
/// Per-tile download failures are not in here: those degrade the mosaic
/// (blank regions) instead of aborting it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Mosaic(#[from] MosaicError),

    #[error(transparent)]
    GeoRef(#[from] GeoRefError),

    /// Zoom is valid in general but not served by this backend
    #[error("backend '{backend}' does not serve zoom {zoom} (serves {min}..={max})")]
    UnsupportedZoom {
        backend: String,
        zoom: u8,
        min: u8,
        max: u8,
    },
}

/// Assembles a geo-referenced raster from web-map tiles.
pub struct TiledMapEngine<C: AsyncHttpClient + Clone> {
    client: C,
    backend: BackendConfig,
    config: EngineConfig,
    progress: ProgressHandle,
}

impl<C: AsyncHttpClient + Clone> TiledMapEngine<C> {
    pub fn new(client: C, backend: BackendConfig, config: EngineConfig) -> Self {
        Self {
            client,
            backend,
            config,
            progress: ProgressHandle::new(),
        }
    }

    /// Handle a frontend polls for stage and tile-count updates.
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Runs one assembly: `upper_left`/`lower_right` bound the area,
    /// `zoom` picks the tile matrix. Returns the path of the final
    /// geo-tagged export.
    pub async fn run(
        &self,
        upper_left: GeoPoint,
        lower_right: GeoPoint,
        zoom: u8,
    ) -> Result<PathBuf, EngineError> {
        self.progress.reset();
        match self.run_inner(upper_left, lower_right, zoom).await {
            Ok(path) => {
                self.progress.set_stage(Stage::Done);
                Ok(path)
            }
            Err(e) => {
                self.progress.set_stage(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        upper_left: GeoPoint,
        lower_right: GeoPoint,
        zoom: u8,
    ) -> Result<PathBuf, EngineError> {
        self.progress.set_stage(Stage::Validating);
        self.validate(upper_left, lower_right, zoom)?;

        self.progress.set_stage(Stage::ResolvingGeometry);
        let grid = self.resolve_grid(zoom).await?;
        let min_tile = grid.to_tile(upper_left, zoom)?;
        let max_tile = grid.to_tile(lower_right, zoom)?;
        // An inverted box aborts here, before any tile download starts.
        let tile_box = TileBox::new(min_tile, max_tile)?;
        info!(
            backend = self.backend.name(),
            zoom,
            min = %tile_box.min,
            max = %tile_box.max,
            tiles = tile_box.len(),
            "tile box resolved"
        );

        self.progress.set_stage(Stage::Fetching);
        self.progress.set_total(tile_box.len());
        let provider = self.backend.build();
        let store = if self.config.disable_cache {
            None
        } else {
            Some(TileStore::new(
                self.config.cache_dir.clone(),
                provider.name(),
                provider.tile_format(),
            ))
        };
        let tiles: Vec<TileCoord> = tile_box.iter_row_major().collect();
        let fetcher = TileFetcher::new(
            self.client.clone(),
            Arc::clone(&provider),
            store,
            self.config.concurrency,
        )
        .with_progress_counter(self.progress.done_counter());
        let results = fetcher.fetch_all(&tiles).await;

        let missing = results.iter().filter(|r| r.is_missing()).count();
        if missing > 0 {
            warn!(
                missing,
                total = results.len(),
                "some tiles unavailable, leaving blank regions"
            );
        }

        self.progress.set_stage(Stage::Composing);
        let (tile_w, tile_h) = grid.tile_size();
        let image = mosaic::compose(&results, &tile_box, tile_w, tile_h);
        let mosaic_path = self.config.output_path.with_extension("jpg");
        mosaic::write_jpeg(&image, &mosaic_path)?;

        self.progress.set_stage(Stage::GeoReferencing);
        let bounds = GeoBounds::of_tile_box(&tile_box, grid.as_ref());
        let output_path = self
            .config
            .output_path
            .with_extension(self.config.output_format.extension());
        GeoReferencer::with_command(&self.config.translate_command)
            .embed(&mosaic_path, &output_path, bounds, self.config.output_format)
            .await?;

        info!(path = %output_path.display(), "export complete");
        Ok(output_path)
    }

    /// Rejects requests that can never succeed, before any I/O.
    fn validate(
        &self,
        upper_left: GeoPoint,
        lower_right: GeoPoint,
        zoom: u8,
    ) -> Result<(), EngineError> {
        for point in [upper_left, lower_right] {
            if !(crate::coord::MIN_LAT..=crate::coord::MAX_LAT).contains(&point.lat) {
                return Err(CoordError::InvalidLatitude(point.lat).into());
            }
            if !(crate::coord::MIN_LON..=crate::coord::MAX_LON).contains(&point.lon) {
                return Err(CoordError::InvalidLongitude(point.lon).into());
            }
        }
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom).into());
        }

        let provider = self.backend.build();
        if !provider.supports_zoom(zoom) {
            return Err(EngineError::UnsupportedZoom {
                backend: provider.name().to_string(),
                zoom,
                min: provider.min_zoom(),
                max: provider.max_zoom(),
            });
        }
        Ok(())
    }

    /// Resolves the tile grid for this backend and zoom.
    ///
    /// Slippy backends compute their grid in closed form; WMTS backends
    /// need one capability-document fetch (cached on disk across runs).
    async fn resolve_grid(&self, zoom: u8) -> Result<Box<dyn TileGrid>, EngineError> {
        match &self.backend {
            BackendConfig::CyclOsm => Ok(Box::new(SlippyGrid::default())),
            BackendConfig::Ign { api_key } => {
                let ign = IgnProvider::new(api_key.clone());
                let cache_file = self
                    .config
                    .cache_dir
                    .join(self.backend.name())
                    .join(&self.config.capabilities_file);
                let catalog = CapabilitiesCatalog::new(
                    self.client.clone(),
                    ign.capabilities_url(),
                    IGN_LAYER,
                    cache_file,
                );
                let info = catalog.load(zoom).await?;
                Ok(Box::new(MercatorMatrixGrid::new(zoom, info)))
            }
        }
    }
}
