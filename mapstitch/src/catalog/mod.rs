//! Tile matrix catalog for capability-driven providers.
//!
//! Providers with a closed-form grid (slippy-map tiling) never touch this
//! module. WMTS providers publish their grid geometry in a GetCapabilities
//! document instead; [`CapabilitiesCatalog`] fetches that document once,
//! keeps a copy on disk so later runs skip the download, and exposes the
//! per-zoom [`TileMatrixInfo`] the coordinate transform needs.

mod parser;
mod types;

pub use parser::parse_capabilities;
pub use types::{Capabilities, CatalogError, TileMatrixInfo};

use crate::provider::AsyncHttpClient;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Loads and caches WMTS capability documents.
pub struct CapabilitiesCatalog<C: AsyncHttpClient> {
    client: C,
    url: String,
    layer: String,
    cache_file: PathBuf,
}

impl<C: AsyncHttpClient> CapabilitiesCatalog<C> {
    /// Creates a catalog for one layer of one WMTS endpoint.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the one-time document fetch
    /// * `url` - GetCapabilities URL
    /// * `layer` - layer identifier whose matrix set link is wanted
    /// * `cache_file` - where the raw XML is kept between runs
    pub fn new(
        client: C,
        url: impl Into<String>,
        layer: impl Into<String>,
        cache_file: PathBuf,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            layer: layer.into(),
            cache_file,
        }
    }

    /// Resolves the tile matrix geometry for one zoom level.
    ///
    /// Fails fatally if the document cannot be retrieved or carries no
    /// entry for the requested zoom; without this geometry no tile
    /// address can be computed.
    pub async fn load(&self, zoom: u8) -> Result<TileMatrixInfo, CatalogError> {
        let caps = self.load_all().await?;
        caps.get(zoom)
            .cloned()
            .ok_or(CatalogError::ZoomNotFound(zoom))
    }

    /// Fetches (or reads back) and parses the whole capability document.
    pub async fn load_all(&self) -> Result<Capabilities, CatalogError> {
        let xml = self.document().await?;
        let caps = parse_capabilities(&xml, &self.layer)?;
        info!(
            layer = %self.layer,
            zoom_levels = caps.len(),
            "capability document resolved"
        );
        Ok(caps)
    }

    async fn document(&self) -> Result<String, CatalogError> {
        if self.cache_file.exists() {
            debug!(path = %self.cache_file.display(), "using cached capability document");
            return Ok(tokio::fs::read_to_string(&self.cache_file).await?);
        }

        debug!(url = %self.url, "fetching capability document");
        let bytes = self
            .client
            .get(&self.url)
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;
        let xml = String::from_utf8_lossy(&bytes).into_owned();

        // The disk copy is an optimization; a failed write must not abort
        // the run that just fetched a perfectly good document.
        if let Some(parent) = self.cache_file.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(error = %e, "could not create capability cache directory");
                return Ok(xml);
            }
        }
        if let Err(e) = tokio::fs::write(&self.cache_file, &bytes).await {
            warn!(
                path = %self.cache_file.display(),
                error = %e,
                "could not persist capability document"
            );
        }

        Ok(xml)
    }
}
