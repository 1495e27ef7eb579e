//! Map tile provider abstraction
//!
//! This module provides traits and implementations for addressing map
//! tiles on various servers (CyclOSM slippy-map tiles, IGN WMTS), plus
//! the HTTP client seam the rest of the crate performs network I/O
//! through.

mod cyclosm;
mod http;
mod ign;
mod types;

pub use cyclosm::CyclOsmProvider;
pub use http::{AsyncHttpClient, ReqwestClient};
pub use ign::{IgnProvider, IGN_LAYER, IGN_MATRIX_SET};
pub use types::{ProviderError, TileProvider};

#[cfg(test)]
pub(crate) use http::tests::MockHttpClient;

use std::sync::Arc;

/// Configuration selecting a tile backend.
///
/// Encapsulates everything needed to create a provider; new backends are
/// added as new variants without touching existing ones.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// CyclOSM raster tiles on the standard slippy-map grid.
    ///
    /// No API key required.
    CyclOsm,

    /// IGN Géoportail WMTS tiles on a capability-driven grid.
    Ign {
        /// Géoportail API key
        api_key: String,
    },
}

impl BackendConfig {
    /// Create a CyclOSM backend configuration.
    pub fn cyclosm() -> Self {
        Self::CyclOsm
    }

    /// Create an IGN backend configuration with the given API key.
    pub fn ign(api_key: impl Into<String>) -> Self {
        Self::Ign {
            api_key: api_key.into(),
        }
    }

    /// Returns the backend name for logging and cache layout.
    pub fn name(&self) -> &str {
        match self {
            Self::CyclOsm => "cyclosm",
            Self::Ign { .. } => "ign",
        }
    }

    /// Builds the provider for this configuration.
    pub fn build(&self) -> Arc<dyn TileProvider> {
        match self {
            Self::CyclOsm => Arc::new(CyclOsmProvider::new()),
            Self::Ign { api_key } => Arc::new(IgnProvider::new(api_key.clone())),
        }
    }
}
