//! MapStitch - geo-referenced raster assembly from web-map tiles
//!
//! This library downloads map tiles covering a geographic bounding box,
//! stitches them into a single mosaic, and embeds WGS84 geospatial
//! metadata into the result via an external GDAL utility.
//!
//! # High-Level API
//!
//! Most callers go through the [`engine`] module:
//!
//! ```ignore
//! use mapstitch::coord::GeoPoint;
//! use mapstitch::engine::{EngineConfig, TiledMapEngine};
//! use mapstitch::provider::{BackendConfig, ReqwestClient};
//!
//! let client = ReqwestClient::new()?;
//! let engine = TiledMapEngine::new(client, BackendConfig::cyclosm(), EngineConfig::default());
//! let export = engine
//!     .run(GeoPoint::new(45.90, 6.60), GeoPoint::new(45.70, 7.00), 12)
//!     .await?;
//! ```

pub mod cache;
pub mod catalog;
pub mod coord;
pub mod engine;
pub mod fetch;
pub mod georef;
pub mod logging;
pub mod mosaic;
pub mod provider;

/// Version of the MapStitch library and CLI.
///
/// Synchronized across the workspace; defined in `Cargo.toml` and
/// injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
