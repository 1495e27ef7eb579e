//! Engine configuration.

use crate::fetch::DEFAULT_CONCURRENCY;
use crate::georef::{OutputFormat, DEFAULT_TRANSLATE_COMMAND};
use std::path::PathBuf;

/// Name the capability document is cached under, inside the cache folder.
pub const DEFAULT_CAPABILITIES_FILE: &str = "capabilities.xml";

/// Everything a run needs besides the bounding box and zoom.
///
/// An explicit value passed at construction; no process-wide state
/// survives across runs except the on-disk tile and capability caches.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum simultaneous tile downloads
    pub concurrency: usize,
    /// Output path stem; the intermediate mosaic and the final export
    /// take their extensions from it
    pub output_path: PathBuf,
    /// Root of the tile and capability caches
    pub cache_dir: PathBuf,
    /// Skip all cache reads and writes
    pub disable_cache: bool,
    /// Format of the final geo-tagged export
    pub output_format: OutputFormat,
    /// Capability document filename inside the cache folder
    pub capabilities_file: String,
    /// External embedding utility to invoke
    pub translate_command: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            output_path: PathBuf::from("out"),
            cache_dir: PathBuf::from("cache"),
            disable_cache: false,
            output_format: OutputFormat::Pdf,
            capabilities_file: DEFAULT_CAPABILITIES_FILE.to_string(),
            translate_command: DEFAULT_TRANSLATE_COMMAND.to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the maximum number of simultaneous downloads.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the output path stem.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the cache root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Disable tile caching for this run.
    pub fn without_cache(mut self) -> Self {
        self.disable_cache = true;
        self
    }

    /// Set the final export format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Override the embedding utility (tests use a no-op binary).
    pub fn with_translate_command(mut self, command: impl Into<String>) -> Self {
        self.translate_command = command.into();
        self
    }
}
