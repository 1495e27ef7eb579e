//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and appropriate exit codes.

use mapstitch::engine::EngineError;
use mapstitch::georef::GeoRefError;
use mapstitch::provider::ProviderError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid command-line input
    Config(String),
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// The assembly run failed
    Run(EngineError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Run(EngineError::GeoRef(GeoRefError::Spawn { .. })) => {
                eprintln!();
                eprintln!("The geo-reference step needs GDAL:");
                eprintln!("  1. Debian/Ubuntu: sudo apt install gdal-bin");
                eprintln!("  2. macOS: brew install gdal");
                eprintln!("  3. Or point --translate-command at your gdal_translate");
            }
            CliError::Run(EngineError::Catalog(_)) => {
                eprintln!();
                eprintln!("Could not resolve the WMTS capability document. Check:");
                eprintln!("  1. Your API key is valid for the Géoportail WMTS service");
                eprintln!("  2. The endpoint is reachable from this machine");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Invalid input: {}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Run(e) => write!(f, "Assembly failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::HttpClient(e) => Some(e),
            CliError::Run(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Run(e)
    }
}
