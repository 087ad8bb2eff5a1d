//! Error types for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundling operations
pub type BundleResult<T> = Result<T, BundleError>;

#[derive(Error, Debug)]
pub enum BundleError {
    /// Template does not contain the marker
    #[error("Marker {marker} not found in template")]
    MarkerNotFound { marker: String },

    /// Template contains the marker more than once
    #[error("Marker {marker} appears {count} times in template, expected exactly once")]
    DuplicateMarker { marker: String, count: usize },

    /// Toolchain command could not be run or exited unsuccessfully
    #[error("Toolchain command `{command}` failed: {message}")]
    Toolchain { command: String, message: String },

    /// Build config file could not be parsed
    #[error("Invalid build config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Build config parsed but is not usable
    #[error("Invalid build config: {0}")]
    InvalidConfig(String),

    /// Unknown payload encoding name
    #[error("Unknown payload encoding: {0} (expected byte-array, base64 or fetch)")]
    UnknownEncoding(String),

    /// File IO failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BundleError::Io {
            path: path.into(),
            source,
        }
    }
}
