//! Build-time embedding of the markup WebAssembly module
//!
//! Host sources are written as templates holding one
//! `/*generated_code_flag_marker*/`. The pipeline builds the module with an
//! optional toolchain command, then replaces the marker with the binary as a
//! byte array, as base64, or with a URL the host fetches it from. It also
//! turns the annotated specification source into a README.

pub mod config;
pub mod docs;
pub mod encoding;
pub mod error;
pub mod pipeline;
pub mod splice;

pub use config::{BuildConfig, BundleConfig, DocsConfig, ToolchainConfig, CONFIG_FILE};
pub use docs::DocsExtractor;
pub use encoding::PayloadEncoding;
pub use error::{BundleError, BundleResult};
pub use pipeline::{BuildPipeline, BuildReport, BundleReport};
pub use splice::{splice, MARKER};
