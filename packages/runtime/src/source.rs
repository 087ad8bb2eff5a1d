//! Where the compiled module comes from
//!
//! Bundled builds embed the binary in the program (raw bytes or a base64
//! string produced by the bundler); unbundled builds read it from disk or
//! fetch it over HTTP the first time it is needed.

use crate::error::{TransformError, TransformResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Origin of a module binary
#[derive(Debug, Clone)]
pub enum ModuleSource {
    /// Bytes compiled into the program, e.g. via `include_bytes!`
    Embedded(&'static [u8]),
    /// Bytes owned at runtime
    Bytes(Vec<u8>),
    /// Base64 payload spliced in at build time
    Base64(Cow<'static, str>),
    /// Path to a `.wasm` file
    File(PathBuf),
    /// URL fetched on first use
    #[cfg(feature = "http")]
    Url(String),
}

impl ModuleSource {
    pub fn embedded(bytes: &'static [u8]) -> Self {
        ModuleSource::Embedded(bytes)
    }

    pub fn base64(payload: impl Into<Cow<'static, str>>) -> Self {
        ModuleSource::Base64(payload.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        ModuleSource::File(path.into())
    }

    #[cfg(feature = "http")]
    pub fn url(url: impl Into<String>) -> Self {
        ModuleSource::Url(url.into())
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            ModuleSource::Embedded(bytes) => format!("embedded ({} bytes)", bytes.len()),
            ModuleSource::Bytes(bytes) => format!("bytes ({} bytes)", bytes.len()),
            ModuleSource::Base64(payload) => format!("base64 ({} chars)", payload.len()),
            ModuleSource::File(path) => path.display().to_string(),
            #[cfg(feature = "http")]
            ModuleSource::Url(url) => url.clone(),
        }
    }

    /// Resolve the source to module bytes
    pub async fn read(&self) -> TransformResult<Cow<'_, [u8]>> {
        match self {
            ModuleSource::Embedded(bytes) => Ok(Cow::Borrowed(*bytes)),
            ModuleSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            ModuleSource::Base64(payload) => {
                let bytes = STANDARD.decode(payload.trim().as_bytes())?;
                Ok(Cow::Owned(bytes))
            }
            ModuleSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
                    ErrorKind::NotFound => TransformError::ModuleNotFound {
                        path: path.display().to_string(),
                    },
                    _ => TransformError::Io(e),
                })?;
                Ok(Cow::Owned(bytes))
            }
            #[cfg(feature = "http")]
            ModuleSource::Url(url) => fetch(url).await.map(Cow::Owned),
        }
    }
}

impl From<Vec<u8>> for ModuleSource {
    fn from(bytes: Vec<u8>) -> Self {
        ModuleSource::Bytes(bytes)
    }
}

impl From<&'static [u8]> for ModuleSource {
    fn from(bytes: &'static [u8]) -> Self {
        ModuleSource::Embedded(bytes)
    }
}

#[cfg(feature = "http")]
async fn fetch(url: &str) -> TransformResult<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .map_err(|_e| TransformError::ModuleNotFound {
            path: url.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(TransformError::ModuleNotFound {
            path: format!("{} (status: {})", url, response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransformError::instantiation(format!("Failed to read module bytes: {}", e)))?;

    Ok(bytes.to_vec())
}
