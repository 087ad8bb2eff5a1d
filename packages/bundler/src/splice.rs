//! Marker substitution
//!
//! Templates carry a single marker where the payload goes. Everything else in
//! the template, including the comment syntax around the marker, is copied
//! through byte for byte. Templates are handled as raw bytes, so any encoding
//! outside the marker survives untouched.

use crate::error::{BundleError, BundleResult};
use memchr::memmem;

/// Default marker, a block comment so the template stays valid source
pub const MARKER: &str = "/*generated_code_flag_marker*/";

/// Byte offset of the only occurrence of `marker` in `template`
pub fn locate_marker(template: &[u8], marker: &str) -> BundleResult<usize> {
    if marker.is_empty() {
        return Err(BundleError::InvalidConfig("marker must not be empty".to_string()));
    }

    let mut matches = memmem::find_iter(template, marker.as_bytes());
    let start = matches.next().ok_or_else(|| BundleError::MarkerNotFound {
        marker: marker.to_string(),
    })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(BundleError::DuplicateMarker {
            marker: marker.to_string(),
            count: extra + 1,
        });
    }

    Ok(start)
}

/// Replace the marker with `payload`
pub fn splice(template: &[u8], marker: &str, payload: &str) -> BundleResult<Vec<u8>> {
    let start = locate_marker(template, marker)?;
    let end = start + marker.len();

    let mut output = Vec::with_capacity(template.len() - marker.len() + payload.len());
    output.extend_from_slice(&template[..start]);
    output.extend_from_slice(payload.as_bytes());
    output.extend_from_slice(&template[end..]);
    Ok(output)
}
