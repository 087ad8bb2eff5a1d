//! Textual encodings of the module binary

use crate::error::BundleError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the binary is placed into the generated source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadEncoding {
    /// Comma separated decimal byte values, e.g. `0,97,115,109`.
    /// Valid inside `Uint8Array.from([...])` or a Rust `&[u8]` literal.
    ByteArray,
    /// Standard padded base64, decoded by the host at load time
    #[default]
    Base64,
    /// Not embedded: the marker becomes the module URL and the binary is
    /// shipped next to the generated source
    Fetch,
}

impl PayloadEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadEncoding::ByteArray => "byte-array",
            PayloadEncoding::Base64 => "base64",
            PayloadEncoding::Fetch => "fetch",
        }
    }

    pub fn embeds_binary(&self) -> bool {
        !matches!(self, PayloadEncoding::Fetch)
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadEncoding {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "byte-array" | "bytes" => Ok(PayloadEncoding::ByteArray),
            "base64" => Ok(PayloadEncoding::Base64),
            "fetch" => Ok(PayloadEncoding::Fetch),
            other => Err(BundleError::UnknownEncoding(other.to_string())),
        }
    }
}

/// `0,97,115,109` for `b"\0asm"`
pub fn byte_array_literal(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn base64_literal(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_array() {
        assert_eq!(byte_array_literal(b"\0asm\x01"), "0,97,115,109,1");
        assert_eq!(byte_array_literal(&[255]), "255");
        assert_eq!(byte_array_literal(&[]), "");
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64_literal(b"\0asm\x01\0\0\0"), "AGFzbQEAAAA=");
        assert_eq!(base64_literal(&[]), "");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "byte-array".parse::<PayloadEncoding>().unwrap(),
            PayloadEncoding::ByteArray
        );
        assert_eq!("fetch".parse::<PayloadEncoding>().unwrap(), PayloadEncoding::Fetch);
        assert!(matches!(
            "hex".parse::<PayloadEncoding>(),
            Err(BundleError::UnknownEncoding(_))
        ));
        for encoding in [
            PayloadEncoding::ByteArray,
            PayloadEncoding::Base64,
            PayloadEncoding::Fetch,
        ] {
            assert_eq!(encoding.as_str().parse::<PayloadEncoding>().unwrap(), encoding);
        }
    }
}
