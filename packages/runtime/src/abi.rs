//! ABI definitions for the markup module
//!
//! Every transformation export shares one calling convention:
//! `(addr: i32, len: i32) -> i32`. The host writes `len` bytes of UTF-8 at
//! `addr` (always 0), the module writes its result starting at address 0 and
//! returns the number of result bytes.

use crate::sentinel::SentinelMode;
use std::fmt;

/// Fixed origin of the transfer buffer inside linear memory
pub const TRANSFER_ADDR: u32 = 0;

/// WebAssembly page size in bytes
pub const WASM_PAGE_SIZE: usize = 64 * 1024;

/// Export names understood by the runtime
pub mod exports {
    /// Linear memory shared with the host
    pub const MEMORY: &str = "memory";

    /// MDZ markup to HTML
    /// Signature: (addr: i32, len: i32) -> i32
    pub const PARSE_MDZ: &str = "parseMDZWasm";

    /// RMD markup to HTML
    /// Signature: (addr: i32, len: i32) -> i32
    pub const PARSE_RMD: &str = "parseRMDWasm";

    /// Djot markup to HTML
    /// Signature: (addr: i32, len: i32) -> i32
    pub const PARSE_DJOT: &str = "parseDjotWasm";

    /// Text to slug identifier
    /// Signature: (addr: i32, len: i32) -> i32
    pub const SLUGIFY: &str = "slugifyWasm";

    /// Human readable form of the shared signature
    pub const SIGNATURE: &str = "(i32, i32) -> i32";
}

/// Markup dialects a module may implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Mdz,
    Rmd,
    Djot,
}

impl Dialect {
    pub fn export_name(&self) -> &'static str {
        match self {
            Dialect::Mdz => exports::PARSE_MDZ,
            Dialect::Rmd => exports::PARSE_RMD,
            Dialect::Djot => exports::PARSE_DJOT,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Mdz => write!(f, "MDZ"),
            Dialect::Rmd => write!(f, "RMD"),
            Dialect::Djot => write!(f, "Djot"),
        }
    }
}

/// A single callable transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Parse(Dialect),
    Slugify,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Parse(Dialect::Mdz),
        Operation::Parse(Dialect::Rmd),
        Operation::Parse(Dialect::Djot),
        Operation::Slugify,
    ];

    pub fn export_name(&self) -> &'static str {
        match self {
            Operation::Parse(dialect) => dialect.export_name(),
            Operation::Slugify => exports::SLUGIFY,
        }
    }

    /// Sentinel classification applied to this operation's output.
    ///
    /// Slugify never fails on the module side, so its output is returned as is.
    pub fn sentinel(&self, mode: SentinelMode) -> Option<SentinelMode> {
        match self {
            Operation::Parse(_) => Some(mode),
            Operation::Slugify => None,
        }
    }
}

/// Number of whole pages needed to hold `bytes`
#[inline]
pub fn pages_for(bytes: usize) -> u64 {
    bytes.div_ceil(WASM_PAGE_SIZE) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_names() {
        assert_eq!(Dialect::Mdz.export_name(), "parseMDZWasm");
        assert_eq!(Dialect::Rmd.export_name(), "parseRMDWasm");
        assert_eq!(Dialect::Djot.export_name(), "parseDjotWasm");
        assert_eq!(Operation::Slugify.export_name(), "slugifyWasm");
    }

    #[test]
    fn test_slugify_skips_sentinel() {
        assert_eq!(Operation::Slugify.sentinel(SentinelMode::SuffixScan), None);
        assert_eq!(
            Operation::Parse(Dialect::Rmd).sentinel(SentinelMode::Prefix),
            Some(SentinelMode::Prefix)
        );
    }

    #[test]
    fn test_pages_for() {
        assert_eq!(pages_for(0), 0);
        assert_eq!(pages_for(1), 1);
        assert_eq!(pages_for(WASM_PAGE_SIZE), 1);
        assert_eq!(pages_for(WASM_PAGE_SIZE + 1), 2);
    }
}
