//! Resource limits for module instances

use serde::{Deserialize, Serialize};

/// Default memory limit: 64MB
pub const DEFAULT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// Default fuel limit per call when metering is enabled: ~10s of compute
pub const DEFAULT_FUEL_LIMIT: u64 = 10_000_000_000;

/// Resource limits applied to every instance created by an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformLimits {
    /// Maximum linear memory in bytes (default: 64MB).
    /// Also the largest input the transfer buffer accepts.
    pub memory_limit: usize,

    /// Fuel granted to each call; `None` disables metering
    pub fuel_limit: Option<u64>,

    /// Maximum wasm stack in KiB
    pub max_stack_kib: u32,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            fuel_limit: None,
            max_stack_kib: 512,
        }
    }
}

impl TransformLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight limits for untrusted input
    pub fn restrictive() -> Self {
        Self {
            memory_limit: 16 * 1024 * 1024, // 16MB
            fuel_limit: Some(1_000_000_000),
            max_stack_kib: 256,
        }
    }

    /// Loose limits for large trusted documents
    pub fn permissive() -> Self {
        Self {
            memory_limit: 256 * 1024 * 1024, // 256MB
            fuel_limit: None,
            max_stack_kib: 1024,
        }
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    pub fn with_fuel_limit(mut self, fuel: u64) -> Self {
        self.fuel_limit = Some(fuel);
        self
    }

    pub fn without_fuel(mut self) -> Self {
        self.fuel_limit = None;
        self
    }
}
