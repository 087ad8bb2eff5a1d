//! Engine configuration and module compilation
//!
//! The engine is the compilation and configuration unit for wasmtime. One
//! engine can back any number of transformers; compiled modules are shared
//! between them by content hash.

use crate::error::{TransformError, TransformResult};
use crate::limits::TransformLimits;
use crate::manager::LoadMode;
use crate::module::TransformModule;
use crate::sentinel::SentinelMode;
use crate::source::ModuleSource;
use dashmap::DashMap;
use std::sync::Arc;
use wasmtime::{Config, Engine, OptLevel};

/// Configuration for the transformation engine
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Enable parallel compilation
    pub parallel_compilation: bool,
    /// Optimization level
    pub opt_level: OptLevel,
    /// Limits applied to every instance
    pub limits: TransformLimits,
    /// When transformers bring their instance up
    pub load_mode: LoadMode,
    /// How parse output is checked for the error sentinel
    pub sentinel_mode: SentinelMode,
    /// Keep compiled modules in memory keyed by content hash
    pub cache_modules: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            parallel_compilation: true,
            opt_level: OptLevel::Speed,
            limits: TransformLimits::default(),
            load_mode: LoadMode::Lazy,
            sentinel_mode: SentinelMode::SuffixScan,
            cache_modules: true,
        }
    }
}

impl TransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Development configuration (faster compilation, less optimization)
    pub fn development() -> Self {
        Self {
            parallel_compilation: true,
            opt_level: OptLevel::None,
            limits: TransformLimits::default(),
            load_mode: LoadMode::Lazy,
            sentinel_mode: SentinelMode::SuffixScan,
            cache_modules: false,
        }
    }

    /// Long-running server configuration: instantiate eagerly so the first
    /// request does not pay for compilation
    pub fn production() -> Self {
        Self {
            parallel_compilation: true,
            opt_level: OptLevel::Speed,
            limits: TransformLimits::default(),
            load_mode: LoadMode::Eager,
            sentinel_mode: SentinelMode::SuffixScan,
            cache_modules: true,
        }
    }

    pub fn with_limits(mut self, limits: TransformLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    pub fn with_sentinel_mode(mut self, mode: SentinelMode) -> Self {
        self.sentinel_mode = mode;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_modules = false;
        self
    }

    /// Build wasmtime Config from our config
    fn to_wasmtime_config(&self) -> Config {
        let mut config = Config::new();

        config.parallel_compilation(self.parallel_compilation);
        config.cranelift_opt_level(self.opt_level);

        config.consume_fuel(self.limits.fuel_limit.is_some());
        config.async_support(true);
        config.max_wasm_stack(self.limits.max_stack_kib as usize * 1024);

        config
    }
}

/// Engine for compiling markup modules
pub struct TransformEngine {
    /// Wasmtime engine
    engine: Engine,
    /// Configuration
    config: TransformConfig,
    /// Cached compiled modules (hash -> module)
    module_cache: DashMap<String, Arc<TransformModule>>,
}

impl TransformEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: TransformConfig) -> TransformResult<Self> {
        let engine = Engine::new(&config.to_wasmtime_config()).map_err(|e| {
            TransformError::compilation(format!("Failed to create wasmtime engine: {}", e))
        })?;

        Ok(Self {
            engine,
            config,
            module_cache: DashMap::new(),
        })
    }

    /// Create with default configuration
    pub fn default_engine() -> TransformResult<Self> {
        Self::new(TransformConfig::default())
    }

    /// Get reference to wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get configuration
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Compile a module from bytes, reusing a cached compilation if present
    pub fn load_module(&self, bytes: &[u8]) -> TransformResult<Arc<TransformModule>> {
        let hash = blake3::hash(bytes).to_hex().to_string();

        if let Some(cached) = self.module_cache.get(&hash) {
            tracing::debug!("In-memory cache hit for module: {}", hash);
            return Ok(cached.clone());
        }

        let module = Arc::new(TransformModule::from_bytes(self, bytes, hash.clone())?);
        tracing::info!(
            "Compiled markup module {} ({} bytes, exports: {:?})",
            hash,
            bytes.len(),
            module.operations()
        );

        if self.config.cache_modules {
            self.module_cache.insert(hash, module.clone());
        }
        Ok(module)
    }

    /// Resolve a source to bytes and compile it
    pub async fn load_source(
        &self,
        source: &ModuleSource,
    ) -> TransformResult<Arc<TransformModule>> {
        let bytes = source.read().await?;
        self.load_module(&bytes)
    }

    /// Get number of cached modules
    pub fn cached_module_count(&self) -> usize {
        self.module_cache.len()
    }
}

impl std::fmt::Debug for TransformEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEngine")
            .field("config", &self.config)
            .field("cached_modules", &self.module_cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = TransformEngine::new(TransformConfig::development()).unwrap();
        assert_eq!(engine.cached_module_count(), 0);
    }

    #[test]
    fn test_config_development() {
        let config = TransformConfig::development();
        assert_eq!(config.opt_level, OptLevel::None);
        assert_eq!(config.load_mode, LoadMode::Lazy);
        assert!(!config.cache_modules);
    }

    #[test]
    fn test_config_production() {
        let config = TransformConfig::production();
        assert_eq!(config.opt_level, OptLevel::Speed);
        assert_eq!(config.load_mode, LoadMode::Eager);
    }

    #[test]
    fn test_invalid_bytes_fail_to_compile() {
        let engine = TransformEngine::default_engine().unwrap();
        let err = engine.load_module(b"definitely not wasm").unwrap_err();
        assert!(matches!(err, TransformError::Compilation { .. }));
        assert_eq!(engine.cached_module_count(), 0);
    }
}
