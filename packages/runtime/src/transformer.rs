//! Host-facing transformation API
//!
//! Each operation is: ensure the instance is ready, run the call through the
//! transfer buffer while holding the instance lock, then turn the raw output
//! into a `Result`.

use crate::abi::{Dialect, Operation};
use crate::engine::{TransformConfig, TransformEngine};
use crate::error::{TransformError, TransformResult};
use crate::manager::{LoadMode, ManagerState, ModuleManager};
use crate::sentinel::{classify, SentinelMode};
use crate::source::ModuleSource;
use std::sync::Arc;

/// Façade over one markup module
#[derive(Debug, Clone)]
pub struct Transformer {
    manager: Arc<ModuleManager>,
    sentinel_mode: SentinelMode,
}

impl Transformer {
    /// Create a transformer on a shared engine, honouring the engine's load mode
    pub fn new(engine: Arc<TransformEngine>, source: ModuleSource) -> Self {
        let load_mode = engine.config().load_mode;
        let sentinel_mode = engine.config().sentinel_mode;
        let manager = Arc::new(ModuleManager::new(engine, source));

        if load_mode == LoadMode::Eager {
            manager.spawn_eager();
        }

        Self {
            manager,
            sentinel_mode,
        }
    }

    /// Create a transformer with its own engine
    pub fn with_config(config: TransformConfig, source: ModuleSource) -> TransformResult<Self> {
        let engine = Arc::new(TransformEngine::new(config)?);
        Ok(Self::new(engine, source))
    }

    /// Transformer for a module embedded in the program
    pub fn embedded(bytes: &'static [u8]) -> TransformResult<Self> {
        Self::with_config(TransformConfig::default(), ModuleSource::embedded(bytes))
    }

    pub fn state(&self) -> ManagerState {
        self.manager.state()
    }

    /// Wait for instantiation without running a transformation
    pub async fn ready(&self) -> TransformResult<()> {
        self.manager.ready().await.map(|_| ())
    }

    /// Operations the loaded module exports
    pub async fn available_operations(&self) -> TransformResult<Vec<Operation>> {
        let instance = self.manager.ready().await?;
        let guard = instance.lock().await;
        Ok(guard.module().operations().to_vec())
    }

    /// Markup to HTML in the given dialect. Fails with
    /// [`TransformError::Module`] when the module rejects the input.
    pub async fn parse(&self, dialect: Dialect, input: &str) -> TransformResult<String> {
        self.call(Operation::Parse(dialect), input).await
    }

    pub async fn parse_mdz(&self, input: &str) -> TransformResult<String> {
        self.parse(Dialect::Mdz, input).await
    }

    pub async fn parse_rmd(&self, input: &str) -> TransformResult<String> {
        self.parse(Dialect::Rmd, input).await
    }

    pub async fn parse_djot(&self, input: &str) -> TransformResult<String> {
        self.parse(Dialect::Djot, input).await
    }

    /// Convert text into a slug identifier. The module never reports errors
    /// for this operation; failures here come from loading or memory.
    pub async fn slugify(&self, input: &str) -> TransformResult<String> {
        self.call(Operation::Slugify, input).await
    }

    /// Run any operation with the configured sentinel handling
    pub async fn call(&self, op: Operation, input: &str) -> TransformResult<String> {
        let instance = self.manager.ready().await?;

        // Held until the output is decoded: input and output share address 0
        let output = {
            let mut guard = instance.lock().await;
            guard.invoke(op, input).await?
        };

        let Some(mode) = op.sentinel(self.sentinel_mode) else {
            return Ok(output);
        };

        classify(output, mode).into_result().map_err(|identifier| {
            tracing::debug!("{} reported {}", op.export_name(), identifier);
            TransformError::Module {
                function: op.export_name().to_string(),
                identifier,
            }
        })
    }
}
