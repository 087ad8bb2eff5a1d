//! Lazy, memoized module instantiation
//!
//! The manager moves through `Uninitialized -> Instantiating -> Ready` exactly
//! once. Every caller that arrives before the instance exists awaits the same
//! initialization; nobody creates a second instance. A failed initialization
//! is remembered and reported to every later caller without retrying.

use crate::engine::TransformEngine;
use crate::error::{TransformError, TransformResult};
use crate::instance::TransformInstance;
use crate::source::ModuleSource;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// When the module is instantiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// On the first transformation request
    #[default]
    Lazy,
    /// As soon as the transformer is constructed, in a background task
    Eager,
}

/// Observable lifecycle of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Instantiating,
    Ready,
    Failed,
}

/// The single shared instance, serialized behind a mutex
pub type SharedInstance = Arc<Mutex<TransformInstance>>;

/// Owns the one instance of a module for the lifetime of the manager
pub struct ModuleManager {
    engine: Arc<TransformEngine>,
    source: ModuleSource,
    slot: OnceCell<Result<SharedInstance, String>>,
    started: AtomicBool,
}

impl ModuleManager {
    pub fn new(engine: Arc<TransformEngine>, source: ModuleSource) -> Self {
        Self {
            engine,
            source,
            slot: OnceCell::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &Arc<TransformEngine> {
        &self.engine
    }

    pub fn state(&self) -> ManagerState {
        match self.slot.get() {
            Some(Ok(_)) => ManagerState::Ready,
            Some(Err(_)) => ManagerState::Failed,
            None if self.started.load(Ordering::Acquire) => ManagerState::Instantiating,
            None => ManagerState::Uninitialized,
        }
    }

    /// Wait until the instance is ready, starting instantiation if needed
    pub async fn ready(&self) -> TransformResult<SharedInstance> {
        let slot = self
            .slot
            .get_or_init(|| async {
                self.started.store(true, Ordering::Release);
                tracing::info!("Instantiating markup module from {}", self.source.describe());

                match self.instantiate().await {
                    Ok(instance) => Ok(Arc::new(Mutex::new(instance))),
                    Err(e) => {
                        tracing::error!("Markup module failed to initialize: {}", e);
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match slot {
            Ok(instance) => Ok(instance.clone()),
            Err(message) => Err(TransformError::Initialization(message.clone())),
        }
    }

    async fn instantiate(&self) -> TransformResult<TransformInstance> {
        let module = self.engine.load_source(&self.source).await?;
        TransformInstance::new(&self.engine, module).await
    }

    /// Begin instantiation in the background on the current tokio runtime.
    ///
    /// Returns `false` when no runtime is available; the manager then stays
    /// lazy and instantiates on first use.
    pub fn spawn_eager(self: &Arc<Self>) -> bool {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let manager = Arc::clone(self);
                handle.spawn(async move {
                    // failures are memoized and surface on the first call
                    let _ = manager.ready().await;
                });
                true
            }
            Err(_) => {
                tracing::warn!("No tokio runtime for eager instantiation, falling back to lazy");
                false
            }
        }
    }
}

impl std::fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleManager")
            .field("source", &self.source.describe())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TransformConfig;

    fn manager(source: ModuleSource) -> Arc<ModuleManager> {
        let engine = Arc::new(TransformEngine::new(TransformConfig::development()).unwrap());
        Arc::new(ModuleManager::new(engine, source))
    }

    #[tokio::test]
    async fn test_failure_is_memoized() {
        let manager = manager(ModuleSource::Bytes(b"garbage".to_vec()));
        assert_eq!(manager.state(), ManagerState::Uninitialized);

        let first = manager.ready().await.unwrap_err();
        assert!(matches!(first, TransformError::Initialization(_)));
        assert!(first.to_string().contains("Compilation error"));
        assert_eq!(manager.state(), ManagerState::Failed);

        let second = manager.ready().await.unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_eager_without_runtime_stays_lazy() {
        let manager = manager(ModuleSource::Bytes(Vec::new()));
        assert!(!manager.spawn_eager());
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }
}
