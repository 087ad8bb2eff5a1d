//! Instantiated markup modules
//!
//! An instance owns the store and therefore the linear memory. Calls take
//! `&mut self`: the transfer buffer is a single region, so exclusive access
//! is what keeps one call's output from being clobbered by the next input.

use crate::abi::{exports, Operation, TRANSFER_ADDR};
use crate::engine::TransformEngine;
use crate::error::{TransformError, TransformResult};
use crate::memory::TransferBuffer;
use crate::module::TransformModule;
use std::collections::HashMap;
use std::sync::Arc;
use wasmtime::{Linker, Store, StoreLimits, StoreLimitsBuilder, Trap, TypedFunc};

/// Per-store host state
pub struct StoreData {
    limits: StoreLimits,
}

/// An instantiated markup module ready for calls
pub struct TransformInstance {
    /// The store containing instance state
    store: Store<StoreData>,
    /// Reference to the module
    module: Arc<TransformModule>,
    /// Exchange region at address 0
    buffer: TransferBuffer,
    /// Typed transformation exports
    exports: HashMap<Operation, TypedFunc<(i32, i32), i32>>,
    /// Fuel granted to each call
    fuel_limit: Option<u64>,
}

impl TransformInstance {
    /// Create a new instance from a module
    pub async fn new(
        engine: &TransformEngine,
        module: Arc<TransformModule>,
    ) -> TransformResult<Self> {
        let limits = &engine.config().limits;

        let data = StoreData {
            limits: StoreLimitsBuilder::new()
                .memory_size(limits.memory_limit)
                .build(),
        };
        let mut store = Store::new(engine.engine(), data);
        store.limiter(|data| &mut data.limits);

        if let Some(fuel) = limits.fuel_limit {
            store
                .set_fuel(fuel)
                .map_err(|e| TransformError::instantiation(format!("Failed to set fuel: {}", e)))?;
        }

        // The markup modules are freestanding and import nothing
        let linker: Linker<StoreData> = Linker::new(engine.engine());
        let instance = linker
            .instantiate_async(&mut store, module.module())
            .await
            .map_err(|e| {
                TransformError::instantiation(format!("Failed to instantiate module: {}", e))
            })?;

        let memory = instance
            .get_memory(&mut store, exports::MEMORY)
            .ok_or_else(|| TransformError::missing_export(exports::MEMORY))?;

        let mut typed = HashMap::new();
        for op in module.operations() {
            let func = instance
                .get_typed_func::<(i32, i32), i32>(&mut store, op.export_name())
                .map_err(|e| TransformError::InvalidExportSignature {
                    export_name: op.export_name().to_string(),
                    expected: exports::SIGNATURE.to_string(),
                    actual: e.to_string(),
                })?;
            typed.insert(*op, func);
        }

        Ok(Self {
            store,
            module,
            buffer: TransferBuffer::new(memory, limits.memory_limit),
            exports: typed,
            fuel_limit: limits.fuel_limit,
        })
    }

    /// Run one transformation through the transfer buffer and return the raw
    /// decoded output. Sentinel classification is left to the caller.
    pub async fn invoke(&mut self, op: Operation, input: &str) -> TransformResult<String> {
        let function = op.export_name();
        let func = self
            .exports
            .get(&op)
            .cloned()
            .ok_or_else(|| TransformError::missing_export(function))?;

        if let Some(fuel) = self.fuel_limit {
            self.store.set_fuel(fuel).map_err(|e| {
                TransformError::execution(function, format!("Failed to set fuel: {}", e))
            })?;
        }

        let fuel_limit = self.fuel_limit;
        let input_len = self.buffer.write_input(&mut self.store, input)?;

        let output_len = func
            .call_async(&mut self.store, (TRANSFER_ADDR as i32, input_len as i32))
            .await
            .map_err(|e| {
                if let (Some(Trap::OutOfFuel), Some(limit)) =
                    (e.downcast_ref::<Trap>(), fuel_limit)
                {
                    return TransformError::OutOfFuel { limit };
                }
                TransformError::execution(function, format!("Call failed: {}", e))
            })?;

        if output_len < 0 {
            return Err(TransformError::execution(
                function,
                format!("Returned negative output length {}", output_len),
            ));
        }

        let bytes = self.buffer.read_output(&self.store, output_len as u32)?;
        tracing::debug!(
            "{} consumed {} bytes, produced {} bytes",
            function,
            input_len,
            bytes.len()
        );

        String::from_utf8(bytes).map_err(|source| TransformError::InvalidUtf8 {
            function: function.to_string(),
            source,
        })
    }

    /// Get the module this instance was created from
    pub fn module(&self) -> &Arc<TransformModule> {
        &self.module
    }

    /// Get memory size in bytes
    pub fn memory_size(&self) -> usize {
        self.buffer.capacity(&self.store)
    }
}

impl std::fmt::Debug for TransformInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformInstance")
            .field("module_hash", &self.module.hash())
            .field("memory_size", &self.memory_size())
            .field("operations", &self.module.operations())
            .finish()
    }
}
