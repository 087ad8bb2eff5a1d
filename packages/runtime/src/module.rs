//! Compiled markup modules
//!
//! A module is validated once at compile time so that a broken build fails
//! at load, not on the first transformation.

use crate::abi::{exports, Operation};
use crate::engine::TransformEngine;
use crate::error::{TransformError, TransformResult};
use wasmtime::{Module, ValType};

/// A compiled markup module
pub struct TransformModule {
    /// Wasmtime compiled module
    module: Module,
    /// Content hash for caching
    hash: String,
    /// Transformation exports present in the module
    operations: Vec<Operation>,
}

impl TransformModule {
    /// Compile a module from bytes
    pub fn from_bytes(
        engine: &TransformEngine,
        bytes: &[u8],
        hash: String,
    ) -> TransformResult<Self> {
        let module = Module::new(engine.engine(), bytes)
            .map_err(|e| {
                TransformError::compilation(format!("Failed to compile WASM module: {}", e))
            })?;

        let operations = Self::validate_exports(&module)?;

        Ok(Self {
            module,
            hash,
            operations,
        })
    }

    /// Validate exports and collect the supported operations
    fn validate_exports(module: &Module) -> TransformResult<Vec<Operation>> {
        let has_memory = module
            .get_export(exports::MEMORY)
            .is_some_and(|export| export.memory().is_some());
        if !has_memory {
            return Err(TransformError::missing_export(exports::MEMORY));
        }

        let mut operations = Vec::new();
        for op in Operation::ALL {
            let Some(export) = module.get_export(op.export_name()) else {
                continue;
            };

            let Some(func) = export.func() else {
                return Err(TransformError::InvalidExportSignature {
                    export_name: op.export_name().to_string(),
                    expected: exports::SIGNATURE.to_string(),
                    actual: "non-function export".to_string(),
                });
            };

            let params = func.params().collect::<Vec<_>>();
            let results = func.results().collect::<Vec<_>>();
            let valid = params.len() == 2
                && results.len() == 1
                && params.iter().chain(results.iter()).all(|ty| matches!(ty, ValType::I32));

            if !valid {
                return Err(TransformError::InvalidExportSignature {
                    export_name: op.export_name().to_string(),
                    expected: exports::SIGNATURE.to_string(),
                    actual: format!("({:?}) -> {:?}", params, results),
                });
            }

            operations.push(op);
        }

        if operations.is_empty() {
            let names = Operation::ALL
                .iter()
                .map(|op| op.export_name())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(TransformError::missing_export(names));
        }

        Ok(operations)
    }

    /// Get the wasmtime module
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Get content hash
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Operations this module exports
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

impl std::fmt::Debug for TransformModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformModule")
            .field("hash", &self.hash)
            .field("operations", &self.operations)
            .finish()
    }
}
