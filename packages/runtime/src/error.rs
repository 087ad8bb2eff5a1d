//! Error types for transformation calls

use thiserror::Error;

/// Result type for transformation operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while loading the module or calling into it
#[derive(Error, Debug)]
pub enum TransformError {
    /// The module reported a failure through the `error.` sentinel
    #[error("{function} reported {identifier}")]
    Module {
        function: String,
        identifier: String,
    },

    /// Failed to compile WASM module
    #[error("Compilation error: {message}")]
    Compilation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to instantiate WASM module
    #[error("Instantiation error: {message}")]
    Instantiation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An earlier instantiation attempt failed; the instance is never retried
    #[error("Module failed to initialize: {0}")]
    Initialization(String),

    /// Error during WASM execution (trap or host-side call failure)
    #[error("Execution error in {function}: {message}")]
    Execution { function: String, message: String },

    /// Execution exceeded fuel/instruction limit
    #[error("Out of fuel: execution exceeded {limit} instructions")]
    OutOfFuel { limit: u64 },

    /// Input does not fit in the memory the module is allowed to use
    #[error("Input of {len} bytes exceeds the {limit} byte memory limit")]
    InputTooLarge { len: usize, limit: usize },

    /// Required export not found in WASM module
    #[error("Missing required export: {export_name}")]
    MissingExport { export_name: String },

    /// Export has wrong signature
    #[error("Invalid export signature for {export_name}: expected {expected}, got {actual}")]
    InvalidExportSignature {
        export_name: String,
        expected: String,
        actual: String,
    },

    /// Memory access violation
    #[error("Memory access error: {message}")]
    MemoryAccess { message: String },

    /// The module wrote bytes that are not valid UTF-8
    #[error("{function} returned invalid UTF-8: {source}")]
    InvalidUtf8 {
        function: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Module not found
    #[error("Module not found: {path}")]
    ModuleNotFound { path: String },

    /// Embedded base64 payload could not be decoded
    #[error("Invalid embedded payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    pub fn compilation(message: impl Into<String>) -> Self {
        TransformError::Compilation {
            message: message.into(),
            source: None,
        }
    }

    pub fn instantiation(message: impl Into<String>) -> Self {
        TransformError::Instantiation {
            message: message.into(),
            source: None,
        }
    }

    pub fn execution(function: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::Execution {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn memory_access(message: impl Into<String>) -> Self {
        TransformError::MemoryAccess {
            message: message.into(),
        }
    }

    pub fn missing_export(export_name: impl Into<String>) -> Self {
        TransformError::MissingExport {
            export_name: export_name.into(),
        }
    }

    /// Identifier reported by the module, if this is a module-side failure
    pub fn module_identifier(&self) -> Option<&str> {
        match self {
            TransformError::Module { identifier, .. } => Some(identifier),
            _ => None,
        }
    }

    /// Whether this error means the module could not be brought up at all
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            TransformError::Compilation { .. }
                | TransformError::Instantiation { .. }
                | TransformError::Initialization(_)
                | TransformError::MissingExport { .. }
                | TransformError::InvalidExportSignature { .. }
                | TransformError::ModuleNotFound { .. }
                | TransformError::Base64(_)
                | TransformError::Io(_)
        )
    }
}
