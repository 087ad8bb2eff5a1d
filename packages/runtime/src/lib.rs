//! MDZ Runtime
//!
//! Host side of the markup WebAssembly module. The module exposes one export
//! per transformation (`parseMDZWasm`, `parseRMDWasm`, `parseDjotWasm`,
//! `slugifyWasm`); this crate loads it once, moves strings in and out of its
//! linear memory and turns the module's in-band `error.<Id>` sentinel into a
//! proper `Result`.
//!
//! # Architecture
//!
//! ```text
//! Transformer ──► ModuleManager ──► TransformInstance ──► TransferBuffer
//!  (façade)       (once-only init)   (store + exports)     (address 0)
//!      │
//!      └──────► sentinel::classify
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mdz_runtime::{ModuleSource, TransformConfig, Transformer};
//!
//! let transformer = Transformer::with_config(
//!     TransformConfig::default(),
//!     ModuleSource::file("zig-out/bin/mdz.wasm"),
//! )?;
//!
//! let html = transformer.parse_mdz("Hello, world!").await?;
//! assert_eq!(html, "<p>Hello, world!</p>");
//! ```

pub mod abi;
pub mod engine;
pub mod error;
pub mod instance;
pub mod limits;
pub mod manager;
pub mod memory;
pub mod module;
pub mod sentinel;
pub mod source;
pub mod transformer;

pub use abi::{Dialect, Operation};
pub use engine::{TransformConfig, TransformEngine};
pub use error::{TransformError, TransformResult};
pub use instance::TransformInstance;
pub use limits::TransformLimits;
pub use manager::{LoadMode, ManagerState, ModuleManager};
pub use memory::TransferBuffer;
pub use module::TransformModule;
pub use sentinel::{Classified, SentinelMode};
pub use source::ModuleSource;
pub use transformer::Transformer;
