//! rill-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for the other rill-* crates,
//! providing type-safe identifiers, a unified error type, the execution
//! configuration consumed during job submission, and the runtime type
//! descriptors attached to declared sources.

pub mod config;
pub mod error;
pub mod ids;
pub mod types;

// Re-export the most commonly used items at the crate root.
pub use config::{
    ExecutionConfig, BUFFER_TIMEOUT_DISABLED, DEFAULT_BUFFER_TIMEOUT_MS, DEFAULT_JOB_NAME,
};
pub use error::{Error, Result};
pub use ids::*;
pub use types::{TypeDescriptor, TypeInferenceError, TypeInfo};
