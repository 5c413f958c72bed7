//! Unified error type for the rillflow workspace.
//!
//! All crates funnel their failures into [`Error`]. The variants mirror the
//! phases of a job's life: build-phase validation errors are raised
//! immediately, type-inference failures are deferred until a concrete type is
//! actually needed, and submission/execution failures carry enough context to
//! identify the affected job.

use crate::ids::JobId;
use crate::types::TypeInferenceError;

/// Unified error type covering all failure modes in rillflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input was absent, empty, or out of range.
    ///
    /// Raised synchronously at the call site, never deferred.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was attempted in a phase that forbids it, e.g. mutating
    /// the transformation registry after the first submission.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The record type of a source could not be determined.
    ///
    /// Carried inside [`TypeDescriptor::Deferred`](crate::TypeDescriptor) and
    /// surfaced only when a consumer asks for the concrete type.
    #[error("Could not determine the record type of source '{source_name}': {source}")]
    TypeInference {
        /// Display name of the source whose type is missing.
        source_name: String,
        /// The underlying inference failure.
        #[source]
        source: TypeInferenceError,
    },

    /// The pipeline executor could not produce a job handle.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The submitted job ran and failed, or waiting on its completion was
    /// interrupted or cancelled.
    #[error("Execution failed for job {job_id}: {message}")]
    Execution {
        /// The job whose execution failed.
        job_id: JobId,
        /// Human-readable failure description.
        message: String,
    },
}

impl Error {
    /// Convenience constructor for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Convenience constructor for [`Error::InvalidState`].
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState(message.into())
    }

    /// Convenience constructor for [`Error::Submission`].
    pub fn submission(message: impl Into<String>) -> Self {
        Error::Submission(message.into())
    }

    /// Convenience constructor for [`Error::Execution`].
    pub fn execution(job_id: JobId, message: impl Into<String>) -> Self {
        Error::Execution {
            job_id,
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
