//! Execution configuration consumed during graph generation and submission.
//!
//! [`ExecutionConfig`] is the per-environment configuration surface: job
//! parallelism, network buffer timeout, operator chaining, and the job name.
//! Every field defaults sensibly so a completely empty `{}` document is valid,
//! and the setters enforce the documented ranges so an invalid value is never
//! observable.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The default name used for a job when no other name has been specified.
pub const DEFAULT_JOB_NAME: &str = "Streaming Job";

/// The default buffer timeout (max delay of records in the network stack).
pub const DEFAULT_BUFFER_TIMEOUT_MS: i64 = 100;

/// A buffer timeout of `-1` disables the batching delay entirely.
pub const BUFFER_TIMEOUT_DISABLED: i64 = -1;

/// Per-environment execution configuration.
///
/// Mutation goes through validating setters; deserialized documents are
/// checked by [`validate`](ExecutionConfig::validate) on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    parallelism: Option<usize>,
    buffer_timeout_ms: i64,
    chaining_enabled: bool,
    job_name: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            buffer_timeout_ms: DEFAULT_BUFFER_TIMEOUT_MS,
            chaining_enabled: true,
            job_name: DEFAULT_JOB_NAME.to_string(),
        }
    }
}

impl ExecutionConfig {
    /// Deserialize a config from a JSON string and validate its ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the document does not parse or a
    /// field is out of range.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)
            .map_err(|e| Error::invalid_argument(format!("config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the range invariants on every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == Some(0) {
            return Err(Error::invalid_argument("parallelism must be at least 1"));
        }
        if self.buffer_timeout_ms < BUFFER_TIMEOUT_DISABLED {
            return Err(Error::invalid_argument(
                "buffer timeout must be non-negative or -1",
            ));
        }
        if self.job_name.is_empty() {
            return Err(Error::invalid_argument("job name must not be empty"));
        }
        Ok(())
    }

    /// The configured job parallelism, or `None` when unset.
    #[must_use]
    pub fn parallelism(&self) -> Option<usize> {
        self.parallelism
    }

    /// Set the job parallelism.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `parallelism` is zero.
    pub fn set_parallelism(&mut self, parallelism: usize) -> Result<&mut Self> {
        if parallelism == 0 {
            return Err(Error::invalid_argument("parallelism must be at least 1"));
        }
        self.parallelism = Some(parallelism);
        Ok(self)
    }

    /// Maximum delay, in milliseconds, before buffered records are flushed
    /// downstream. [`BUFFER_TIMEOUT_DISABLED`] (`-1`) means no batching delay.
    #[must_use]
    pub fn buffer_timeout_ms(&self) -> i64 {
        self.buffer_timeout_ms
    }

    /// Set the buffer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `timeout_ms` is below `-1`.
    pub fn set_buffer_timeout_ms(&mut self, timeout_ms: i64) -> Result<&mut Self> {
        if timeout_ms < BUFFER_TIMEOUT_DISABLED {
            return Err(Error::invalid_argument(
                "buffer timeout must be non-negative or -1",
            ));
        }
        self.buffer_timeout_ms = timeout_ms;
        Ok(self)
    }

    /// Whether the graph generator may fuse adjacent steps into one execution
    /// unit.
    #[must_use]
    pub fn chaining_enabled(&self) -> bool {
        self.chaining_enabled
    }

    /// Enable or disable operator chaining.
    pub fn set_chaining_enabled(&mut self, enabled: bool) -> &mut Self {
        self.chaining_enabled = enabled;
        self
    }

    /// The name used for submitted jobs.
    #[must_use]
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Set the job name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `job_name` is empty.
    pub fn set_job_name(&mut self, job_name: impl Into<String>) -> Result<&mut Self> {
        let job_name = job_name.into();
        if job_name.is_empty() {
            return Err(Error::invalid_argument("job name must not be empty"));
        }
        self.job_name = job_name;
        Ok(self)
    }
}
