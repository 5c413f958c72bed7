//! Submission and execution workflows.
//!
//! This module drives the lifecycle of turning the accumulated transformation
//! sequence into a submitted job: graph generation, asynchronous submission,
//! and the blocking wait for a final result. Each submission moves through
//! `Built -> Submitted -> {Completed | Failed}`; terminal states trigger
//! exactly one `on_completed` call per listener.
//!
//! Failures are never swallowed: an execution failure propagates to the
//! caller *and* is still delivered to every listener.

use std::sync::Arc;

use rill_core::{Error, Result};

use crate::environment::StreamEnvironment;
use crate::executor::{JobExecutionResult, JobHandle};
use crate::graph::{GraphPlan, StreamGraph};
use crate::listener::{notify_completed, notify_submitted};

/// Lifecycle state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// The graph exists but no handle has been obtained yet.
    Built,
    /// A handle was obtained; listeners have been told.
    Submitted,
    /// Terminal: the job produced a final result.
    Completed,
    /// Terminal: the job failed, or waiting on it was interrupted.
    Failed,
}

impl StreamEnvironment {
    /// Generate an executable graph from the current transformation snapshot,
    /// using the configured job name.
    ///
    /// Each call produces an independent graph; no graph shares mutable state
    /// with another.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when no transformations have been declared.
    pub fn stream_graph(&self) -> Result<StreamGraph> {
        self.stream_graph_named(self.job_name())
    }

    /// Generate an executable graph under an explicit job name.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty name or an empty registry.
    pub fn stream_graph_named(&self, job_name: &str) -> Result<StreamGraph> {
        if job_name.is_empty() {
            return Err(Error::invalid_argument("job name must not be empty"));
        }
        if self.registry().is_empty() {
            return Err(Error::invalid_argument(
                "no transformations declared: the job would be empty",
            ));
        }

        let plan = GraphPlan {
            transformations: self.registry().snapshot(),
            job_name: job_name.to_string(),
            chaining_enabled: self.config().chaining_enabled(),
            buffer_timeout_ms: self.config().buffer_timeout_ms(),
        };
        self.generator().generate(plan)
    }

    /// Submit a graph and return as soon as a handle exists.
    ///
    /// Seals the environment, then notifies `on_submitted` on every listener
    /// in registration order; a listener failure is contained and does not
    /// affect the others or the returned handle.
    ///
    /// # Errors
    ///
    /// [`Error::Submission`] when the executor could not produce a handle; in
    /// that case no listener is notified and the environment stays mutable.
    pub async fn submit_graph(&mut self, graph: StreamGraph) -> Result<Box<dyn JobHandle>> {
        let job_name = graph.job_name().to_string();
        tracing::debug!(job_name = %job_name, state = ?SubmissionState::Built, "Submitting graph");

        let executor = Arc::clone(self.executor());
        let handle = executor.submit(graph, self.config().clone()).await?;

        self.seal();
        tracing::info!(
            job_id = %handle.job_id(),
            job_name = %job_name,
            state = ?SubmissionState::Submitted,
            "Job submitted"
        );
        notify_submitted(self.listeners(), handle.as_ref());
        Ok(handle)
    }

    /// Generate a graph from the current snapshot and submit it.
    ///
    /// # Errors
    ///
    /// See [`stream_graph`](Self::stream_graph) and
    /// [`submit_graph`](Self::submit_graph).
    pub async fn execute_async(&mut self) -> Result<Box<dyn JobHandle>> {
        let graph = self.stream_graph()?;
        self.submit_graph(graph).await
    }

    /// Run the job under the configured name and wait for its final result.
    ///
    /// # Errors
    ///
    /// Propagates submission failures, and [`Error::Execution`] when the job
    /// fails or the wait is interrupted. In every terminal case each listener
    /// receives exactly one `on_completed` call carrying the outcome.
    pub async fn execute(&mut self) -> Result<JobExecutionResult> {
        let name = self.job_name().to_string();
        self.execute_named(&name).await
    }

    /// Run the job under an explicit name and wait for its final result.
    ///
    /// # Errors
    ///
    /// Same contract as [`execute`](Self::execute).
    pub async fn execute_named(&mut self, job_name: &str) -> Result<JobExecutionResult> {
        let graph = self.stream_graph_named(job_name)?;
        let handle = self.submit_graph(graph).await?;
        let job_id = handle.job_id();

        // Blocking wait on the completion channel; no lock is held across it.
        match handle.await_result().await {
            Ok(result) => {
                tracing::info!(
                    %job_id,
                    runtime_ms = result.net_runtime().as_millis() as u64,
                    state = ?SubmissionState::Completed,
                    "Job completed"
                );
                notify_completed(self.listeners(), Ok(&result));
                Ok(result)
            }
            Err(error) => {
                tracing::warn!(
                    %job_id,
                    error = %error,
                    state = ?SubmissionState::Failed,
                    "Job failed"
                );
                notify_completed(self.listeners(), Err(&error));
                Err(error)
            }
        }
    }
}
