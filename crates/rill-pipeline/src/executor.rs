//! Submission seam: the pipeline executor and the handles it returns.
//!
//! A [`PipelineExecutor`] accepts an immutable [`StreamGraph`] plus the
//! environment's [`ExecutionConfig`] and returns a [`JobHandle`] as soon as
//! the job is accepted. The handle's resolution happens asynchronously and is
//! observed through its completion channel.
//!
//! [`LocalPipelineExecutor`] is the in-process stand-in used by the default
//! local environment; real deployments provide their own executor.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rill_core::{Error, ExecutionConfig, JobId, Result};
use tokio::sync::oneshot;

use crate::graph::StreamGraph;

/// Final result of a successfully executed job.
#[derive(Debug, Clone)]
pub struct JobExecutionResult {
    job_id: JobId,
    net_runtime: Duration,
}

impl JobExecutionResult {
    /// Create a result for the given job.
    #[must_use]
    pub fn new(job_id: JobId, net_runtime: Duration) -> Self {
        Self {
            job_id,
            net_runtime,
        }
    }

    /// The job this result belongs to.
    #[must_use]
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Wall-clock time the job spent running.
    #[must_use]
    pub fn net_runtime(&self) -> Duration {
        self.net_runtime
    }
}

/// Reference to a submitted job.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Identifier assigned at submission time.
    fn job_id(&self) -> JobId;

    /// Wait on the completion channel for the final result.
    ///
    /// May be awaited from any task; consumes the handle because a job
    /// completes exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the job failed or the wait was
    /// interrupted or cancelled.
    async fn await_result(self: Box<Self>) -> Result<JobExecutionResult>;
}

/// Submits executable graphs and hands back job handles.
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    /// Submit a graph for execution.
    ///
    /// Blocks only long enough to obtain a handle, never for the job's
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Submission`] when no handle could be produced.
    async fn submit(
        &self,
        graph: StreamGraph,
        config: ExecutionConfig,
    ) -> Result<Box<dyn JobHandle>>;
}

/// In-process executor standing in for a real runtime.
///
/// Accepts any graph, runs it on a spawned tokio task, and resolves the
/// handle with the job's net runtime. There is nothing to actually drive —
/// running operators is the real runtime's concern — so jobs complete as soon
/// as the task runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPipelineExecutor;

/// Handle returned by [`LocalPipelineExecutor`].
pub struct LocalJobHandle {
    job_id: JobId,
    rx: oneshot::Receiver<Result<JobExecutionResult>>,
}

#[async_trait]
impl JobHandle for LocalJobHandle {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    async fn await_result(self: Box<Self>) -> Result<JobExecutionResult> {
        let job_id = self.job_id;
        self.rx
            .await
            .map_err(|_| Error::execution(job_id, "job task dropped its completion channel"))?
    }
}

#[async_trait]
impl PipelineExecutor for LocalPipelineExecutor {
    async fn submit(
        &self,
        graph: StreamGraph,
        config: ExecutionConfig,
    ) -> Result<Box<dyn JobHandle>> {
        let job_id = JobId::new();
        let (tx, rx) = oneshot::channel();

        let step_count = graph.transformations().len();
        let parallelism = config.parallelism();
        tracing::info!(
            %job_id,
            job_name = graph.job_name(),
            steps = step_count,
            ?parallelism,
            "Submitting job to local executor"
        );

        tokio::spawn(async move {
            let started = Instant::now();
            let result = JobExecutionResult::new(job_id, started.elapsed());
            // Receiver may be gone if the caller dropped the handle.
            let _ = tx.send(Ok(result));
        });

        Ok(Box::new(LocalJobHandle { job_id, rx }))
    }
}
