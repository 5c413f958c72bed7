//! # rill-pipeline
//!
//! Declarative stream-job building and execution orchestration.
//!
//! This crate provides:
//!
//! - **[`StreamEnvironment`]** -- per-session configuration, the ordered
//!   transformation registry, and source declaration with output-type
//!   resolution.
//! - **[`SourceFunction`]** trait -- capability-based source contract
//!   (self-described type, parallelism, structural inference).
//! - **[`GraphGenerator`]** / **[`PipelineExecutor`]** seams -- the external
//!   collaborators that build and run executable graphs.
//! - **[`JobListener`]** -- lifecycle observer notified of submission and
//!   completion with per-listener error containment.
//! - **Factory resolution** ([`factory`]) -- thread-scoped and process-wide
//!   overrides for how environments are constructed, with a local fallback.
//!
//! Submission workflows (`stream_graph`, `execute_async`, `execute`) live in
//! [`orchestrator`] as `impl StreamEnvironment` blocks.

pub mod environment;
pub mod executor;
pub mod factory;
pub mod graph;
pub mod listener;
pub mod orchestrator;
pub mod source;
pub mod transform;

// Re-export key types at the crate root.
pub use environment::StreamEnvironment;
pub use executor::{
    JobExecutionResult, JobHandle, LocalJobHandle, LocalPipelineExecutor, PipelineExecutor,
};
pub use factory::{
    current_factory, reset_factories, scoped_factory, set_process_factory, EnvironmentFactory,
    FactoryScope,
};
pub use graph::{GraphGenerator, GraphPlan, PlanGraphGenerator, StreamGraph};
pub use listener::{CompletionOutcome, JobListener};
pub use orchestrator::SubmissionState;
pub use source::{resolve_source_type, CollectionSource, SourceFunction};
pub use transform::{Transformation, TransformationRegistry};
