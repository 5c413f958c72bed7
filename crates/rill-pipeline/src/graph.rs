//! Executable-graph generation seam.
//!
//! The orchestration layer hands an immutable [`GraphPlan`] (ordered
//! transformation snapshot plus the settings that influence graph shape) to a
//! [`GraphGenerator`]. How the generator chains or fuses steps is its own
//! concern; this crate only defines the contract and a pass-through
//! implementation.

use std::sync::Arc;

use rill_core::Result;

use crate::transform::Transformation;

/// Everything the graph generator needs to build an executable graph.
#[derive(Debug, Clone)]
pub struct GraphPlan {
    /// Ordered snapshot of the declared transformations.
    pub transformations: Arc<[Transformation]>,
    /// Name the submitted job will carry.
    pub job_name: String,
    /// Whether adjacent steps may be fused into one execution unit.
    pub chaining_enabled: bool,
    /// Default maximum delay before buffered records are flushed downstream.
    pub buffer_timeout_ms: i64,
}

/// The generated, executable representation of a transformation sequence.
///
/// Immutable: every generation call produces an independent graph sharing no
/// mutable state with any other.
#[derive(Debug, Clone)]
pub struct StreamGraph {
    job_name: String,
    transformations: Arc<[Transformation]>,
    chaining_enabled: bool,
    buffer_timeout_ms: i64,
}

impl StreamGraph {
    /// Build a graph directly from a plan, preserving step order.
    #[must_use]
    pub fn from_plan(plan: GraphPlan) -> Self {
        Self {
            job_name: plan.job_name,
            transformations: plan.transformations,
            chaining_enabled: plan.chaining_enabled,
            buffer_timeout_ms: plan.buffer_timeout_ms,
        }
    }

    /// Name the submitted job will carry.
    #[must_use]
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// The ordered steps this graph was generated from.
    #[must_use]
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    /// Whether chaining was enabled at generation time.
    #[must_use]
    pub fn chaining_enabled(&self) -> bool {
        self.chaining_enabled
    }

    /// The buffer timeout the graph was generated with.
    #[must_use]
    pub fn buffer_timeout_ms(&self) -> i64 {
        self.buffer_timeout_ms
    }
}

/// Turns a [`GraphPlan`] into an executable [`StreamGraph`].
pub trait GraphGenerator: Send + Sync {
    /// Generate a graph from the plan.
    ///
    /// # Errors
    ///
    /// Implementations return [`rill_core::Error`] when the plan cannot be
    /// turned into a valid graph.
    fn generate(&self, plan: GraphPlan) -> Result<StreamGraph>;
}

/// Pass-through generator: wraps the plan as-is, with no chaining decisions.
///
/// Used by the local environment; real deployments plug in their own
/// generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanGraphGenerator;

impl GraphGenerator for PlanGraphGenerator {
    fn generate(&self, plan: GraphPlan) -> Result<StreamGraph> {
        Ok(StreamGraph::from_plan(plan))
    }
}
