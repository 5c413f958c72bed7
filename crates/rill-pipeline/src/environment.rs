//! The stream environment: build-phase configuration and step accumulation.
//!
//! A [`StreamEnvironment`] is created by the caller, lives for one
//! build+run session, and owns the execution configuration, the ordered
//! transformation registry, and the listener list. Sources are declared
//! through it, going through type resolution as they are added.
//!
//! Once orchestration begins (the first submission), the environment is
//! sealed: registry and configuration mutation fail fast with
//! [`Error::InvalidState`].

use std::sync::Arc;

use rill_core::{Error, ExecutionConfig, Result, TypeDescriptor, TypeInfo};

use crate::executor::{LocalPipelineExecutor, PipelineExecutor};
use crate::factory;
use crate::graph::{GraphGenerator, PlanGraphGenerator};
use crate::listener::JobListener;
use crate::source::{resolve_source_type, CollectionSource, SourceFunction};
use crate::transform::{Transformation, TransformationRegistry};

/// Process-scoped configuration and step registry for one stream job session.
pub struct StreamEnvironment {
    config: ExecutionConfig,
    registry: TransformationRegistry,
    listeners: Vec<Arc<dyn JobListener>>,
    generator: Arc<dyn GraphGenerator>,
    executor: Arc<dyn PipelineExecutor>,
    sealed: bool,
}

impl std::fmt::Debug for StreamEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEnvironment")
            .field("config", &self.config)
            .field("transformations", &self.registry.len())
            .field("listeners", &self.listeners.len())
            .field("sealed", &self.sealed)
            .finish_non_exhaustive()
    }
}

impl StreamEnvironment {
    /// Create an environment wired to the given collaborators.
    pub fn new(generator: Arc<dyn GraphGenerator>, executor: Arc<dyn PipelineExecutor>) -> Self {
        Self::with_config(ExecutionConfig::default(), generator, executor)
    }

    /// Create an environment with an explicit starting configuration.
    pub fn with_config(
        config: ExecutionConfig,
        generator: Arc<dyn GraphGenerator>,
        executor: Arc<dyn PipelineExecutor>,
    ) -> Self {
        Self {
            config,
            registry: TransformationRegistry::new(),
            listeners: Vec::new(),
            generator,
            executor,
            sealed: false,
        }
    }

    /// Create a local environment sized to the host's parallel-execution
    /// capacity.
    #[must_use]
    pub fn create_local_environment() -> Self {
        Self::create_local_environment_with_parallelism(num_cpus::get().max(1))
    }

    /// Create a local environment with an explicit parallelism.
    #[must_use]
    pub fn create_local_environment_with_parallelism(parallelism: usize) -> Self {
        let mut config = ExecutionConfig::default();
        // Clamped to at least 1, so the setter cannot fail.
        let _ = config.set_parallelism(parallelism.max(1));
        Self::with_config(
            config,
            Arc::new(PlanGraphGenerator),
            Arc::new(LocalPipelineExecutor),
        )
    }

    /// Resolve the active environment-construction strategy.
    ///
    /// Uses the thread-scoped factory if one is in scope, else the
    /// process-wide factory, else falls back to
    /// [`create_local_environment`](Self::create_local_environment).
    #[must_use]
    pub fn get_execution_environment() -> Self {
        match factory::current_factory() {
            Some(factory) => factory.create_environment(),
            None => Self::create_local_environment(),
        }
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.sealed {
            return Err(Error::invalid_state(
                "environment is sealed: a job has already been submitted",
            ));
        }
        Ok(())
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether a job has already been submitted from this environment.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    // -- Configuration ------------------------------------------------------

    /// Read-only view of the execution configuration.
    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Set the job parallelism.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `parallelism` is zero;
    /// [`Error::InvalidState`] after the first submission.
    pub fn set_parallelism(&mut self, parallelism: usize) -> Result<&mut Self> {
        self.ensure_mutable()?;
        self.config.set_parallelism(parallelism)?;
        Ok(self)
    }

    /// Set the buffer timeout in milliseconds (`-1` disables batching delay).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `timeout_ms` is below `-1`;
    /// [`Error::InvalidState`] after the first submission.
    pub fn set_buffer_timeout_ms(&mut self, timeout_ms: i64) -> Result<&mut Self> {
        self.ensure_mutable()?;
        self.config.set_buffer_timeout_ms(timeout_ms)?;
        Ok(self)
    }

    /// Enable or disable operator chaining.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] after the first submission.
    pub fn set_chaining_enabled(&mut self, enabled: bool) -> Result<&mut Self> {
        self.ensure_mutable()?;
        self.config.set_chaining_enabled(enabled);
        Ok(self)
    }

    /// Set the default job name.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `job_name` is empty;
    /// [`Error::InvalidState`] after the first submission.
    pub fn set_job_name(&mut self, job_name: impl Into<String>) -> Result<&mut Self> {
        self.ensure_mutable()?;
        self.config.set_job_name(job_name)?;
        Ok(self)
    }

    /// The configured job name.
    #[must_use]
    pub fn job_name(&self) -> &str {
        self.config.job_name()
    }

    // -- Listeners ----------------------------------------------------------

    /// Register a job listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn JobListener>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    pub(crate) fn listeners(&self) -> &[Arc<dyn JobListener>] {
        &self.listeners
    }

    pub(crate) fn generator(&self) -> &Arc<dyn GraphGenerator> {
        &self.generator
    }

    pub(crate) fn executor(&self) -> &Arc<dyn PipelineExecutor> {
        &self.executor
    }

    // -- Step declaration ---------------------------------------------------

    /// Number of declared transformations.
    #[must_use]
    pub fn transformation_count(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn registry(&self) -> &TransformationRegistry {
        &self.registry
    }

    /// Append an already-built transformation.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty name;
    /// [`Error::InvalidState`] after the first submission.
    pub fn add_transformation(&mut self, transformation: Transformation) -> Result<()> {
        self.ensure_mutable()?;
        self.registry.append(transformation)
    }

    /// Declare a source step, resolving its output type.
    ///
    /// Non-parallel sources are pinned to a parallelism of 1. Returns the
    /// resolved (or deferred) type descriptor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty `name`;
    /// [`Error::InvalidState`] after the first submission.
    pub fn add_source(
        &mut self,
        source: &dyn SourceFunction,
        name: &str,
        declared: Option<TypeInfo>,
    ) -> Result<TypeDescriptor> {
        self.ensure_mutable()?;
        if name.is_empty() {
            return Err(Error::invalid_argument("source name must not be empty"));
        }

        let descriptor = resolve_source_type(source, declared, name);
        let mut transformation = Transformation::new(name, descriptor.clone());
        if !source.is_parallel() {
            transformation = transformation.with_parallelism(1)?;
        }
        self.registry.append(transformation)?;
        Ok(descriptor)
    }

    /// Declare a source backed by an in-memory collection.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `data` is empty;
    /// [`Error::InvalidState`] after the first submission.
    pub fn from_collection<T: Send + Sync + 'static>(
        &mut self,
        data: Vec<T>,
    ) -> Result<TypeDescriptor> {
        if data.is_empty() {
            return Err(Error::invalid_argument(
                "from_collection needs at least one element",
            ));
        }
        let source = CollectionSource::new(data);
        self.add_source(&source, "Collection Source", None)
    }

    /// Declare a source from a slice of cloneable elements.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `elements` is empty;
    /// [`Error::InvalidState`] after the first submission.
    pub fn from_elements<T: Clone + Send + Sync + 'static>(
        &mut self,
        elements: &[T],
    ) -> Result<TypeDescriptor> {
        self.from_collection(elements.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rill_core::{TypeInferenceError, DEFAULT_JOB_NAME};

    struct Erased;

    impl SourceFunction for Erased {}

    struct ParallelSource;

    impl SourceFunction for ParallelSource {
        fn is_parallel(&self) -> bool {
            true
        }

        fn static_record_type(&self) -> std::result::Result<TypeInfo, TypeInferenceError> {
            Ok(TypeInfo::of::<u64>())
        }
    }

    #[test]
    fn local_environment_defaults() {
        let env = StreamEnvironment::create_local_environment();
        assert!(env.config().parallelism().is_some());
        assert_eq!(env.job_name(), DEFAULT_JOB_NAME);
        assert!(!env.is_sealed());
        assert_eq!(env.transformation_count(), 0);
    }

    #[test]
    fn local_environment_respects_explicit_parallelism() {
        let env = StreamEnvironment::create_local_environment_with_parallelism(3);
        assert_eq!(env.config().parallelism(), Some(3));
    }

    #[test]
    fn setters_validate() {
        let mut env = StreamEnvironment::create_local_environment();
        assert_matches!(
            env.set_buffer_timeout_ms(-2),
            Err(Error::InvalidArgument(_))
        );
        env.set_buffer_timeout_ms(-1).unwrap();
        env.set_buffer_timeout_ms(0).unwrap();
        assert_matches!(env.set_parallelism(0), Err(Error::InvalidArgument(_)));
        env.set_parallelism(2).unwrap();
    }

    #[test]
    fn add_source_pins_non_parallel_sources() {
        let mut env = StreamEnvironment::create_local_environment();
        env.from_collection(vec![1u32, 2, 3]).unwrap();

        let snapshot = env.registry().snapshot();
        assert_eq!(snapshot[0].parallelism(), Some(1));
    }

    #[test]
    fn add_source_leaves_parallel_sources_unpinned() {
        let mut env = StreamEnvironment::create_local_environment();
        env.add_source(&ParallelSource, "counter", None).unwrap();

        let snapshot = env.registry().snapshot();
        assert_eq!(snapshot[0].parallelism(), None);
    }

    #[test]
    fn add_source_rejects_empty_name() {
        let mut env = StreamEnvironment::create_local_environment();
        let result = env.add_source(&Erased, "", None);
        assert_matches!(result, Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn erased_source_is_deferred_not_fatal() {
        let mut env = StreamEnvironment::create_local_environment();
        let descriptor = env.add_source(&Erased, "mySource", None).unwrap();
        assert!(!descriptor.is_resolved());
        // The step was still declared.
        assert_eq!(env.transformation_count(), 1);
    }

    #[test]
    fn from_collection_rejects_empty() {
        let mut env = StreamEnvironment::create_local_environment();
        let result = env.from_collection(Vec::<u8>::new());
        assert_matches!(result, Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn from_elements_resolves_type() {
        let mut env = StreamEnvironment::create_local_environment();
        let descriptor = env.from_elements(&["a", "b"]).unwrap();
        assert!(descriptor.concrete().unwrap().is::<&str>());
    }

    #[test]
    fn sealed_environment_rejects_mutation() {
        let mut env = StreamEnvironment::create_local_environment();
        env.from_collection(vec![1u8]).unwrap();
        env.seal();

        assert_matches!(env.set_parallelism(2), Err(Error::InvalidState(_)));
        assert_matches!(env.set_buffer_timeout_ms(0), Err(Error::InvalidState(_)));
        assert_matches!(env.set_chaining_enabled(false), Err(Error::InvalidState(_)));
        assert_matches!(env.set_job_name("late"), Err(Error::InvalidState(_)));
        assert_matches!(
            env.from_collection(vec![2u8]),
            Err(Error::InvalidState(_))
        );
        let result = env.add_transformation(Transformation::new(
            "late",
            TypeDescriptor::resolved::<u8>(),
        ));
        assert_matches!(result, Err(Error::InvalidState(_)));
    }
}
