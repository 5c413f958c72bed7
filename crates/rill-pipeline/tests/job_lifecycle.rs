//! Job lifecycle integration tests.
//!
//! Drives the full build -> submit -> complete path through the public API,
//! using the in-process local executor and the environment-factory overrides.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rill_core::{Error, JobId, TypeInfo, DEFAULT_JOB_NAME};
use rill_pipeline::{
    reset_factories, scoped_factory, set_process_factory, CompletionOutcome, EnvironmentFactory,
    JobHandle, JobListener, SourceFunction, StreamEnvironment,
};
use serial_test::serial;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rill_pipeline=debug,rill_core=debug")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Submitted(JobId),
    Completed { ok: bool },
}

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl JobListener for RecordingListener {
    fn on_submitted(&self, handle: &dyn JobHandle) -> rill_core::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Submitted(handle.job_id()));
        Ok(())
    }

    fn on_completed(&self, outcome: CompletionOutcome<'_>) -> rill_core::Result<()> {
        self.events.lock().unwrap().push(Event::Completed {
            ok: outcome.is_ok(),
        });
        Ok(())
    }
}

struct SelfDescribingSource;

impl SourceFunction for SelfDescribingSource {
    fn produced_type(&self) -> Option<TypeInfo> {
        Some(TypeInfo::of::<String>())
    }
}

// Overrides nothing: type-erased, not parallel.
struct OpaqueFeed;

impl SourceFunction for OpaqueFeed {}

// ---------------------------------------------------------------------------
// Build -> submit -> complete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_environment_runs_job_to_completion() {
    init_tracing();
    let mut env = StreamEnvironment::create_local_environment_with_parallelism(2);
    env.set_job_name("wordcount").unwrap();
    env.from_elements(&[1u64, 2, 3]).unwrap();

    let listener = Arc::new(RecordingListener::default());
    env.add_listener(listener.clone());

    let result = env.execute().await.unwrap();

    let events = listener.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], Event::Submitted(result.job_id()));
    assert_eq!(events[1], Event::Completed { ok: true });
}

#[tokio::test]
async fn declared_sources_flow_into_the_submitted_graph() {
    init_tracing();
    let mut env = StreamEnvironment::create_local_environment();
    env.add_source(&SelfDescribingSource, "lines", Some(TypeInfo::of::<i32>()))
        .unwrap();
    env.from_elements(&["a", "b"]).unwrap();

    let graph = env.stream_graph().unwrap();
    assert_eq!(graph.job_name(), DEFAULT_JOB_NAME);
    assert_eq!(graph.transformations().len(), 2);

    // Self-description beat the declared i32.
    let first = graph.transformations()[0].output_type();
    assert!(first.concrete().unwrap().is::<String>());

    // The graph snapshot is immutable: a later declaration is not visible.
    env.from_elements(&[1u8]).unwrap();
    assert_eq!(graph.transformations().len(), 2);
}

#[tokio::test]
async fn erased_source_defers_type_resolution_until_use() {
    init_tracing();
    let mut env = StreamEnvironment::create_local_environment();
    let descriptor = env.add_source(&OpaqueFeed, "feed", None).unwrap();
    assert!(!descriptor.is_resolved());

    // Declaring an erased source never fails the build phase.
    let graph = env.stream_graph().unwrap();
    assert_eq!(graph.transformations().len(), 1);

    // The carried failure surfaces only when the concrete type is requested,
    // and it names the originating source.
    let err = graph.transformations()[0]
        .output_type()
        .concrete()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TypeInference { ref source_name, .. } if source_name == "feed"
    ));
}

#[tokio::test]
async fn submitted_environment_is_read_only() {
    init_tracing();
    let mut env = StreamEnvironment::create_local_environment();
    env.from_elements(&[1u8]).unwrap();

    let handle = env.execute_async().await.unwrap();
    assert!(matches!(
        env.set_buffer_timeout_ms(0),
        Err(Error::InvalidState(_))
    ));
    handle.await_result().await.unwrap();
}

// ---------------------------------------------------------------------------
// Factory overrides
// ---------------------------------------------------------------------------

struct CountingFactory {
    created: AtomicUsize,
    job_name: &'static str,
}

impl CountingFactory {
    fn named(job_name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            job_name,
        })
    }
}

impl EnvironmentFactory for CountingFactory {
    fn create_environment(&self) -> StreamEnvironment {
        self.created.fetch_add(1, Ordering::SeqCst);
        let mut env = StreamEnvironment::create_local_environment();
        env.set_job_name(self.job_name).unwrap();
        env
    }
}

#[tokio::test]
#[serial]
async fn thread_scoped_factory_shapes_the_environment() {
    init_tracing();
    reset_factories();
    set_process_factory(CountingFactory::named("from-process"));
    let thread_factory = CountingFactory::named("from-thread");

    {
        let _scope = scoped_factory(thread_factory.clone());
        let env = StreamEnvironment::get_execution_environment();
        assert_eq!(env.job_name(), "from-thread");
    }

    // Scope ended: the process-wide factory takes over.
    let env = StreamEnvironment::get_execution_environment();
    assert_eq!(env.job_name(), "from-process");
    assert_eq!(thread_factory.created.load(Ordering::SeqCst), 1);

    reset_factories();
    // With both overrides cleared, the local fallback applies.
    let env = StreamEnvironment::get_execution_environment();
    assert_eq!(env.job_name(), DEFAULT_JOB_NAME);
    assert!(env.config().parallelism().is_some());
}

#[tokio::test]
#[serial]
async fn factory_built_environment_executes_jobs() {
    init_tracing();
    reset_factories();
    let _scope = scoped_factory(CountingFactory::named("scoped-job"));

    let mut env = StreamEnvironment::get_execution_environment();
    env.from_elements(&["record"]).unwrap();

    let listener = Arc::new(RecordingListener::default());
    env.add_listener(listener.clone());

    env.execute().await.unwrap();
    assert_eq!(listener.events().len(), 2);

    reset_factories();
}
