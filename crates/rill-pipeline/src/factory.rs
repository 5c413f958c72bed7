//! Environment factory resolution.
//!
//! Execution frameworks that embed rillflow (test harnesses, CLI launchers)
//! can override how [`StreamEnvironment`] is constructed. Two override levels
//! exist, consulted in order:
//!
//! 1. a thread-scoped stack of factories, entered and left through the RAII
//!    [`FactoryScope`] guard;
//! 2. a process-wide factory, installed once by a trusted initializer before
//!    any environment is constructed.
//!
//! When neither is set, callers fall back to a local environment sized to the
//! host's parallel-execution capacity.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::environment::StreamEnvironment;

/// Strategy for constructing execution environments.
pub trait EnvironmentFactory: Send + Sync {
    /// Build a new environment.
    fn create_environment(&self) -> StreamEnvironment;
}

static PROCESS_FACTORY: RwLock<Option<Arc<dyn EnvironmentFactory>>> = RwLock::new(None);

thread_local! {
    static THREAD_FACTORIES: RefCell<Vec<Arc<dyn EnvironmentFactory>>> =
        const { RefCell::new(Vec::new()) };
}

/// Guard keeping a thread-scoped factory active; the factory is popped when
/// the guard drops.
///
/// Not `Send`: the scope must end on the thread that opened it.
#[must_use = "the factory is only active while this guard is alive"]
pub struct FactoryScope {
    _not_send: PhantomData<*const ()>,
}

impl Drop for FactoryScope {
    fn drop(&mut self) {
        THREAD_FACTORIES.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Push a factory onto the current thread's scope stack.
///
/// The innermost live scope wins during [`current_factory`] resolution.
pub fn scoped_factory(factory: Arc<dyn EnvironmentFactory>) -> FactoryScope {
    THREAD_FACTORIES.with(|stack| stack.borrow_mut().push(factory));
    FactoryScope {
        _not_send: PhantomData,
    }
}

/// Install the process-wide fallback factory.
///
/// Intended for a single trusted initializer before any environment is
/// constructed; no ordering is guaranteed against concurrent setters.
pub fn set_process_factory(factory: Arc<dyn EnvironmentFactory>) {
    *PROCESS_FACTORY.write() = Some(factory);
}

/// The currently active factory: top of the thread-scoped stack if any,
/// else the process-wide factory, else `None`.
#[must_use]
pub fn current_factory() -> Option<Arc<dyn EnvironmentFactory>> {
    THREAD_FACTORIES
        .with(|stack| stack.borrow().last().cloned())
        .or_else(|| PROCESS_FACTORY.read().clone())
}

/// Clear both override levels. Idempotent; used for test isolation between
/// independent runs.
pub fn reset_factories() {
    THREAD_FACTORIES.with(|stack| stack.borrow_mut().clear());
    *PROCESS_FACTORY.write() = None;
}
