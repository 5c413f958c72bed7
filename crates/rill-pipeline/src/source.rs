//! Source declarations and output-type resolution.
//!
//! A source declares itself through the [`SourceFunction`] trait. Optional
//! behaviors (self-describing its record type, running in parallel) are
//! expressed as overridable trait methods rather than runtime downcasting, so
//! capability detection stays type-safe.
//!
//! [`resolve_source_type`] implements the layered resolution policy:
//! self-description beats an explicit declaration, which beats structural
//! inference; an inference failure is deferred, not raised.

use rill_core::{TypeDescriptor, TypeInferenceError, TypeInfo};

/// A declared stream source.
///
/// The orchestration layer does not run sources; it only reads their
/// capabilities when the step is declared. The default implementations
/// describe the least capable source: not self-describing, not parallel, and
/// type-erased.
pub trait SourceFunction: Send + Sync {
    /// Self-describing capability: the record type this source reports for
    /// itself. Takes precedence over any declared type.
    fn produced_type(&self) -> Option<TypeInfo> {
        None
    }

    /// Whether instances of this source may run in parallel. Non-parallel
    /// sources are pinned to a parallelism of 1 when declared.
    fn is_parallel(&self) -> bool {
        false
    }

    /// Structural inference: the record type statically bound to this
    /// source's output slot.
    ///
    /// Sources with a statically known record type return it via
    /// [`TypeInfo::of`]; type-erased sources keep the default.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeInferenceError`] when the type is erased or ambiguous.
    fn static_record_type(&self) -> std::result::Result<TypeInfo, TypeInferenceError> {
        Err(TypeInferenceError::Erased)
    }
}

/// Resolve the output type of a newly declared source.
///
/// Precedence, highest first:
/// 1. the source's own [`produced_type`](SourceFunction::produced_type) —
///    deliberately authoritative even over `declared`;
/// 2. the caller-declared type;
/// 3. structural inference via
///    [`static_record_type`](SourceFunction::static_record_type).
///
/// An inference failure never aborts the build phase: the failure is carried
/// in a [`TypeDescriptor::Deferred`] and raised only when a consumer asks for
/// the concrete type.
pub fn resolve_source_type(
    source: &dyn SourceFunction,
    declared: Option<TypeInfo>,
    source_name: &str,
) -> TypeDescriptor {
    if let Some(info) = source.produced_type() {
        return TypeDescriptor::Resolved(info);
    }
    if let Some(info) = declared {
        return TypeDescriptor::Resolved(info);
    }
    match source.static_record_type() {
        Ok(info) => TypeDescriptor::Resolved(info),
        Err(error) => {
            tracing::debug!(
                source = source_name,
                %error,
                "Deferring type resolution for source"
            );
            TypeDescriptor::deferred(source_name, error)
        }
    }
}

/// A source backed by an in-memory collection of records.
///
/// Its record type is statically known, and it always runs with a
/// parallelism of 1.
#[derive(Debug, Clone)]
pub struct CollectionSource<T> {
    data: Vec<T>,
}

impl<T> CollectionSource<T> {
    /// Wrap a collection of records.
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    /// The wrapped records.
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: Send + Sync + 'static> SourceFunction for CollectionSource<T> {
    fn static_record_type(&self) -> std::result::Result<TypeInfo, TypeInferenceError> {
        Ok(TypeInfo::of::<T>())
    }
}
