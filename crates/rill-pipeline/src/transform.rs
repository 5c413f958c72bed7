//! Declared processing steps and the ordered registry that stores them.
//!
//! A [`Transformation`] is an opaque handle contributed by the higher-level
//! step-building API; the orchestration layer never inspects it beyond its
//! name, it only stores and orders it. Once graph generation begins, the
//! registry's contents are read through immutable snapshots.

use std::sync::Arc;

use rill_core::{Error, Result, TransformId, TypeDescriptor};

/// One declared step in a stream job.
#[derive(Debug, Clone)]
pub struct Transformation {
    id: TransformId,
    name: String,
    output_type: TypeDescriptor,
    parallelism: Option<usize>,
}

impl Transformation {
    /// Create a new transformation handle.
    pub fn new(name: impl Into<String>, output_type: TypeDescriptor) -> Self {
        Self {
            id: TransformId::new(),
            name: name.into(),
            output_type,
            parallelism: None,
        }
    }

    /// Unique identifier of this step.
    #[must_use]
    pub fn id(&self) -> TransformId {
        self.id
    }

    /// Display name of this step.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor of the records this step produces.
    #[must_use]
    pub fn output_type(&self) -> &TypeDescriptor {
        &self.output_type
    }

    /// Per-step parallelism override, if any.
    #[must_use]
    pub fn parallelism(&self) -> Option<usize> {
        self.parallelism
    }

    /// Builder: set a per-step parallelism override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `parallelism` is zero.
    pub fn with_parallelism(mut self, parallelism: usize) -> Result<Self> {
        if parallelism == 0 {
            return Err(Error::invalid_argument("parallelism must be at least 1"));
        }
        self.parallelism = Some(parallelism);
        Ok(self)
    }
}

/// Ordered, append-only collection of declared transformations.
#[derive(Debug, Default)]
pub struct TransformationRegistry {
    transformations: Vec<Transformation>,
}

impl TransformationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transformation, preserving declaration order. O(1).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the transformation has an empty
    /// name.
    pub fn append(&mut self, transformation: Transformation) -> Result<()> {
        if transformation.name().is_empty() {
            return Err(Error::invalid_argument(
                "transformation name must not be empty",
            ));
        }
        self.transformations.push(transformation);
        Ok(())
    }

    /// Return the current ordered sequence for graph generation.
    ///
    /// The snapshot is independent of the registry: later appends do not show
    /// up in it, and taking a snapshot never mutates the registry.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Transformation]> {
        self.transformations.iter().cloned().collect()
    }

    /// Number of declared transformations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    /// Whether no transformation has been declared yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}
