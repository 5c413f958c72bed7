//! Runtime record-type descriptors for declared sources.
//!
//! A source's output type is resolved once, when the source is declared, and
//! recorded as a [`TypeDescriptor`]. Resolution that fails does not abort the
//! build phase: the failure is carried inside [`TypeDescriptor::Deferred`] and
//! raised only when a consumer actually needs the concrete type (e.g. when
//! setting up downstream serialization).

use std::any::TypeId;
use std::fmt;

use crate::error::{Error, Result};

/// Describes the concrete Rust type of the records a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Build the descriptor for a concrete type.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The fully qualified name of the described type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this descriptor describes `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Why the record type of a source could not be inferred.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeInferenceError {
    /// The source is type-erased; its record type is not statically known.
    #[error("the source is type-erased and does not describe its record type")]
    Erased,

    /// Inference found more than one candidate, or none.
    #[error("type inference was ambiguous: {0}")]
    Ambiguous(String),
}

/// The resolved (or deferred) record type of a declared source.
///
/// Immutable once produced. The `Deferred` variant stands in for a type that
/// could not be determined at declaration time; reading it through
/// [`concrete`](TypeDescriptor::concrete) raises the carried failure.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// The record type is known.
    Resolved(TypeInfo),
    /// Resolution failed; the error is raised at the point of use.
    Deferred {
        /// Display name of the source the failure originated from.
        source_name: String,
        /// The underlying inference failure.
        error: TypeInferenceError,
    },
}

impl TypeDescriptor {
    /// Shorthand for a descriptor resolved to `T`.
    #[must_use]
    pub fn resolved<T: 'static>() -> Self {
        TypeDescriptor::Resolved(TypeInfo::of::<T>())
    }

    /// Build a deferred descriptor carrying the inference failure.
    pub fn deferred(source_name: impl Into<String>, error: TypeInferenceError) -> Self {
        TypeDescriptor::Deferred {
            source_name: source_name.into(),
            error,
        }
    }

    /// Whether the record type is known.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, TypeDescriptor::Resolved(_))
    }

    /// Return the concrete type, raising the deferred failure if resolution
    /// did not succeed at declaration time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeInference`] naming the origin source when the
    /// descriptor is deferred.
    pub fn concrete(&self) -> Result<TypeInfo> {
        match self {
            TypeDescriptor::Resolved(info) => Ok(*info),
            TypeDescriptor::Deferred { source_name, error } => Err(Error::TypeInference {
                source_name: source_name.clone(),
                source: error.clone(),
            }),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Resolved(info) => write!(f, "{info}"),
            TypeDescriptor::Deferred { source_name, .. } => {
                write!(f, "<deferred: {source_name}>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn type_info_identity() {
        assert_eq!(TypeInfo::of::<String>(), TypeInfo::of::<String>());
        assert_ne!(TypeInfo::of::<String>(), TypeInfo::of::<i64>());
        assert!(TypeInfo::of::<String>().is::<String>());
        assert!(!TypeInfo::of::<String>().is::<i64>());
    }

    #[test]
    fn type_info_display_uses_name() {
        let info = TypeInfo::of::<u32>();
        assert_eq!(info.to_string(), "u32");
    }

    #[test]
    fn resolved_concrete() {
        let descriptor = TypeDescriptor::resolved::<String>();
        assert!(descriptor.is_resolved());
        let info = descriptor.concrete().unwrap();
        assert!(info.is::<String>());
    }

    #[test]
    fn deferred_concrete_raises_carried_failure() {
        let descriptor = TypeDescriptor::deferred("mySource", TypeInferenceError::Erased);
        assert!(!descriptor.is_resolved());

        let err = descriptor.concrete().unwrap_err();
        assert_matches!(
            err,
            Error::TypeInference { ref source_name, .. } if source_name == "mySource"
        );
    }

    #[test]
    fn deferred_is_repeatable() {
        // The descriptor is immutable; reading it twice raises the same failure.
        let descriptor = TypeDescriptor::deferred(
            "mySource",
            TypeInferenceError::Ambiguous("two candidate bindings".into()),
        );
        assert!(descriptor.concrete().is_err());
        assert!(descriptor.concrete().is_err());
    }

    #[test]
    fn display_variants() {
        assert_eq!(TypeDescriptor::resolved::<u8>().to_string(), "u8");
        let deferred = TypeDescriptor::deferred("src", TypeInferenceError::Erased);
        assert_eq!(deferred.to_string(), "<deferred: src>");
    }
}
