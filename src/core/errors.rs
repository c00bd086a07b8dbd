//! Core error types for the augmentation policy layer.
//!
//! This module defines the error taxonomy shared by every component of the
//! crate: unknown operations, empty catalogs, malformed caller input and
//! failures surfaced by external augmentation operations. All errors indicate
//! a caller or configuration mistake and are propagated immediately; nothing
//! in this crate retries or swallows them.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AugResult<T> = Result<T, AugError>;

/// Errors that can occur while selecting or applying augmentation policies.
#[derive(Debug, Error)]
pub enum AugError {
    /// A policy step referenced an operation that is not present in the
    /// registry. A misconfigured policy is a programming error, so this is
    /// surfaced before any image mutation takes place.
    #[error("unknown operation '{name}': not present in the registry")]
    UnknownOperation {
        /// The operation name as written in the policy definition.
        name: String,
    },

    /// Random policy selection was attempted on an empty catalog.
    #[error("policy catalog is empty")]
    EmptyCatalog,

    /// The caller supplied input the pipeline cannot work with, such as an
    /// inverted bounding box or an image whose dimensions cannot support the
    /// requested coordinate conversion.
    #[error("malformed input: {message}")]
    MalformedInput {
        /// A message describing the malformed input.
        message: String,
    },

    /// An external augmentation operation failed while being constructed or
    /// applied.
    #[error("operation '{name}' failed")]
    Operation {
        /// The name of the operation that failed.
        name: String,
        /// The underlying error reported by the operation.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AugError {
    /// Creates an [`AugError::UnknownOperation`] for the given name.
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    /// Creates an [`AugError::MalformedInput`] with the given message.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Wraps an error reported by an external augmentation operation.
    pub fn operation(
        name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Operation {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let err = AugError::unknown_operation("Warp");
        assert_eq!(
            err.to_string(),
            "unknown operation 'Warp': not present in the registry"
        );

        let err = AugError::malformed_input("box 2 is inverted");
        assert_eq!(err.to_string(), "malformed input: box 2 is inverted");

        assert_eq!(AugError::EmptyCatalog.to_string(), "policy catalog is empty");
    }

    #[test]
    fn operation_error_keeps_its_source() {
        use std::error::Error;

        let io = std::io::Error::other("backend exploded");
        let err = AugError::operation("Cutout", io);
        assert_eq!(err.to_string(), "operation 'Cutout' failed");
        assert!(err.source().is_some());
    }
}
