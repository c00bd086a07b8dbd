//! Core types of the policy layer.
//!
//! This module contains the error taxonomy shared by all components and the
//! operation registry that connects the policy catalog to the external
//! augmentation library.

pub mod errors;
pub mod registry;

pub use errors::{AugError, AugResult};
pub use registry::{Augmentation, AugmentationFactory, OperationKind, OperationRegistry};
