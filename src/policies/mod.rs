//! Augmentation policies: the fixed catalog and the container that applies
//! them.

pub mod catalog;
pub mod container;

pub use catalog::{MAX_MAGNITUDE, Policy, PolicyStep, policies_v3};
pub use container::{AugmentedBoxes, PolicyContainer};
