//! Bounding-box geometry and output conventions.

pub mod geometry;
pub mod types;

pub use geometry::{BoundingBox, BoxesOnImage, ImageShape};
pub use types::BoxFormat;
