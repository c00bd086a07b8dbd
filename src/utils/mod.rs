//! Utility helpers for the augmentation policy layer.

pub mod logging;
#[cfg(feature = "visualization")]
pub mod visualization;

pub use logging::init_logging;
#[cfg(feature = "visualization")]
pub use visualization::draw_boxes;
