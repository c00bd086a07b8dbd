//! Output conventions for augmented bounding boxes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::AugError;

/// Coordinate convention for the boxes returned by an augmentation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// Absolute `[x_min, y_min, x_max, y_max]` pixel corners, rounded to
    /// integers.
    #[default]
    Pixel,
    /// `[center_x, center_y, width, height]` as fractions of the image
    /// dimensions, the convention YOLO-style training pipelines consume.
    #[serde(alias = "yolo")]
    Normalized,
}

impl FromStr for BoxFormat {
    type Err = AugError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "pixel" => Ok(BoxFormat::Pixel),
            "normalized" | "yolo" => Ok(BoxFormat::Normalized),
            other => Err(AugError::malformed_input(format!(
                "unsupported box format '{other}'"
            ))),
        }
    }
}
