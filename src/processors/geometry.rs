//! Axis-aligned bounding-box geometry for the augmentation pipeline.
//!
//! This module provides the geometric primitives the policy container works
//! with: the pixel dimensions of an image, a single axis-aligned bounding box
//! stored as corner coordinates, and a box set tied to one image's dimensions
//! that supports pruning, clipping and conversion between the pixel and
//! normalized output conventions.

use serde::{Deserialize, Serialize};

use crate::core::errors::{AugError, AugResult};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    /// Height of the image in pixels.
    pub height: u32,
    /// Width of the image in pixels.
    pub width: u32,
}

impl ImageShape {
    /// Creates a new shape with the given dimensions.
    #[inline]
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Reads the shape of an image buffer.
    pub fn of(image: &image::RgbImage) -> Self {
        Self {
            height: image.height(),
            width: image.width(),
        }
    }
}

/// An axis-aligned bounding box stored as pixel corner coordinates.
///
/// Coordinates are kept as floats so that geometric operations can move boxes
/// by sub-pixel amounts; conversion back to integers happens only at output
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X-coordinate of the left edge.
    pub x_min: f32,
    /// Y-coordinate of the top edge.
    pub y_min: f32,
    /// X-coordinate of the right edge.
    pub x_max: f32,
    /// Y-coordinate of the bottom edge.
    pub y_max: f32,
}

impl BoundingBox {
    /// Creates a new bounding box from corner coordinates.
    #[inline]
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Width of the box.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height of the box.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// X-coordinate of the box center.
    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.x_min + self.x_max) / 2.0
    }

    /// Y-coordinate of the box center.
    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }

    /// Returns true if the box has no overlap with the image plane at all.
    pub fn is_fully_outside(&self, shape: ImageShape) -> bool {
        self.x_max <= 0.0
            || self.y_max <= 0.0
            || self.x_min >= shape.width as f32
            || self.y_min >= shape.height as f32
    }

    /// Clamps the box to `[0, width] x [0, height]`.
    ///
    /// A box that is fully outside the image collapses to a zero-area box on
    /// the nearest image edge; callers that care should prune with
    /// [`BoundingBox::is_fully_outside`] first.
    pub fn clip(&self, shape: ImageShape) -> Self {
        let w = shape.width as f32;
        let h = shape.height as f32;
        Self {
            x_min: self.x_min.clamp(0.0, w),
            y_min: self.y_min.clamp(0.0, h),
            x_max: self.x_max.clamp(0.0, w),
            y_max: self.y_max.clamp(0.0, h),
        }
    }

    /// Rounds the corners to the nearest integer pixel coordinates.
    pub fn to_pixel(&self) -> [i32; 4] {
        [
            self.x_min.round() as i32,
            self.y_min.round() as i32,
            self.x_max.round() as i32,
            self.y_max.round() as i32,
        ]
    }
}

/// A set of bounding boxes tied to the pixel dimensions of one image.
///
/// This is the unit the policy container threads through an augmentation
/// sequence: operations consume and produce it, and after every step the
/// container prunes boxes that left the image and clips the ones that
/// partially did.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxesOnImage {
    boxes: Vec<BoundingBox>,
    shape: ImageShape,
}

impl BoxesOnImage {
    /// Creates a box set from already-constructed boxes.
    pub fn new(boxes: Vec<BoundingBox>, shape: ImageShape) -> Self {
        Self { boxes, shape }
    }

    /// Wraps raw `[x_min, y_min, x_max, y_max]` pixel boxes.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::MalformedInput`] if any box is inverted
    /// (`x_max < x_min` or `y_max < y_min`).
    pub fn from_pixel_boxes(raw: &[[i32; 4]], shape: ImageShape) -> AugResult<Self> {
        let mut boxes = Vec::with_capacity(raw.len());
        for (index, b) in raw.iter().enumerate() {
            let [x_min, y_min, x_max, y_max] = *b;
            if x_max < x_min || y_max < y_min {
                return Err(AugError::malformed_input(format!(
                    "box {index} is inverted: [{x_min}, {y_min}, {x_max}, {y_max}]"
                )));
            }
            boxes.push(BoundingBox::new(
                x_min as f32,
                y_min as f32,
                x_max as f32,
                y_max as f32,
            ));
        }
        Ok(Self { boxes, shape })
    }

    /// The boxes in this set.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// The image dimensions this set is tied to.
    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Number of boxes in the set.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true if the set contains no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Re-ties the set to different image dimensions without touching the
    /// boxes themselves.
    pub fn with_shape(self, shape: ImageShape) -> Self {
        Self { shape, ..self }
    }

    /// Drops every box that has no overlap with the image plane.
    pub fn remove_out_of_image(mut self) -> Self {
        let shape = self.shape;
        self.boxes.retain(|b| !b.is_fully_outside(shape));
        self
    }

    /// Clamps every remaining box to the image bounds.
    pub fn clip_out_of_image(mut self) -> Self {
        let shape = self.shape;
        for b in &mut self.boxes {
            *b = b.clip(shape);
        }
        self
    }

    /// Converts the set to `[x_min, y_min, x_max, y_max]` integer pixel
    /// corners, rounded to the nearest pixel.
    pub fn to_pixel(&self) -> Vec<[i32; 4]> {
        self.boxes.iter().map(BoundingBox::to_pixel).collect()
    }

    /// Converts the set to normalized `[center_x, center_y, width, height]`
    /// form, each component a fraction of the image dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::MalformedInput`] if either image dimension is
    /// zero, since the conversion divides by them.
    pub fn to_normalized(&self) -> AugResult<Vec<[f32; 4]>> {
        let ImageShape { height, width } = self.shape;
        if height == 0 || width == 0 {
            return Err(AugError::malformed_input(format!(
                "cannot normalize boxes on a {width}x{height} image"
            )));
        }
        let w = width as f32;
        let h = height as f32;
        Ok(self
            .boxes
            .iter()
            .map(|b| {
                [
                    b.center_x() / w,
                    b.center_y() / h,
                    b.width() / w,
                    b.height() / h,
                ]
            })
            .collect())
    }
}
