//! AutoAugment-style augmentation policies for object detection.
//!
//! `boxaug` is a policy layer for image data augmentation in object-detection
//! training pipelines. It ships a fixed catalog of policies — short sequences
//! of (operation, probability, magnitude) steps found by AutoAugment policy
//! search — and a [`PolicyContainer`] that selects one policy at random,
//! applies its steps in order with per-step probability gating, prunes and
//! clips the bounding boxes after every step, and converts the survivors to
//! pixel-corner or normalized center form.
//!
//! The pixel transforms themselves are not implemented here. Callers register
//! an [`AugmentationFactory`] per [`OperationKind`] in an
//! [`OperationRegistry`]; the container resolves, constructs and sequences
//! them. All random decisions draw from a caller-supplied [`rand::Rng`], so a
//! seeded generator makes a whole run reproducible.
//!
//! # Example
//!
//! ```
//! use boxaug::{
//!     AugResult, Augmentation, BoxFormat, BoxesOnImage, OperationKind, OperationRegistry,
//!     Policy, PolicyContainer, PolicyStep,
//! };
//! use image::RgbImage;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // A stand-in for an operation provided by a real augmentation library.
//! struct Identity;
//!
//! impl Augmentation for Identity {
//!     fn apply(
//!         &self,
//!         image: RgbImage,
//!         boxes: BoxesOnImage,
//!     ) -> AugResult<(RgbImage, BoxesOnImage)> {
//!         Ok((image, boxes))
//!     }
//! }
//!
//! # fn main() -> boxaug::AugResult<()> {
//! let mut registry = OperationRegistry::new();
//! registry.register(OperationKind::AutoContrast, |_magnitude, _geometry| {
//!     Ok(Box::new(Identity))
//! });
//!
//! let policy = Policy::new(vec![PolicyStep::new(OperationKind::AutoContrast, 1.0, 10)?]);
//! let container = PolicyContainer::new(vec![policy], registry, BoxFormat::Pixel);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let policy = container.select_random_policy(&mut rng)?;
//! let (augmented, boxes) = container.apply_augmentation(
//!     policy,
//!     RgbImage::new(100, 100),
//!     &[[0, 0, 50, 50]],
//!     &mut rng,
//! )?;
//!
//! assert_eq!(boxes.as_pixel(), Some(&[[0, 0, 50, 50]][..]));
//! assert_eq!((augmented.width(), augmented.height()), (100, 100));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod policies;
pub mod processors;
pub mod utils;

pub use crate::core::{
    AugError, AugResult, Augmentation, AugmentationFactory, OperationKind, OperationRegistry,
};
pub use crate::policies::{
    AugmentedBoxes, MAX_MAGNITUDE, Policy, PolicyContainer, PolicyStep, policies_v3,
};
pub use crate::processors::{BoundingBox, BoxFormat, BoxesOnImage, ImageShape};
