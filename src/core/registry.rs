//! Operation kinds and the operation factory registry.
//!
//! The policy layer never implements a pixel transform itself; it dispatches
//! to factories supplied by an external augmentation library. This module
//! defines the closed set of operations the catalog can reference, the
//! capability contract those factories must satisfy, and the registry that
//! maps one to the other.
//!
//! # Type System Design
//!
//! Operations are identified by an enumerated type ([`OperationKind`]) rather
//! than by raw strings, so catalog-internal dispatch is exhaustive at compile
//! time and never string-matches. External policy definitions still enter
//! through a string-keyed path ([`OperationKind::from_str`] and serde), which
//! surfaces [`AugError::UnknownOperation`] for anything outside the set.
//! Whether an operation needs the image geometry at construction time is a
//! property of the variant ([`OperationKind::requires_image_geometry`]), not
//! of its spelling.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AugError, AugResult};
use crate::processors::geometry::{BoxesOnImage, ImageShape};

/// Identifies one augmentation operation the policy layer can dispatch to.
///
/// The set mirrors the operation table of the AutoAugment detection policies;
/// serde and [`FromStr`] use the canonical catalog spellings (for example
/// `"TranslateX_BBox"` for [`OperationKind::TranslateX`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Maximizes image contrast without clipping.
    AutoContrast,
    /// Adjusts image brightness.
    Brightness,
    /// Cuts a patch out of each bounding box region.
    #[serde(rename = "BBox_Cutout")]
    BboxCutout,
    /// Adjusts color balance.
    Color,
    /// Adjusts image contrast.
    Contrast,
    /// Cuts a random patch out of the image.
    Cutout,
    /// Equalizes the image histogram.
    Equalize,
    /// Reduces the number of bits per color channel.
    Posterize,
    /// Rotates the image and its boxes.
    #[serde(rename = "Rotate_BBox")]
    Rotate,
    /// Adjusts image sharpness.
    Sharpness,
    /// Shears the image and its boxes along the x-axis.
    #[serde(rename = "ShearX_BBox")]
    ShearX,
    /// Shears the image and its boxes along the y-axis.
    #[serde(rename = "ShearY_BBox")]
    ShearY,
    /// Inverts pixels above a magnitude-derived threshold.
    Solarize,
    /// Adds a constant to pixels below a threshold.
    SolarizeAdd,
    /// Translates the image and its boxes along the x-axis.
    #[serde(rename = "TranslateX_BBox")]
    TranslateX,
    /// Translates the image and its boxes along the y-axis.
    #[serde(rename = "TranslateY_BBox")]
    TranslateY,
}

impl OperationKind {
    /// Every supported operation, in canonical-name order.
    pub const ALL: [OperationKind; 16] = [
        OperationKind::AutoContrast,
        OperationKind::BboxCutout,
        OperationKind::Brightness,
        OperationKind::Color,
        OperationKind::Contrast,
        OperationKind::Cutout,
        OperationKind::Equalize,
        OperationKind::Posterize,
        OperationKind::Rotate,
        OperationKind::Sharpness,
        OperationKind::ShearX,
        OperationKind::ShearY,
        OperationKind::Solarize,
        OperationKind::SolarizeAdd,
        OperationKind::TranslateX,
        OperationKind::TranslateY,
    ];

    /// The canonical catalog name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::AutoContrast => "AutoContrast",
            OperationKind::Brightness => "Brightness",
            OperationKind::BboxCutout => "BBox_Cutout",
            OperationKind::Color => "Color",
            OperationKind::Contrast => "Contrast",
            OperationKind::Cutout => "Cutout",
            OperationKind::Equalize => "Equalize",
            OperationKind::Posterize => "Posterize",
            OperationKind::Rotate => "Rotate_BBox",
            OperationKind::Sharpness => "Sharpness",
            OperationKind::ShearX => "ShearX_BBox",
            OperationKind::ShearY => "ShearY_BBox",
            OperationKind::Solarize => "Solarize",
            OperationKind::SolarizeAdd => "SolarizeAdd",
            OperationKind::TranslateX => "TranslateX_BBox",
            OperationKind::TranslateY => "TranslateY_BBox",
        }
    }

    /// Returns true if the operation's factory needs the image dimensions in
    /// addition to the magnitude.
    ///
    /// Cutout-style operations are geometrically scoped to the image, so
    /// their patch size is derived from the actual height and width rather
    /// than from the scalar magnitude alone.
    pub fn requires_image_geometry(&self) -> bool {
        matches!(self, OperationKind::Cutout | OperationKind::BboxCutout)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = AugError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| AugError::unknown_operation(name))
    }
}

/// Capability contract for one configured augmentation operation.
///
/// Implementations live in an external augmentation library; this crate only
/// sequences them. An operation consumes an image and the box set tied to it
/// and returns the transformed pair. Implementations are expected to keep the
/// image dimensions unchanged and to move box geometry only.
pub trait Augmentation: Send + Sync {
    /// Transforms an image together with its bounding boxes.
    fn apply(&self, image: RgbImage, boxes: BoxesOnImage) -> AugResult<(RgbImage, BoxesOnImage)>;
}

/// Constructor for an [`Augmentation`].
///
/// Invoked with the step's magnitude and, for operations whose
/// [`OperationKind::requires_image_geometry`] is true, the dimensions of the
/// image being augmented (`None` otherwise).
pub type AugmentationFactory =
    Box<dyn Fn(u8, Option<ImageShape>) -> AugResult<Box<dyn Augmentation>> + Send + Sync>;

/// Maps operation kinds to the factories that build them.
///
/// The registry in use must cover every operation referenced by the catalog
/// in use; a lookup miss is a configuration error and is surfaced as
/// [`AugError::UnknownOperation`].
#[derive(Default)]
pub struct OperationRegistry {
    factories: HashMap<OperationKind, AugmentationFactory>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `kind`, replacing any previous registration.
    pub fn register<F>(&mut self, kind: OperationKind, factory: F)
    where
        F: Fn(u8, Option<ImageShape>) -> AugResult<Box<dyn Augmentation>> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    /// Returns the registered factory for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::UnknownOperation`] if no factory is registered.
    pub fn lookup(&self, kind: OperationKind) -> AugResult<&AugmentationFactory> {
        self.factories
            .get(&kind)
            .ok_or_else(|| AugError::unknown_operation(kind.as_str()))
    }

    /// Returns the registered factory for a canonical operation name.
    ///
    /// This is the string-keyed path for external policy definitions; names
    /// outside the supported set fail the same way unregistered kinds do.
    pub fn lookup_name(&self, name: &str) -> AugResult<&AugmentationFactory> {
        self.lookup(name.parse()?)
    }

    /// Returns true if a factory is registered for `kind`.
    pub fn contains(&self, kind: OperationKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> = self.factories.keys().map(OperationKind::as_str).collect();
        operations.sort_unstable();
        f.debug_struct("OperationRegistry")
            .field("operations", &operations)
            .finish()
    }
}
