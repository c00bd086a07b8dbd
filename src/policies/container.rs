//! Policy selection and application.
//!
//! [`PolicyContainer`] holds a catalog of policies, the registry connecting
//! operation kinds to their factories, and the output convention for
//! augmented boxes. Each call is independent: selection and probability
//! gating draw from a caller-supplied random generator, so seeding the
//! generator makes a whole run reproducible.

use image::RgbImage;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, trace};

use crate::core::errors::{AugError, AugResult};
use crate::core::registry::{AugmentationFactory, OperationRegistry};
use crate::policies::catalog::{Policy, policies_v3};
use crate::processors::geometry::{BoxesOnImage, ImageShape};
use crate::processors::types::BoxFormat;

/// Bounding boxes produced by [`PolicyContainer::apply_augmentation`], in the
/// container's configured output convention.
#[derive(Debug, Clone, PartialEq)]
pub enum AugmentedBoxes {
    /// `[x_min, y_min, x_max, y_max]` integer pixel corners.
    Pixel(Vec<[i32; 4]>),
    /// `[center_x, center_y, width, height]` fractions of the image
    /// dimensions.
    Normalized(Vec<[f32; 4]>),
}

impl AugmentedBoxes {
    /// Number of boxes.
    pub fn len(&self) -> usize {
        match self {
            AugmentedBoxes::Pixel(boxes) => boxes.len(),
            AugmentedBoxes::Normalized(boxes) => boxes.len(),
        }
    }

    /// Returns true if every box was pruned during augmentation (or none was
    /// supplied).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pixel-format boxes, if that is the configured convention.
    pub fn as_pixel(&self) -> Option<&[[i32; 4]]> {
        match self {
            AugmentedBoxes::Pixel(boxes) => Some(boxes),
            AugmentedBoxes::Normalized(_) => None,
        }
    }

    /// The normalized-format boxes, if that is the configured convention.
    pub fn as_normalized(&self) -> Option<&[[f32; 4]]> {
        match self {
            AugmentedBoxes::Pixel(_) => None,
            AugmentedBoxes::Normalized(boxes) => Some(boxes),
        }
    }
}

/// Container for the policies available during augmentation.
#[derive(Debug)]
pub struct PolicyContainer {
    policies: Vec<Policy>,
    registry: OperationRegistry,
    output_format: BoxFormat,
}

impl PolicyContainer {
    /// Creates a container over an arbitrary catalog.
    pub fn new(policies: Vec<Policy>, registry: OperationRegistry, output_format: BoxFormat) -> Self {
        Self {
            policies,
            registry,
            output_format,
        }
    }

    /// Creates a container over the fixed v3 catalog.
    pub fn with_catalog(registry: OperationRegistry, output_format: BoxFormat) -> Self {
        Self::new(policies_v3(), registry, output_format)
    }

    /// The catalog held by this container.
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// The configured output convention.
    pub fn output_format(&self) -> BoxFormat {
        self.output_format
    }

    /// Returns the registered factory for a canonical operation name.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::UnknownOperation`] if the name is outside the
    /// supported set or nothing is registered for it.
    pub fn lookup(&self, name: &str) -> AugResult<&AugmentationFactory> {
        self.registry.lookup_name(name)
    }

    /// Draws one policy uniformly at random from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::EmptyCatalog`] if the catalog holds no policies.
    pub fn select_random_policy<R: Rng + ?Sized>(&self, rng: &mut R) -> AugResult<&Policy> {
        self.policies.choose(rng).ok_or(AugError::EmptyCatalog)
    }

    /// Runs one policy against an image and its bounding boxes.
    ///
    /// Input boxes are `[x_min, y_min, x_max, y_max]` pixel corners. Every
    /// step of the policy is gated by its own probability draw; a step that
    /// runs replaces both the image and the box set with the operation's
    /// output, after which boxes fully outside the image are dropped and
    /// partially-outside boxes are clipped. The surviving boxes are returned
    /// in the container's configured output convention. An empty result is a
    /// valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::UnknownOperation`] if any step of the policy has
    /// no registered factory (checked before anything runs, so a
    /// misconfigured policy never half-applies), [`AugError::MalformedInput`]
    /// for degenerate input boxes or an image the output conversion cannot
    /// handle, and propagates any error the operations themselves report.
    pub fn apply_augmentation<R: Rng + ?Sized>(
        &self,
        policy: &Policy,
        image: RgbImage,
        boxes: &[[i32; 4]],
        rng: &mut R,
    ) -> AugResult<(RgbImage, AugmentedBoxes)> {
        let mut boxes = BoxesOnImage::from_pixel_boxes(boxes, ImageShape::of(&image))?;

        // Resolve every factory up front: an unknown operation anywhere in
        // the policy must fail before any image mutation is observable.
        let factories = policy
            .steps
            .iter()
            .map(|step| self.registry.lookup(step.operation))
            .collect::<AugResult<Vec<_>>>()?;

        let mut image = image;
        for (step, factory) in policy.steps.iter().zip(factories) {
            let roll: f32 = rng.random();
            if roll >= step.probability {
                debug!(
                    operation = %step.operation,
                    probability = step.probability,
                    roll,
                    "skipping step"
                );
                continue;
            }

            let geometry = step
                .operation
                .requires_image_geometry()
                .then(|| ImageShape::of(&image));
            let operation = factory(step.magnitude, geometry)?;
            let (next_image, next_boxes) = operation.apply(image, boxes)?;

            image = next_image;
            let before = next_boxes.len();
            boxes = next_boxes
                .with_shape(ImageShape::of(&image))
                .remove_out_of_image()
                .clip_out_of_image();
            if boxes.len() < before {
                trace!(
                    operation = %step.operation,
                    removed = before - boxes.len(),
                    "pruned boxes pushed outside the image"
                );
            }
            debug!(
                operation = %step.operation,
                magnitude = step.magnitude,
                boxes = boxes.len(),
                "applied step"
            );
        }

        let converted = match self.output_format {
            BoxFormat::Pixel => AugmentedBoxes::Pixel(boxes.to_pixel()),
            BoxFormat::Normalized => AugmentedBoxes::Normalized(boxes.to_normalized()?),
        };
        Ok((image, converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{Augmentation, OperationKind};
    use crate::policies::catalog::PolicyStep;
    use crate::processors::geometry::BoundingBox;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Identity;

    impl Augmentation for Identity {
        fn apply(
            &self,
            image: RgbImage,
            boxes: BoxesOnImage,
        ) -> AugResult<(RgbImage, BoxesOnImage)> {
            Ok((image, boxes))
        }
    }

    /// Translates every box without touching the image.
    struct Shift {
        dx: f32,
        dy: f32,
    }

    impl Augmentation for Shift {
        fn apply(
            &self,
            image: RgbImage,
            boxes: BoxesOnImage,
        ) -> AugResult<(RgbImage, BoxesOnImage)> {
            let shape = boxes.shape();
            let shifted = boxes
                .boxes()
                .iter()
                .map(|b| {
                    BoundingBox::new(
                        b.x_min + self.dx,
                        b.y_min + self.dy,
                        b.x_max + self.dx,
                        b.y_max + self.dy,
                    )
                })
                .collect();
            Ok((image, BoxesOnImage::new(shifted, shape)))
        }
    }

    fn step(operation: OperationKind, probability: f32, magnitude: u8) -> PolicyStep {
        PolicyStep::new(operation, probability, magnitude).unwrap()
    }

    fn identity_registry(kinds: &[OperationKind]) -> OperationRegistry {
        let mut registry = OperationRegistry::new();
        for &kind in kinds {
            registry.register(kind, |_, _| Ok(Box::new(Identity)));
        }
        registry
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn end_to_end_identity_policy_passes_boxes_through() {
        let registry = identity_registry(&[OperationKind::AutoContrast]);
        let policy = Policy::new(vec![step(OperationKind::AutoContrast, 1.0, 10)]);
        let container = PolicyContainer::new(vec![policy], registry, BoxFormat::Pixel);

        let mut rng = rng();
        let policy = container.select_random_policy(&mut rng).unwrap();
        let (image, boxes) = container
            .apply_augmentation(policy, RgbImage::new(100, 100), &[[0, 0, 50, 50]], &mut rng)
            .unwrap();

        assert_eq!((image.width(), image.height()), (100, 100));
        assert_eq!(boxes, AugmentedBoxes::Pixel(vec![[0, 0, 50, 50]]));
    }

    #[test]
    fn zero_probability_steps_never_run() {
        let mut registry = OperationRegistry::new();
        registry.register(OperationKind::TranslateX, |_, _| {
            Ok(Box::new(Shift { dx: 1000.0, dy: 0.0 }))
        });
        let policy = Policy::new(vec![
            step(OperationKind::TranslateX, 0.0, 8),
            step(OperationKind::TranslateX, 0.0, 4),
        ]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        let (_, boxes) = container
            .apply_augmentation(&policy, RgbImage::new(100, 100), &[[10, 20, 30, 40]], &mut rng())
            .unwrap();

        assert_eq!(boxes, AugmentedBoxes::Pixel(vec![[10, 20, 30, 40]]));
    }

    #[test]
    fn certain_steps_are_deterministic_for_deterministic_operations() {
        let build = || {
            let mut registry = OperationRegistry::new();
            registry.register(OperationKind::TranslateX, |magnitude, _| {
                Ok(Box::new(Shift {
                    dx: magnitude as f32,
                    dy: 0.0,
                }))
            });
            registry
        };
        let policy = Policy::new(vec![
            step(OperationKind::TranslateX, 1.0, 8),
            step(OperationKind::TranslateX, 1.0, 4),
        ]);

        let run = |registry| {
            let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);
            container
                .apply_augmentation(
                    &policy,
                    RgbImage::new(100, 100),
                    &[[10, 20, 30, 40]],
                    &mut rng(),
                )
                .unwrap()
                .1
        };

        let first = run(build());
        let second = run(build());
        assert_eq!(first, second);
        assert_eq!(first, AugmentedBoxes::Pixel(vec![[22, 20, 42, 40]]));
    }

    #[test]
    fn boxes_pushed_out_of_the_image_are_pruned_or_clipped() {
        let mut registry = OperationRegistry::new();
        registry.register(OperationKind::TranslateX, |_, _| {
            Ok(Box::new(Shift { dx: 80.0, dy: 0.0 }))
        });
        let policy = Policy::new(vec![step(OperationKind::TranslateX, 1.0, 8)]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        // First box ends up partially outside (clipped), second fully outside
        // (removed).
        let (_, boxes) = container
            .apply_augmentation(
                &policy,
                RgbImage::new(100, 100),
                &[[10, 10, 30, 30], [90, 50, 99, 70]],
                &mut rng(),
            )
            .unwrap();

        assert_eq!(boxes, AugmentedBoxes::Pixel(vec![[90, 10, 100, 30]]));
    }

    #[test]
    fn unknown_operation_fails_before_any_step_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut registry = OperationRegistry::new();
        registry.register(OperationKind::Brightness, move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Identity))
        });
        // Cutout is referenced by the policy but never registered.
        let policy = Policy::new(vec![
            step(OperationKind::Brightness, 1.0, 2),
            step(OperationKind::Cutout, 1.0, 10),
        ]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        let err = container
            .apply_augmentation(&policy, RgbImage::new(100, 100), &[[0, 0, 10, 10]], &mut rng())
            .unwrap_err();

        assert!(matches!(err, AugError::UnknownOperation { name } if name == "Cutout"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_catalog_selection_fails() {
        let container = PolicyContainer::new(
            Vec::new(),
            identity_registry(&[]),
            BoxFormat::Pixel,
        );
        assert!(matches!(
            container.select_random_policy(&mut rng()),
            Err(AugError::EmptyCatalog)
        ));
    }

    #[test]
    fn selection_draws_from_the_catalog() {
        let registry = identity_registry(&[OperationKind::Equalize]);
        let container = PolicyContainer::with_catalog(registry, BoxFormat::Pixel);

        let mut rng = rng();
        for _ in 0..32 {
            let policy = container.select_random_policy(&mut rng).unwrap();
            assert!(container.policies().contains(policy));
        }
    }

    #[test]
    fn cutout_operations_receive_the_image_geometry() {
        let geometries = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut registry = OperationRegistry::new();
        for kind in [OperationKind::Brightness, OperationKind::Cutout] {
            let seen = geometries.clone();
            registry.register(kind, move |_, geometry| {
                seen.lock().unwrap().push(geometry);
                Ok(Box::new(Identity))
            });
        }
        let policy = Policy::new(vec![
            step(OperationKind::Brightness, 1.0, 2),
            step(OperationKind::Cutout, 1.0, 10),
        ]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        container
            .apply_augmentation(&policy, RgbImage::new(64, 48), &[[0, 0, 10, 10]], &mut rng())
            .unwrap();

        let seen = geometries.lock().unwrap();
        assert_eq!(
            *seen,
            vec![None, Some(ImageShape::new(48, 64))],
            "magnitude-only operations get no geometry; cutout gets height/width"
        );
    }

    #[test]
    fn normalized_output_uses_final_image_dimensions() {
        let registry = identity_registry(&[OperationKind::Equalize]);
        let policy = Policy::new(vec![step(OperationKind::Equalize, 0.0, 4)]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Normalized);

        // 200x300 (width x height) image.
        let (_, boxes) = container
            .apply_augmentation(
                &policy,
                RgbImage::new(200, 300),
                &[[10, 20, 110, 220]],
                &mut rng(),
            )
            .unwrap();

        assert_eq!(
            boxes,
            AugmentedBoxes::Normalized(vec![[0.3, 0.4, 0.5, 200.0 / 300.0]])
        );
    }

    #[test]
    fn pruning_every_box_yields_an_empty_result() {
        let mut registry = OperationRegistry::new();
        registry.register(OperationKind::TranslateY, |_, _| {
            Ok(Box::new(Shift { dx: 0.0, dy: 500.0 }))
        });
        let policy = Policy::new(vec![step(OperationKind::TranslateY, 1.0, 8)]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        let (_, boxes) = container
            .apply_augmentation(&policy, RgbImage::new(100, 100), &[[0, 0, 50, 50]], &mut rng())
            .unwrap();

        assert!(boxes.is_empty());
        assert_eq!(boxes, AugmentedBoxes::Pixel(Vec::new()));
    }

    #[test]
    fn operation_failures_propagate() {
        let mut registry = OperationRegistry::new();
        registry.register(OperationKind::Rotate, |_, _| {
            Err(AugError::operation(
                "Rotate_BBox",
                std::io::Error::other("interpolation failed"),
            ))
        });
        let policy = Policy::new(vec![step(OperationKind::Rotate, 1.0, 6)]);
        let container = PolicyContainer::new(vec![policy.clone()], registry, BoxFormat::Pixel);

        let err = container
            .apply_augmentation(&policy, RgbImage::new(100, 100), &[[0, 0, 10, 10]], &mut rng())
            .unwrap_err();
        assert!(matches!(err, AugError::Operation { .. }));
    }
}
