//! Policy value types and the fixed augmentation policy catalog.

use serde::{Deserialize, Serialize};

use crate::core::errors::{AugError, AugResult};
use crate::core::registry::OperationKind;

/// Highest magnitude a policy step may carry.
///
/// Magnitudes index into operation-specific strength ranges; the catalog uses
/// the AutoAugment convention of eleven levels, 0 through 10.
pub const MAX_MAGNITUDE: u8 = 10;

/// One (operation, probability, magnitude) step of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyStep {
    /// The operation to dispatch to.
    pub operation: OperationKind,
    /// Chance in `[0, 1]` that the step runs at all.
    pub probability: f32,
    /// Strength level passed to the operation factory.
    pub magnitude: u8,
}

impl PolicyStep {
    /// Creates a step, validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AugError::MalformedInput`] if `probability` is outside
    /// `[0, 1]` or not finite, or if `magnitude` exceeds [`MAX_MAGNITUDE`].
    pub fn new(operation: OperationKind, probability: f32, magnitude: u8) -> AugResult<Self> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(AugError::malformed_input(format!(
                "step probability {probability} for '{operation}' is outside [0, 1]"
            )));
        }
        if magnitude > MAX_MAGNITUDE {
            return Err(AugError::malformed_input(format!(
                "step magnitude {magnitude} for '{operation}' exceeds {MAX_MAGNITUDE}"
            )));
        }
        Ok(Self {
            operation,
            probability,
            magnitude,
        })
    }
}

// Catalog-internal constructor; the table below only uses literals in range.
const fn step(operation: OperationKind, probability: f32, magnitude: u8) -> PolicyStep {
    PolicyStep {
        operation,
        probability,
        magnitude,
    }
}

/// An ordered sequence of steps applied to one image/box-set pair.
///
/// Order matters: each step's output feeds the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// The steps of this policy, applied left to right.
    pub steps: Vec<PolicyStep>,
}

impl Policy {
    /// Creates a policy from its steps.
    pub fn new(steps: Vec<PolicyStep>) -> Self {
        Self { steps }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the policy has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Version 3 of the augmentation policies found by AutoAugment policy search
/// on object detection.
///
/// Pure data: deterministic across calls, no side effects. Callers may
/// substitute any catalog of the same shape when constructing a
/// [`PolicyContainer`](crate::policies::PolicyContainer).
pub fn policies_v3() -> Vec<Policy> {
    use OperationKind::*;

    vec![
        Policy::new(vec![step(Posterize, 0.8, 2), step(TranslateX, 1.0, 8)]),
        Policy::new(vec![step(BboxCutout, 0.2, 10), step(Sharpness, 1.0, 8)]),
        Policy::new(vec![step(Rotate, 0.6, 8), step(Rotate, 0.8, 10)]),
        Policy::new(vec![step(Equalize, 0.8, 10), step(AutoContrast, 0.2, 10)]),
        Policy::new(vec![step(SolarizeAdd, 0.2, 2), step(TranslateY, 0.2, 8)]),
        Policy::new(vec![step(Sharpness, 0.0, 2), step(Color, 0.4, 8)]),
        Policy::new(vec![step(Equalize, 1.0, 8), step(TranslateY, 1.0, 8)]),
        Policy::new(vec![step(Posterize, 0.6, 2), step(Rotate, 0.0, 10)]),
        Policy::new(vec![step(AutoContrast, 0.6, 0), step(Rotate, 1.0, 6)]),
        Policy::new(vec![step(Equalize, 0.0, 4), step(Cutout, 0.8, 10)]),
        Policy::new(vec![step(Brightness, 1.0, 2), step(TranslateY, 1.0, 6)]),
        Policy::new(vec![step(Contrast, 0.0, 2), step(ShearY, 0.8, 0)]),
        Policy::new(vec![step(AutoContrast, 0.8, 10), step(Contrast, 0.2, 10)]),
        Policy::new(vec![step(Rotate, 1.0, 10), step(Cutout, 1.0, 10)]),
        Policy::new(vec![step(SolarizeAdd, 0.8, 6), step(Equalize, 0.8, 8)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape_is_fixed() {
        let catalog = policies_v3();
        assert_eq!(catalog.len(), 15);
        for policy in &catalog {
            assert_eq!(policy.len(), 2);
            for step in &policy.steps {
                assert!((0.0..=1.0).contains(&step.probability));
                assert!(step.magnitude <= MAX_MAGNITUDE);
            }
        }
    }

    #[test]
    fn catalog_is_deterministic() {
        assert_eq!(policies_v3(), policies_v3());
    }

    #[test]
    fn step_validation_rejects_out_of_range_parameters() {
        assert!(PolicyStep::new(OperationKind::Rotate, 1.0, 10).is_ok());
        assert!(PolicyStep::new(OperationKind::Rotate, 1.5, 10).is_err());
        assert!(PolicyStep::new(OperationKind::Rotate, -0.1, 10).is_err());
        assert!(PolicyStep::new(OperationKind::Rotate, f32::NAN, 10).is_err());
        assert!(PolicyStep::new(OperationKind::Rotate, 1.0, 11).is_err());
    }

    #[test]
    fn policies_serialize_with_canonical_operation_names() {
        let policy = Policy::new(vec![step(OperationKind::TranslateX, 1.0, 8)]);
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"TranslateX_BBox\""));

        let back: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn unknown_operation_name_fails_deserialization() {
        let json = r#"{"steps":[{"operation":"Warp","probability":0.5,"magnitude":3}]}"#;
        assert!(serde_json::from_str::<Policy>(json).is_err());
    }
}
