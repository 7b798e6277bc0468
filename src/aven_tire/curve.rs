// ==============================================================================
// curve.rs — FRICTION CURVE (SLIP RATIO -> FORCE MAGNITUDE)
// ------------------------------------------------------------------------------
// A friction curve is an ordered list of (slip, force) keys evaluated by
// piecewise-linear interpolation:
// - below the first key      -> first key's force
// - above the last key       -> last key's force (saturation)
// - empty curve              -> 0
//
// The model never checks the classic "rise then saturate" tire shape; any
// finite, non-negative set of keys is accepted.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub slip: f32,
    pub force: f32,
}

impl CurveKey {
    pub const fn new(slip: f32, force: f32) -> Self {
        Self { slip, force }
    }
}

/// Slip -> force magnitude lookup.
///
/// Serialized as a plain list of keys; keys are re-sorted by slip when the
/// curve is built or deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct FrictionCurve {
    keys: Vec<CurveKey>,
}

impl From<Vec<CurveKey>> for FrictionCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<FrictionCurve> for Vec<CurveKey> {
    fn from(curve: FrictionCurve) -> Self {
        curve.keys
    }
}

impl FrictionCurve {
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.slip.total_cmp(&b.slip));
        Self { keys }
    }

    /// Same force at every slip.
    pub fn constant(force: f32) -> Self {
        Self::new(vec![CurveKey::new(0.0, force)])
    }

    /// Straight ramp from 0 at zero slip to `force` at `slip`, flat afterwards.
    pub fn linear(slip: f32, force: f32) -> Self {
        Self::new(vec![CurveKey::new(0.0, 0.0), CurveKey::new(slip, force)])
    }

    /// Rolling direction: low grip, the model has no wheel spin state so
    /// anything larger behaves like a brake.
    pub fn default_forward() -> Self {
        Self::new(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.1, 1.5),
            CurveKey::new(0.5, 3.0),
            CurveKey::new(1.0, 3.0),
        ])
    }

    /// Lateral direction: steep rise, peak, slight drop-off once sliding.
    pub fn default_side() -> Self {
        Self::new(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.15, 30.0),
            CurveKey::new(0.4, 40.0),
            CurveKey::new(1.0, 36.0),
        ])
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Force magnitude at `slip` (expected >= 0).
    pub fn evaluate(&self, slip: f32) -> f32 {
        if slip.is_nan() {
            return 0.0;
        }

        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };

        if slip <= first.slip {
            return first.force;
        }
        if slip >= last.slip {
            return last.force;
        }

        // first.slip < slip < last.slip, so 1 <= i < len
        let i = self.keys.partition_point(|k| k.slip < slip);
        let a = self.keys[i - 1];
        let b = self.keys[i];

        let span = b.slip - a.slip;
        if span <= f32::EPSILON {
            return b.force;
        }
        let t = (slip - a.slip) / span;
        a.force + (b.force - a.force) * t
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        for (i, k) in self.keys.iter().enumerate() {
            if !k.slip.is_finite() || !k.force.is_finite() {
                return Err(ConfigError::InvalidCurve {
                    field,
                    reason: format!("key {i} is not finite ({}, {})", k.slip, k.force),
                });
            }
            if k.slip < 0.0 {
                return Err(ConfigError::InvalidCurve {
                    field,
                    reason: format!("key {i} has negative slip {}", k.slip),
                });
            }
            if k.force < 0.0 {
                return Err(ConfigError::InvalidCurve {
                    field,
                    reason: format!("key {i} has negative force {}", k.force),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_curve_is_zero() {
        let c = FrictionCurve::new(Vec::new());
        assert_eq!(c.evaluate(0.0), 0.0);
        assert_eq!(c.evaluate(0.7), 0.0);
    }

    #[test]
    fn interpolates_between_keys() {
        let c = FrictionCurve::new(vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 10.0)]);
        assert!((c.evaluate(0.25) - 2.5).abs() < 1e-6);
        assert!((c.evaluate(0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn saturates_outside_key_range() {
        let c = FrictionCurve::new(vec![CurveKey::new(0.2, 4.0), CurveKey::new(0.6, 8.0)]);
        assert_eq!(c.evaluate(0.0), 4.0);
        assert_eq!(c.evaluate(5.0), 8.0);
        assert_eq!(c.evaluate(f32::INFINITY), 8.0);
    }

    #[test]
    fn keys_are_sorted_on_construction() {
        let c = FrictionCurve::new(vec![
            CurveKey::new(1.0, 2.0),
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.5, 1.0),
        ]);
        let slips: Vec<f32> = c.keys().iter().map(|k| k.slip).collect();
        assert_eq!(slips, vec![0.0, 0.5, 1.0]);
        assert!((c.evaluate(0.75) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn duplicate_slip_keys_do_not_divide_by_zero() {
        let c = FrictionCurve::new(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.5, 1.0),
            CurveKey::new(0.5, 3.0),
            CurveKey::new(1.0, 3.0),
        ]);
        let v = c.evaluate(0.5);
        assert!(v.is_finite());
        assert!((c.evaluate(0.75) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn nan_slip_yields_zero() {
        assert_eq!(FrictionCurve::constant(5.0).evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn deserializes_unsorted_key_list() {
        let c: FrictionCurve =
            serde_json::from_str(r#"[{"slip":1.0,"force":6.0},{"slip":0.0,"force":0.0}]"#)
                .unwrap();
        assert_eq!(c.keys()[0].slip, 0.0);
        assert!((c.evaluate(0.5) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn validate_rejects_negative_force() {
        let c = FrictionCurve::new(vec![CurveKey::new(0.0, -1.0)]);
        let err = c.validate("side_friction").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCurve { field: "side_friction", .. }));
    }

    #[test]
    fn default_curves_are_valid() {
        assert!(FrictionCurve::default_forward().validate("forward_friction").is_ok());
        assert!(FrictionCurve::default_side().validate("side_friction").is_ok());
    }
}
