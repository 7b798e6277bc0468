//! Core shared types for `aven_tire` (engine-agnostic).
// aven_tire/types.rs
use nalgebra::{Point3, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Pos3 = Point3<f32>;

// ----- tiny scalar helpers -----

/// Sign that honours zero: `sign(0.0) == 0.0`.
///
/// `f32::signum` returns `1.0` for `+0.0`, which would turn a resting wheel
/// into a full-strength friction force.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Where `value` sits between `a` and `b` (unclamped). 0 when `a == b`.
#[inline]
pub fn inverse_lerp(value: f32, a: f32, b: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        return 0.0;
    }
    (value - a) / span
}

#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

// ============================================
// Contact state (one per wheel, per tick)
// ============================================

/// Result of one ground probe.
///
/// Overwritten wholesale every tick; `distance` and `contact_point` carry no
/// meaning while `grounded` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactState {
    pub grounded: bool,
    /// Cast distance measured from the wheel mount point.
    pub distance: f32,
    /// Probe sphere centre at the moment of impact (world).
    pub contact_point: Pos3,
    /// Friction coefficient of the struck surface, >= 0.
    pub surface_friction: f32,
}

impl ContactState {
    pub fn hit(distance: f32, contact_point: Pos3, surface_friction: f32) -> Self {
        Self {
            grounded: true,
            distance,
            contact_point,
            surface_friction: surface_friction.max(0.0),
        }
    }
}

impl Default for ContactState {
    fn default() -> Self {
        Self {
            grounded: false,
            distance: 0.0,
            contact_point: Pos3::origin(),
            surface_friction: 0.0,
        }
    }
}
