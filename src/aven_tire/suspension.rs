// ==============================================================================
// suspension.rs — PER-TICK SPRING + DAMPER
// ------------------------------------------------------------------------------
//   compression = distance - total_length   (> 0: extended past rest)
//   v_axis      = dot(point_vel, up)
//   spring      = -stiffness * compression
//   damping     = -damping   * v_axis
//   impulse     = (spring + damping) * up
//   force       = impulse / dt
//
// The constants are tuned against the fixed step they were authored with; the
// model is NOT an integrated ODE. Changing dt requires re-tuning.
//
// Precondition: dt > 0. There is no runtime guard.
// ==============================================================================

use crate::aven_tire::types::{ContactState, Vec3};
use crate::config::{DerivedSuspension, WheelConfig};

/// Signed spring offset from rest (positive when extended past rest).
#[inline]
pub fn compression(contact: &ContactState, derived: &DerivedSuspension) -> f32 {
    contact.distance - derived.total_length
}

/// Raw per-tick spring + damper value along `up`. Zero when airborne.
pub fn suspension_impulse(
    contact: &ContactState,
    derived: &DerivedSuspension,
    config: &WheelConfig,
    point_velocity: Vec3,
    up: Vec3,
) -> Vec3 {
    if !contact.grounded {
        return Vec3::zeros();
    }

    let velocity_along_axis = point_velocity.dot(&up);
    let damping = -config.suspension_damping * velocity_along_axis;
    let spring = -config.suspension_stiffness * compression(contact, derived);

    up * (damping + spring)
}

/// Instantaneous suspension force for this tick (`impulse / dt`).
pub fn compute_force(
    contact: &ContactState,
    derived: &DerivedSuspension,
    config: &WheelConfig,
    point_velocity: Vec3,
    up: Vec3,
    dt: f32,
) -> Vec3 {
    debug_assert!(dt > 0.0, "suspension dt must be positive");
    suspension_impulse(contact, derived, config, point_velocity, up) / dt
}
