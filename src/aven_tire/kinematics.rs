// ==============================================================================
// kinematics.rs — WHEEL BASIS (WORLD SPACE)
// ------------------------------------------------------------------------------
// Chassis conventions: +Y up, -Z forward, +X right.
//
// wheel_axes(rotation, steer_angle):
// - up:              rotation * +Y
// - vehicle_forward: rotation * -Z (motor force direction)
// - forward:         vehicle_forward rotated about `up` by the steer angle
// - side:            forward × up (points right for an unsteered wheel)
//
// A positive steer angle turns the wheel to the left (right-handed about +Y).
// ==============================================================================

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::aven_tire::types::Vec3;

/// World-space axes of one wheel for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelAxes {
    pub up: Vec3,
    pub forward: Vec3,
    pub side: Vec3,
    pub vehicle_forward: Vec3,
}

impl WheelAxes {
    /// Unrotated, unsteered chassis.
    pub fn identity() -> Self {
        wheel_axes(&UnitQuaternion::identity(), 0.0)
    }

    pub fn down(&self) -> Vec3 {
        -self.up
    }
}

pub fn wheel_axes(rotation: &UnitQuaternion<f32>, steer_angle: f32) -> WheelAxes {
    let up = rotation * Vector3::y();
    let vehicle_forward = rotation * Vector3::new(0.0, 0.0, -1.0);

    let forward = if steer_angle == 0.0 {
        vehicle_forward
    } else {
        let steer = UnitQuaternion::from_axis_angle(&Unit::new_normalize(up), steer_angle);
        steer * vehicle_forward
    };
    let side = forward.cross(&up);

    WheelAxes {
        up,
        forward,
        side,
        vehicle_forward,
    }
}
