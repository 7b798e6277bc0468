// ==============================================================================
// debug_builders.rs — DEBUG OVERLAY PRIMITIVES (HOST -> LOG / CLIENT)
// ------------------------------------------------------------------------------
// Defines serializable debug primitives:
// - DebugWheel: per-wheel state (grounded, contact distance, emitted force)
// - DebugChassis: body pose + box extents
//
// Helpers:
// - push_wheel_debug(): snapshots one WheelUnit after its tick
// - push_chassis_debug(): snapshots a chassis pose
//
// Purely visualization scaffolding: no physics side effects here.
// ==============================================================================

use rapier3d::prelude::*;
use serde::Serialize;

use crate::vehicle::VehicleWheel;
use crate::wheel::{TickOutcome, TickReport};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugOverlay {
    pub chassis: Vec<DebugChassis>,
    pub wheels: Vec<DebugWheel>,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.chassis.clear();
        self.wheels.clear();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugChassis {
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion i, j, k, w
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugWheel {
    pub id: String, // "FL", "FR", "RL", "RR"

    pub center: [f32; 3], // in world space
    pub radius: f32,
    pub grounded: bool,
    pub distance: f32,
    pub surface_friction: f32,
    pub force: [f32; 3], // zero unless applied this tick
    pub steer: f32,
    pub steering: bool,
    pub drive: bool,
}

#[inline]
fn v3(v: Vector<Real>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

pub fn push_wheel_debug(overlay: &mut DebugOverlay, wheel: &VehicleWheel, report: &TickReport) {
    let unit = &wheel.unit;
    let contact = unit.contact();
    let force = match report.outcome {
        TickOutcome::Applied { force, .. } => v3(force),
        TickOutcome::Skipped | TickOutcome::Probed => [0.0; 3],
    };

    overlay.wheels.push(DebugWheel {
        id: unit.id().to_string(),
        center: unit.contact_center().into(),
        radius: unit.config().wheel_radius,
        grounded: contact.grounded,
        distance: contact.distance,
        surface_friction: contact.surface_friction,
        force,
        steer: unit.steer_angle(),
        steering: wheel.steer,
        drive: wheel.drive,
    });
}

pub fn push_chassis_debug(overlay: &mut DebugOverlay, pose: &Isometry<Real>, half_extents: [f32; 3]) {
    overlay.chassis.push(DebugChassis {
        position: pose.translation.vector.into(),
        rotation: [pose.rotation.i, pose.rotation.j, pose.rotation.k, pose.rotation.w],
        half_extents,
    });
}
