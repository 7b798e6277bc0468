// ==============================================================================
// vehicle.rs — VEHICLE = CHASSIS BODY + INDEPENDENT WHEEL UNITS
// ------------------------------------------------------------------------------
// Host-side grouping only. Every WheelUnit still computes its own forces; the
// vehicle just shares the chassis handle and maps driver input:
//   throttle ∈ [-1, 1] -> motor torque = throttle * motor_force (driven wheels)
//   steer    ∈ [-1, 1] -> steer angle  = -steer * max_steer_angle (steered)
// (+steer is a right turn; a positive wheel angle turns left.)
// ==============================================================================

use std::collections::HashSet;

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{WheelConfig, check};
use crate::error::ConfigError;
use crate::wheel::{WheelRole, WheelUnit};

/// One wheel as described in a vehicle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSpec {
    pub id: String,      // "FL", "FR", "RL", "RR"
    pub mount: [f32; 3], // chassis local space
    pub drive: bool,     // receives motor torque
    pub steer: bool,     // follows the steering input
    pub role: WheelRole,
    pub config: WheelConfig,
}

impl Default for WheelSpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            mount: [0.0; 3],
            drive: false,
            steer: false,
            role: WheelRole::Authority,
            config: WheelConfig::default(),
        }
    }
}

impl WheelSpec {
    fn corner(id: &str, mount: [f32; 3], drive: bool, steer: bool) -> Self {
        Self {
            id: id.to_string(),
            mount,
            drive,
            steer,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub spawn: [f32; 3],
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz]
    pub chassis_com_offset: [f32; 3],   // local centre of mass
    pub mass: f32,
    pub inertia_scale: f32, // multiplier on the solid-box inertia
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub motor_force: f32,     // per-tick motor value at full throttle
    pub max_steer_angle: f32, // radians
    pub wheels: Vec<WheelSpec>,
}

impl Default for VehicleConfig {
    /// Rear-driven, front-steered four-wheel car.
    fn default() -> Self {
        Self {
            spawn: [0.0, 32.0, 0.0],
            chassis_half_extents: [36.0, 10.0, 72.0],
            chassis_com_offset: [0.0, -10.0, 0.0], // level with the mounts: no motor pitch lever
            mass: 1000.0,
            inertia_scale: 2.0,
            linear_damping: 0.05,
            angular_damping: 0.5,
            motor_force: 60.0,
            max_steer_angle: 0.6,
            wheels: vec![
                WheelSpec::corner("FL", [-32.0, -10.0, -56.0], false, true),
                WheelSpec::corner("FR", [32.0, -10.0, -56.0], false, true),
                WheelSpec::corner("RL", [-32.0, -10.0, 56.0], true, false),
                WheelSpec::corner("RR", [32.0, -10.0, 56.0], true, false),
            ],
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("vehicle.mass", self.mass, self.mass > 0.0, "> 0")?;
        check("vehicle.inertia_scale", self.inertia_scale, self.inertia_scale > 0.0, "> 0")?;
        for c in self.chassis_com_offset {
            check("vehicle.chassis_com_offset", c, true, "finite")?;
        }
        check("vehicle.linear_damping", self.linear_damping, self.linear_damping >= 0.0, ">= 0")?;
        check("vehicle.angular_damping", self.angular_damping, self.angular_damping >= 0.0, ">= 0")?;
        check("vehicle.motor_force", self.motor_force, true, "finite")?;
        check(
            "vehicle.max_steer_angle",
            self.max_steer_angle,
            (0.0..std::f32::consts::FRAC_PI_2).contains(&self.max_steer_angle),
            "in [0, pi/2)",
        )?;
        for h in self.chassis_half_extents {
            check("vehicle.chassis_half_extents", h, h > 0.0, "> 0")?;
        }
        for s in self.spawn {
            check("vehicle.spawn", s, true, "finite")?;
        }

        let mut seen = HashSet::new();
        for wheel in &self.wheels {
            if !seen.insert(wheel.id.as_str()) {
                return Err(ConfigError::Inconsistent {
                    field: "vehicle.wheels",
                    reason: format!("duplicate wheel id {:?}", wheel.id),
                });
            }
            for m in wheel.mount {
                check("wheel.mount", m, true, "finite")?;
            }
            wheel.config.validate()?;
        }
        Ok(())
    }
}

pub struct VehicleWheel {
    pub unit: WheelUnit,
    pub drive: bool,
    pub steer: bool,
}

pub struct Vehicle {
    pub body: RigidBodyHandle, // the chassis body
    pub config: VehicleConfig,
    pub wheels: Vec<VehicleWheel>,
    pub throttle: f32, // -1.0 (full reverse) .. 1.0 (full forward)
    pub steer: f32,    // -1.0 (full left) .. 1.0 (full right)
}

impl Vehicle {
    /// Builds one WheelUnit per wheel description, all attached to `body`.
    pub fn new(body: RigidBodyHandle, config: VehicleConfig) -> Result<Self, ConfigError> {
        let mut wheels = Vec::with_capacity(config.wheels.len());
        for spec in &config.wheels {
            let [x, y, z] = spec.mount;
            let mut unit = WheelUnit::new(spec.id.clone(), spec.config.clone(), point![x, y, z], spec.role)?;
            unit.attach_body(body);
            wheels.push(VehicleWheel {
                unit,
                drive: spec.drive,
                steer: spec.steer,
            });
        }

        Ok(Self {
            body,
            config,
            wheels,
            throttle: 0.0,
            steer: 0.0,
        })
    }

    /// Stores driver intent; pushed to the wheels by `apply_controls`.
    pub fn set_input(&mut self, throttle: f32, steer: f32) {
        self.throttle = throttle.clamp(-1.0, 1.0);
        self.steer = steer.clamp(-1.0, 1.0);
    }

    pub fn apply_controls(&mut self) {
        let torque = self.throttle * self.config.motor_force;
        let angle = -self.steer * self.config.max_steer_angle;

        for wheel in &mut self.wheels {
            if wheel.drive {
                wheel.unit.apply_motor_torque(torque);
            }
            if wheel.steer {
                wheel.unit.set_steer_angle(angle);
            }
        }
    }

    pub fn wheel(&self, id: &str) -> Option<&WheelUnit> {
        self.wheels.iter().map(|w| &w.unit).find(|u| u.id() == id)
    }

    pub fn grounded_wheels(&self) -> usize {
        self.wheels.iter().filter(|w| w.unit.is_grounded()).count()
    }

    pub fn detach(&mut self) {
        for wheel in &mut self.wheels {
            wheel.unit.detach_body();
        }
    }
}
