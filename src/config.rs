// ==============================================================================
// config.rs — WHEEL + SIMULATION CONFIGURATION
// ------------------------------------------------------------------------------
// WheelConfig is the per-wheel surface a host/editor sets before activation.
// DerivedSuspension is computed from it exactly once, when a wheel activates,
// and never recomputed afterwards.
//
// SimConfig describes the demo host (world + one vehicle) and is loaded from
// JSON. Every struct uses serde defaults so partial files are valid.
// ==============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aven_tire::curve::FrictionCurve;
use crate::error::ConfigError;
use crate::vehicle::VehicleConfig;

/// Per-wheel suspension + tire parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub min_suspension_length: f32, // probe start offset below the mount
    pub max_suspension_length: f32, // travel
    pub suspension_stiffness: f32,  // per-tick spring constant
    pub suspension_damping: f32,    // per-tick damper constant
    pub wheel_radius: f32,
    pub forward_friction: FrictionCurve,
    pub side_friction: FrictionCurve,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            min_suspension_length: 0.0,
            max_suspension_length: 8.0,
            suspension_stiffness: 3000.0,
            suspension_damping: 140.0,
            wheel_radius: 14.0,
            forward_friction: FrictionCurve::default_forward(),
            side_friction: FrictionCurve::default_side(),
        }
    }
}

pub(crate) fn check(field: &'static str, value: f32, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, expected })
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("min_suspension_length", self.min_suspension_length, self.min_suspension_length >= 0.0, ">= 0")?;
        check("max_suspension_length", self.max_suspension_length, self.max_suspension_length >= 0.0, ">= 0")?;
        check("suspension_stiffness", self.suspension_stiffness, self.suspension_stiffness > 0.0, "> 0")?;
        check("suspension_damping", self.suspension_damping, self.suspension_damping >= 0.0, ">= 0")?;
        check("wheel_radius", self.wheel_radius, self.wheel_radius > 0.0, "> 0")?;

        if self.max_suspension_length < self.min_suspension_length {
            return Err(ConfigError::Inconsistent {
                field: "max_suspension_length",
                reason: format!(
                    "max ({}) is shorter than min ({})",
                    self.max_suspension_length, self.min_suspension_length
                ),
            });
        }

        self.forward_friction.validate("forward_friction")?;
        self.side_friction.validate("side_friction")?;
        Ok(())
    }

    /// Distance below the mount where the probe starts.
    pub fn probe_start(&self) -> f32 {
        self.min_suspension_length
    }

    /// Distance below the mount where the probe ends.
    pub fn probe_end(&self) -> f32 {
        self.min_suspension_length + self.max_suspension_length + self.wheel_radius
    }

    /// Values fixed at activation.
    pub fn derive(&self) -> DerivedSuspension {
        DerivedSuspension {
            total_length: (self.max_suspension_length + self.wheel_radius) - self.min_suspension_length,
        }
    }
}

/// Activation-time constants of one wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedSuspension {
    /// Contact distance at which the spring is at rest.
    pub total_length: f32,
}

// --------------------------------------------------
// Host configuration
// --------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub gravity: [f32; 3],
    pub dt: f32,                        // fixed step (s)
    pub ticks: u64,                     // run length of the demo host
    pub ground_friction: f32,
    pub vehicle: VehicleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -800.0, 0.0],
            dt: 1.0 / 60.0,
            ticks: 600,
            ground_friction: 1.0,
            vehicle: VehicleConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("dt", self.dt, self.dt > 0.0, "> 0")?;
        check("ground_friction", self.ground_friction, self.ground_friction >= 0.0, ">= 0")?;
        for g in self.gravity {
            check("gravity", g, true, "finite")?;
        }
        self.vehicle.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_total_length_22() {
        let cfg = WheelConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.derive().total_length, 22.0);
        assert_eq!(cfg.probe_start(), 0.0);
        assert_eq!(cfg.probe_end(), 22.0);
    }

    #[test]
    fn min_length_shortens_rest_but_extends_probe() {
        let cfg = WheelConfig { min_suspension_length: 2.0, ..WheelConfig::default() };
        assert_eq!(cfg.derive().total_length, 20.0);
        assert_eq!(cfg.probe_start(), 2.0);
        assert_eq!(cfg.probe_end(), 24.0);
    }

    #[test]
    fn rejects_zero_stiffness() {
        let cfg = WheelConfig { suspension_stiffness: 0.0, ..WheelConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { field: "suspension_stiffness", .. })
        ));
    }

    #[test]
    fn rejects_nan_radius() {
        let cfg = WheelConfig { wheel_radius: f32::NAN, ..WheelConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_max_shorter_than_min() {
        let cfg = WheelConfig {
            min_suspension_length: 5.0,
            max_suspension_length: 3.0,
            ..WheelConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Inconsistent { .. })));
    }

    #[test]
    fn partial_wheel_json_keeps_defaults() {
        let cfg: WheelConfig = serde_json::from_str(r#"{"wheel_radius": 16.0}"#).unwrap();
        assert_eq!(cfg.wheel_radius, 16.0);
        assert_eq!(cfg.suspension_stiffness, 3000.0);
        assert_eq!(cfg.side_friction, FrictionCurve::default_side());
    }

    #[test]
    fn sim_config_from_partial_json() {
        let cfg = SimConfig::from_json_str(r#"{"dt": 0.01, "gravity": [0.0, -9.81, 0.0]}"#).unwrap();
        assert_eq!(cfg.dt, 0.01);
        assert_eq!(cfg.ticks, 600);
        assert_eq!(cfg.vehicle.wheels.len(), 4);
    }

    #[test]
    fn sim_config_rejects_zero_dt() {
        assert!(matches!(
            SimConfig::from_json_str(r#"{"dt": 0.0}"#),
            Err(ConfigError::OutOfRange { field: "dt", .. })
        ));
    }

    #[test]
    fn sim_config_reports_bad_json() {
        assert!(matches!(SimConfig::from_json_str("{ not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
