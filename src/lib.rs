//! aven-wheel: per-tick raycast-style wheel model on top of rapier.
//!
//! `aven_tire` holds the engine-agnostic math; `suspension_contact` and
//! `wheel` connect it to a scene and a chassis body; `physics` is the host
//! world used by the `wheel-sim` binary and the integration tests.

pub mod aven_tire;
pub mod config;
pub mod debug_builders;
pub mod error;
pub mod physics;
pub mod suspension_contact;
pub mod vehicle;
pub mod wheel;

pub use config::{DerivedSuspension, SimConfig, WheelConfig};
pub use error::ConfigError;
pub use physics::{PhysicsWorld, StepSummary};
pub use vehicle::{Vehicle, VehicleConfig};
pub use wheel::{ChassisBodies, TickOutcome, TickReport, WheelPhase, WheelRole, WheelUnit};
