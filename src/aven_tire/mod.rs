//! aven_tire - engine-agnostic wheel helpers (pure types + force model)

pub mod types;
pub mod curve;
pub mod kinematics;
pub mod suspension;
pub mod friction;

pub use types::*;
pub use curve::{CurveKey, FrictionCurve};
pub use kinematics::{WheelAxes, wheel_axes};
