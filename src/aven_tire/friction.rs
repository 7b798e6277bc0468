// ==============================================================================
// friction.rs — SLIP-CURVE FRICTION + MOTOR DRIVE (PER-TICK DOMAIN)
// ==============================================================================
// Steps:
// 1) speed = |v|
// 2) slip(dir) = dot(v, dir) / (speed + SLIP_EPSILON), forward and side
// 3) per axis: F = -curve(|slip|) * sign(slip) * dir      (opposes slip)
// 4) low_speed = clamp01(inverse_lerp(speed, 0, FULL_FRICTION_SPEED))
// 5) total = (F_side + F_forward) * low_speed * surface_friction
//            + motor_torque * vehicle_forward
//
// The result is a per-tick value; the caller divides by dt once, together with
// the suspension term, when it emits the point force.
//
// Known limitation: the low-speed ramp suppresses friction near rest, so a
// parked vehicle on a slope creeps. Static friction is not modelled.
// The motor is a direct force along the vehicle forward axis; there is no
// wheel spin / angular velocity state.
// ==============================================================================

use crate::aven_tire::curve::FrictionCurve;
use crate::aven_tire::kinematics::WheelAxes;
use crate::aven_tire::types::{ContactState, Vec3, clamp01, inverse_lerp, sign};
use crate::config::WheelConfig;

/// Keeps slip finite as speed approaches zero.
pub const SLIP_EPSILON: f32 = 0.01;

/// Speed at and above which friction is applied at full strength.
pub const FULL_FRICTION_SPEED: f32 = 32.0;

#[inline]
pub fn slip_ratio(velocity: Vec3, direction: Vec3) -> f32 {
    velocity.dot(&direction) / (velocity.norm() + SLIP_EPSILON)
}

#[inline]
pub fn low_speed_factor(speed: f32) -> f32 {
    clamp01(inverse_lerp(speed, 0.0, FULL_FRICTION_SPEED))
}

/// Friction along one axis for a given slip; zero at zero slip.
#[inline]
pub fn axis_friction(curve: &FrictionCurve, slip: f32, direction: Vec3) -> Vec3 {
    -direction * (curve.evaluate(slip.abs()) * sign(slip))
}

/// Every term of one friction evaluation, for debugging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionBreakdown {
    pub forward_slip: f32,
    pub side_slip: f32,
    pub forward: Vec3,
    pub side: Vec3,
    pub low_speed_factor: f32,
    pub motor: Vec3,
    pub total: Vec3,
}

impl FrictionBreakdown {
    fn airborne() -> Self {
        Self {
            forward_slip: 0.0,
            side_slip: 0.0,
            forward: Vec3::zeros(),
            side: Vec3::zeros(),
            low_speed_factor: 0.0,
            motor: Vec3::zeros(),
            total: Vec3::zeros(),
        }
    }
}

pub fn evaluate(
    contact: &ContactState,
    config: &WheelConfig,
    point_velocity: Vec3,
    axes: &WheelAxes,
    motor_torque: f32,
) -> FrictionBreakdown {
    if !contact.grounded {
        return FrictionBreakdown::airborne();
    }

    let speed = point_velocity.norm();
    let forward_slip = slip_ratio(point_velocity, axes.forward);
    let side_slip = slip_ratio(point_velocity, axes.side);

    let forward = axis_friction(&config.forward_friction, forward_slip, axes.forward);
    let side = axis_friction(&config.side_friction, side_slip, axes.side);

    let low_speed = low_speed_factor(speed);
    let motor = axes.vehicle_forward * motor_torque;
    let total = (side + forward) * low_speed * contact.surface_friction + motor;

    FrictionBreakdown {
        forward_slip,
        side_slip,
        forward,
        side,
        low_speed_factor: low_speed,
        motor,
        total,
    }
}

/// Combined in-plane per-tick friction + motor contribution.
pub fn compute_force(
    contact: &ContactState,
    config: &WheelConfig,
    point_velocity: Vec3,
    axes: &WheelAxes,
    motor_torque: f32,
) -> Vec3 {
    evaluate(contact, config, point_velocity, axes, motor_torque).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aven_tire::types::Pos3;
    use proptest::prelude::*;

    fn ground(mu: f32) -> ContactState {
        ContactState::hit(20.0, Pos3::origin(), mu)
    }

    fn flat_config() -> WheelConfig {
        WheelConfig {
            forward_friction: FrictionCurve::constant(2.0),
            side_friction: FrictionCurve::linear(1.0, 10.0),
            ..WheelConfig::default()
        }
    }

    #[test]
    fn rest_produces_no_friction_and_no_nan() {
        let axes = WheelAxes::identity();
        assert_eq!(slip_ratio(Vec3::zeros(), axes.forward), 0.0);
        assert_eq!(slip_ratio(Vec3::zeros(), axes.side), 0.0);

        let b = evaluate(&ground(1.0), &flat_config(), Vec3::zeros(), &axes, 0.0);
        assert_eq!(b.total, Vec3::zeros());
        assert!(b.total.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn constant_curve_still_zero_at_rest() {
        // curve(0) = 2.0 but sign(0) = 0 removes it
        let axes = WheelAxes::identity();
        let f = axis_friction(&FrictionCurve::constant(2.0), 0.0, axes.forward);
        assert_eq!(f, Vec3::zeros());
    }

    #[test]
    fn airborne_ignores_motor() {
        let axes = WheelAxes::identity();
        let f = compute_force(
            &ContactState::default(),
            &flat_config(),
            Vec3::new(40.0, 0.0, -10.0),
            &axes,
            500.0,
        );
        assert_eq!(f, Vec3::zeros());
    }

    #[test]
    fn low_speed_ramp_endpoints() {
        assert_eq!(low_speed_factor(0.0), 0.0);
        assert_eq!(low_speed_factor(16.0), 0.5);
        assert_eq!(low_speed_factor(32.0), 1.0);
        assert_eq!(low_speed_factor(500.0), 1.0);
    }

    #[test]
    fn side_slide_is_opposed() {
        let axes = WheelAxes::identity();
        // sliding right at full-friction speed
        let v = Vec3::new(64.0, 0.0, 0.0);
        let b = evaluate(&ground(1.0), &flat_config(), v, &axes, 0.0);

        assert!(b.side_slip > 0.99);
        assert!(b.total.x < 0.0);
        assert!(b.total.y.abs() < 1e-6);
        assert_eq!(b.low_speed_factor, 1.0);
    }

    #[test]
    fn surface_friction_scales_but_motor_does_not() {
        let axes = WheelAxes::identity();
        let v = Vec3::new(0.0, 0.0, -40.0);
        let dry = evaluate(&ground(1.0), &flat_config(), v, &axes, 100.0);
        let ice = evaluate(&ground(0.0), &flat_config(), v, &axes, 100.0);

        assert!((dry.total.z - (2.0 - 100.0)).abs() < 1e-3);
        assert!((ice.total - Vec3::new(0.0, 0.0, -100.0)).norm() < 1e-4);
    }

    #[test]
    fn motor_follows_vehicle_forward_not_steered_wheel() {
        let axes = crate::aven_tire::kinematics::wheel_axes(
            &nalgebra::UnitQuaternion::identity(),
            0.5,
        );
        let f = compute_force(&ground(1.0), &flat_config(), Vec3::zeros(), &axes, 10.0);
        assert!((f - Vec3::new(0.0, 0.0, -10.0)).norm() < 1e-6);
    }

    proptest! {
        #[test]
        fn slip_sign_symmetry(
            x in -200.0f32..200.0,
            y in -50.0f32..50.0,
            z in -200.0f32..200.0,
            mu in 0.0f32..2.0,
        ) {
            let v = Vec3::new(x, y, z);
            prop_assume!(v.norm() > 1e-3);

            let axes = WheelAxes::identity();
            let cfg = WheelConfig::default();
            let a = compute_force(&ground(mu), &cfg, v, &axes, 0.0);
            let b = compute_force(&ground(mu), &cfg, -v, &axes, 0.0);

            prop_assert!((a + b).norm() <= 1e-4 * (1.0 + a.norm()));
        }

        #[test]
        fn low_speed_factor_is_monotonic(a in 0.0f32..64.0, b in 0.0f32..64.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(low_speed_factor(lo) <= low_speed_factor(hi));
            prop_assert!((0.0..=1.0).contains(&low_speed_factor(hi)));
        }

        #[test]
        fn slip_ratio_is_bounded(x in -1e4f32..1e4, z in -1e4f32..1e4) {
            let v = Vec3::new(x, 0.0, z);
            let axes = WheelAxes::identity();
            prop_assert!(slip_ratio(v, axes.forward).abs() <= 1.0);
            prop_assert!(slip_ratio(v, axes.side).abs() <= 1.0);
        }
    }
}
