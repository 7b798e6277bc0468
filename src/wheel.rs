// ==============================================================================
// wheel.rs — WHEEL UNIT (PROBE -> SUSPENSION -> FRICTION -> POINT FORCE)
// ------------------------------------------------------------------------------
// One WheelUnit per physical wheel. It owns its WheelConfig and ContactState and
// holds a non-owning RigidBodyHandle to the chassis shared by all wheels of the
// vehicle. The handle is re-validated every tick; a stale or missing handle
// skips the tick entirely.
//
// Phases:
//   Inactive --(first tick / activate() with a valid body)--> Active
// Activation derives DerivedSuspension once; it is never recomputed.
//
// Per tick while Active:
//   1) probe ground (always, so is_grounded() stays current on proxies)
//   2) Authority only, grounded only:
//        J = suspension_impulse + friction (+ motor)
//        apply_force_at_point(J / dt, mount point)
//
// Precondition: dt > 0 (checked by debug_assert only).
// ==============================================================================

use rapier3d::prelude::{Isometry, Point, Real, RigidBodyHandle, Vector};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::aven_tire::friction;
use crate::aven_tire::kinematics::wheel_axes;
use crate::aven_tire::suspension;
use crate::aven_tire::types::{ContactState, Vec3};
use crate::config::{DerivedSuspension, WheelConfig};
use crate::error::ConfigError;
use crate::suspension_contact::{ProbeExclusions, SceneQuery, probe};

/// Whether this instance simulates forces or only mirrors contact state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelRole {
    #[default]
    Authority,
    /// Remotely mirrored wheel: probes, never pushes the body.
    Proxy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelPhase {
    Inactive,
    Active(DerivedSuspension),
}

/// Rigid-body collaborator. `None`/`false` means the handle is no longer valid.
pub trait ChassisBodies {
    fn pose(&self, body: RigidBodyHandle) -> Option<Isometry<Real>>;
    fn velocity_at_point(&self, body: RigidBodyHandle, point: &Point<Real>) -> Option<Vector<Real>>;
    fn apply_force_at_point(&mut self, body: RigidBodyHandle, force: Vector<Real>, point: Point<Real>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Body reference missing or invalid; nothing ran.
    Skipped,
    /// Ground probed, no force emitted (proxy, or not grounded).
    Probed,
    /// Combined force emitted at `point`.
    Applied { force: Vector<Real>, point: Point<Real> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub suspension_impulse: Vec3,
    pub friction_impulse: Vec3,
}

impl TickReport {
    fn only(outcome: TickOutcome) -> Self {
        Self {
            outcome,
            suspension_impulse: Vec3::zeros(),
            friction_impulse: Vec3::zeros(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WheelUnit {
    id: String,
    config: WheelConfig,
    mount: Point<Real>, // chassis local space
    role: WheelRole,
    phase: WheelPhase,
    body: Option<RigidBodyHandle>,
    contact: ContactState,
    motor_torque: f32,
    steer_angle: f32, // radians, + = left
    up: Vec3,         // chassis up at the last probe
}

impl WheelUnit {
    pub fn new(
        id: impl Into<String>,
        config: WheelConfig,
        mount: Point<Real>,
        role: WheelRole,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            config,
            mount,
            role,
            phase: WheelPhase::Inactive,
            body: None,
            contact: ContactState::default(),
            motor_torque: 0.0,
            steer_angle: 0.0,
            up: Vec3::y(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn mount(&self) -> Point<Real> {
        self.mount
    }

    pub fn role(&self) -> WheelRole {
        self.role
    }

    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, WheelPhase::Active(_))
    }

    /// Rest contact distance; `None` until activated.
    pub fn total_suspension_length(&self) -> Option<f32> {
        match self.phase {
            WheelPhase::Active(d) => Some(d.total_length),
            WheelPhase::Inactive => None,
        }
    }

    pub fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    pub fn attach_body(&mut self, body: RigidBodyHandle) {
        debug!(wheel = %self.id, ?body, "wheel attached");
        self.body = Some(body);
    }

    /// Drops the body reference; the body itself is untouched.
    pub fn detach_body(&mut self) {
        if self.body.take().is_some() {
            debug!(wheel = %self.id, "wheel detached");
        }
    }

    /// Derive activation constants. Requires a valid body; idempotent.
    pub fn activate<B: ChassisBodies + ?Sized>(&mut self, bodies: &B) -> Option<DerivedSuspension> {
        if let WheelPhase::Active(d) = self.phase {
            return Some(d);
        }
        let body = self.body?;
        bodies.pose(body)?;

        let derived = self.config.derive();
        self.phase = WheelPhase::Active(derived);
        debug!(
            wheel = %self.id,
            total_length = derived.total_length,
            role = ?self.role,
            "wheel activated"
        );
        Some(derived)
    }

    /// Latest value wins; nothing accumulates between ticks.
    pub fn apply_motor_torque(&mut self, value: f32) {
        self.motor_torque = value;
    }

    pub fn motor_torque(&self) -> f32 {
        self.motor_torque
    }

    pub fn set_steer_angle(&mut self, radians: f32) {
        self.steer_angle = radians;
    }

    pub fn steer_angle(&self) -> f32 {
        self.steer_angle
    }

    pub fn is_grounded(&self) -> bool {
        self.contact.grounded
    }

    pub fn contact(&self) -> &ContactState {
        &self.contact
    }

    /// Wheel hub: contact point raised by the wheel radius along chassis up.
    pub fn contact_center(&self) -> Point<Real> {
        self.contact.contact_point + self.up * self.config.wheel_radius
    }

    /// Probe only, from an explicit chassis pose. No force is emitted, so an
    /// inert wheel (no body yet) can still be shown by the host.
    pub fn probe_at<Q: SceneQuery + ?Sized>(&mut self, scene: &Q, chassis_pose: &Isometry<Real>) -> ContactState {
        let axes = wheel_axes(&chassis_pose.rotation, self.steer_angle);
        let exclusions = match self.body {
            Some(body) => ProbeExclusions::vehicle(body),
            None => ProbeExclusions::default(),
        };

        self.contact = probe(scene, chassis_pose * self.mount, axes.down(), &self.config, exclusions);
        self.up = axes.up;
        self.contact
    }

    pub fn tick<W>(&mut self, world: &mut W, dt: f32) -> TickReport
    where
        W: SceneQuery + ChassisBodies,
    {
        debug_assert!(dt > 0.0, "wheel tick dt must be positive");

        let Some(body) = self.body else {
            trace!(wheel = %self.id, "no body attached, skipping tick");
            return self.skip();
        };
        let Some(pose) = world.pose(body) else {
            trace!(wheel = %self.id, "body handle invalid, skipping tick");
            return self.skip();
        };
        let Some(derived) = self.activate(&*world) else {
            return self.skip();
        };

        let axes = wheel_axes(&pose.rotation, self.steer_angle);
        let origin = pose * self.mount;
        self.probe_at(&*world, &pose);

        if self.role == WheelRole::Proxy || !self.contact.grounded {
            trace!(wheel = %self.id, grounded = self.contact.grounded, "probe only");
            return TickReport::only(TickOutcome::Probed);
        }

        let Some(point_velocity) = world.velocity_at_point(body, &origin) else {
            return self.skip();
        };

        let suspension_impulse =
            suspension::suspension_impulse(&self.contact, &derived, &self.config, point_velocity, axes.up);
        let friction_impulse =
            friction::compute_force(&self.contact, &self.config, point_velocity, &axes, self.motor_torque);

        let force = (suspension_impulse + friction_impulse) / dt;
        if !world.apply_force_at_point(body, force, origin) {
            return self.skip();
        }

        trace!(
            wheel = %self.id,
            distance = self.contact.distance,
            force = ?force,
            "wheel force applied"
        );

        TickReport {
            outcome: TickOutcome::Applied { force, point: origin },
            suspension_impulse,
            friction_impulse,
        }
    }

    // A skipped tick has no ground under it: the contact must not outlive the body.
    fn skip(&mut self) -> TickReport {
        self.contact = ContactState::default();
        TickReport::only(TickOutcome::Skipped)
    }
}
