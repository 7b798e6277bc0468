// ==============================================================================
// physics.rs — HOST WORLD (RAPIER PIPELINE + VEHICLES)
// ------------------------------------------------------------------------------
// Owns the rapier sets, the query pipeline, one fixed ground plane and the
// vehicles. Wheels reach rapier only through RapierBackend, which implements
// both collaborator traits (SceneQuery + ChassisBodies).
//
// step(dt):
//   1) clear debug overlay, reset user forces on chassis bodies
//   2) update query pipeline
//   3) driver input -> wheels, tick every wheel (single thread, in order)
//   4) rapier pipeline step
//   5) reset chassis bodies that left the sane region
// ==============================================================================

use std::collections::HashMap;

use rapier3d::parry::mass_properties::MassProperties;
use rapier3d::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::debug_builders::{DebugOverlay, push_chassis_debug, push_wheel_debug};
use crate::error::ConfigError;
use crate::suspension_contact::{GROUP_GROUND, GROUP_VEHICLE_BODY, ProbeRequest, SceneHit, SceneQuery, cast_ball};
use crate::vehicle::{Vehicle, VehicleConfig};
use crate::wheel::{ChassisBodies, TickOutcome};

/// Chassis further than this from the origin (or non-finite) is reset.
pub const RESET_BOUND: Real = 100_000.0;

// --------------------------------------------------
// collaborator backend
// --------------------------------------------------

/// Mutable body access + read-only scene queries for one step.
pub struct RapierBackend<'a> {
    pub bodies: &'a mut RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub query: &'a QueryPipeline,
}

impl SceneQuery for RapierBackend<'_> {
    fn cast(&self, request: &ProbeRequest) -> Option<SceneHit> {
        cast_ball(&*self.bodies, self.colliders, self.query, request)
    }
}

impl ChassisBodies for RapierBackend<'_> {
    fn pose(&self, body: RigidBodyHandle) -> Option<Isometry<Real>> {
        self.bodies.get(body).map(|b| *b.position())
    }

    fn velocity_at_point(&self, body: RigidBodyHandle, point: &Point<Real>) -> Option<Vector<Real>> {
        self.bodies.get(body).map(|b| b.velocity_at_point(point))
    }

    fn apply_force_at_point(&mut self, body: RigidBodyHandle, force: Vector<Real>, point: Point<Real>) -> bool {
        match self.bodies.get_mut(body) {
            Some(b) => {
                b.add_force_at_point(force, point, true);
                true
            }
            None => false,
        }
    }
}

/// Wheel outcomes of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub applied: usize,
    pub probed: usize,
    pub skipped: usize,
}

impl StepSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Applied { .. } => self.applied += 1,
            TickOutcome::Probed => self.probed += 1,
            TickOutcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub vehicles: HashMap<String, Vehicle>, // vehicle id -> vehicle
    pub debug_overlay: DebugOverlay,
}

impl PhysicsWorld {
    /// Empty world with a fixed ground half-space below y = 0.
    pub fn new(config: &SimConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let ground_handle = bodies.insert(RigidBodyBuilder::fixed().build());
        let ground_collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(InteractionGroups::new(GROUP_GROUND, Group::ALL))
            .friction(config.ground_friction)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(
            bodies = bodies.len(),
            colliders = colliders.len(),
            "ground inserted"
        );

        Self {
            gravity: vector![gx, gy, gz],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            vehicles: HashMap::new(),
            debug_overlay: DebugOverlay::default(),
        }
    }

    pub fn debug_snapshot(&self) -> DebugOverlay {
        self.debug_overlay.clone()
    }

    /// Dynamic box chassis tagged as vehicle body, plus its wheel units.
    pub fn spawn_vehicle(
        &mut self,
        id: impl Into<String>,
        config: VehicleConfig,
    ) -> Result<RigidBodyHandle, ConfigError> {
        let id = id.into();
        config.validate()?;

        let [sx, sy, sz] = config.spawn;
        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![sx, sy, sz])
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .build();

        let [hx, hy, hz] = config.chassis_half_extents;
        let [cx, cy, cz] = config.chassis_com_offset;
        let m = config.mass;
        let inertia = vector![
            m / 3.0 * (hy * hy + hz * hz),
            m / 3.0 * (hx * hx + hz * hz),
            m / 3.0 * (hx * hx + hy * hy)
        ] * config.inertia_scale;

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_VEHICLE_BODY, GROUP_GROUND))
            .mass_properties(MassProperties::new(point![cx, cy, cz], m, inertia))
            .friction(0.0)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let vehicle = match Vehicle::new(handle, config) {
            Ok(v) => v,
            Err(e) => {
                self.remove_body(handle);
                return Err(e);
            }
        };

        info!(
            vehicle = %id,
            wheels = vehicle.wheels.len(),
            ?handle,
            "spawned vehicle"
        );
        if self.remove_vehicle(&id).is_some() {
            warn!(vehicle = %id, "vehicle replaced, old chassis removed");
        }
        self.vehicles.insert(id, vehicle);
        Ok(handle)
    }

    /// Takes a vehicle out of the world along with its chassis body.
    /// The returned wheels are detached and skip if ticked again.
    pub fn remove_vehicle(&mut self, id: &str) -> Option<Vehicle> {
        let mut vehicle = self.vehicles.remove(id)?;
        self.remove_body(vehicle.body);
        vehicle.detach();
        info!(vehicle = %id, "removed vehicle");
        Some(vehicle)
    }

    /// Store driver input; applied to the wheels in `step`.
    pub fn set_input(&mut self, id: &str, throttle: f32, steer: f32) -> bool {
        match self.vehicles.get_mut(id) {
            Some(v) => {
                v.set_input(throttle, steer);
                true
            }
            None => false,
        }
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn chassis(&self, id: &str) -> Option<&RigidBody> {
        self.vehicles.get(id).and_then(|v| self.bodies.get(v.body))
    }

    /// Removes a body and its colliders. Wheels referencing it skip from now on.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        let removed = self
            .bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some();
        if removed {
            debug!(?handle, "body removed");
        }
        removed
    }

    pub fn step(&mut self, dt: Real) -> StepSummary {
        debug_assert!(dt > 0.0, "physics dt must be positive");

        // 1) User forces persist across rapier steps; wheels re-emit every tick.
        self.debug_overlay.clear();
        for v in self.vehicles.values() {
            if let Some(body) = self.bodies.get_mut(v.body) {
                body.reset_forces(true);
            }
        }

        // 2) Scene queries must see this step's collider poses.
        self.query_pipeline.update(&self.colliders);

        // 3) Wheels
        let mut summary = StepSummary::default();
        {
            let mut backend = RapierBackend {
                bodies: &mut self.bodies,
                colliders: &self.colliders,
                query: &self.query_pipeline,
            };

            for vehicle in self.vehicles.values_mut() {
                vehicle.apply_controls();

                if let Some(pose) = backend.pose(vehicle.body) {
                    push_chassis_debug(&mut self.debug_overlay, &pose, vehicle.config.chassis_half_extents);
                }

                for wheel in vehicle.wheels.iter_mut() {
                    let report = wheel.unit.tick(&mut backend, dt);
                    summary.record(&report.outcome);
                    push_wheel_debug(&mut self.debug_overlay, wheel, &report);
                }
            }
        }

        // 4) Step physics.
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 5) Safety: bring exploded chassis back to their spawn point.
        for (id, v) in self.vehicles.iter() {
            let Some(body) = self.bodies.get_mut(v.body) else { continue };
            let pos = *body.translation();
            let bad = pos.iter().any(|c| !c.is_finite() || c.abs() > RESET_BOUND);
            if bad {
                let [sx, sy, sz] = v.config.spawn;
                body.set_position(Isometry::translation(sx, sy, sz), true);
                body.set_linvel(Vector::zeros(), true);
                body.set_angvel(Vector::zeros(), true);
                warn!(vehicle = %id, from = ?pos, "reset exploding chassis to spawn");
            }
        }

        summary
    }
}
