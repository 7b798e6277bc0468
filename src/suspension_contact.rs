// ==============================================================================
// suspension_contact.rs — GROUND CONTACT PROBE (SHAPE CAST)
// ------------------------------------------------------------------------------
// One sphere cast per wheel per tick:
//   start = mount + down * min_suspension_length
//   end   = mount + down * (min + max + wheel_radius)
//   shape = ball of PROBE_RADIUS
//
// Excluded from the cast:
// - every collider of the vehicle's own rigid body (hierarchy)
// - every collider tagged as vehicle body (GROUP_VEHICLE_BODY membership)
//
// The reported distance is measured from the mount point, not from the offset
// start. A miss yields ContactState::default() (not grounded).
//
// Notes:
// - This file does NOT apply forces. It only measures contact.
// - Safe to call every tick regardless of the previous result.
// ==============================================================================

use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::*;

use crate::aven_tire::types::{ContactState, Pos3, Vec3};
use crate::config::WheelConfig;

/// Radius of the probe sphere, in world units.
pub const PROBE_RADIUS: Real = 1.0;

pub const GROUP_GROUND: Group = Group::GROUP_1;
/// "Vehicle body" tag: probes never hit colliders with this membership.
pub const GROUP_VEHICLE_BODY: Group = Group::GROUP_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeExclusions {
    /// Rigid body whose colliders are ignored (the vehicle itself).
    pub body: Option<RigidBodyHandle>,
    /// Colliders whose memberships intersect this mask are ignored.
    pub tagged: Group,
}

impl ProbeExclusions {
    pub fn vehicle(body: RigidBodyHandle) -> Self {
        Self {
            body: Some(body),
            tagged: GROUP_VEHICLE_BODY,
        }
    }
}

impl Default for ProbeExclusions {
    fn default() -> Self {
        Self {
            body: None,
            tagged: GROUP_VEHICLE_BODY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRequest {
    pub radius: Real,
    pub start: Point<Real>,
    pub end: Point<Real>,
    pub exclusions: ProbeExclusions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    /// Travel from `ProbeRequest::start` to the impact.
    pub distance: Real,
    /// Sphere centre at impact.
    pub end_position: Point<Real>,
    pub surface_friction: Real,
}

/// Scene collaborator used by the probe.
pub trait SceneQuery {
    fn cast(&self, request: &ProbeRequest) -> Option<SceneHit>;
}

/// Cast from `origin` along `down` through the full suspension span.
pub fn probe<Q: SceneQuery + ?Sized>(
    scene: &Q,
    origin: Pos3,
    down: Vec3,
    config: &WheelConfig,
    exclusions: ProbeExclusions,
) -> ContactState {
    let start_offset = config.probe_start();
    let request = ProbeRequest {
        radius: PROBE_RADIUS,
        start: origin + down * start_offset,
        end: origin + down * config.probe_end(),
        exclusions,
    };

    match scene.cast(&request) {
        Some(hit) => ContactState::hit(
            start_offset + hit.distance,
            hit.end_position,
            hit.surface_friction,
        ),
        None => ContactState::default(),
    }
}

// --------------------------------------------------
// rapier backend
// --------------------------------------------------

/// Read-only view of a rapier scene.
pub struct RapierScene<'a> {
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub query: &'a QueryPipeline,
}

impl<'a> RapierScene<'a> {
    pub fn new(bodies: &'a RigidBodySet, colliders: &'a ColliderSet, query: &'a QueryPipeline) -> Self {
        Self {
            bodies,
            colliders,
            query,
        }
    }
}

/// Shape cast of a ball from `request.start` to `request.end`.
pub(crate) fn cast_ball(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    query: &QueryPipeline,
    request: &ProbeRequest,
) -> Option<SceneHit> {
    let travel = request.end - request.start;
    let length = travel.norm();
    if length <= 0.0 {
        return None;
    }
    let dir = travel / length;

    let shape = Ball::new(request.radius);
    let shape_pos = Isometry::translation(request.start.x, request.start.y, request.start.z);
    let options = ShapeCastOptions {
        max_time_of_impact: length,
        target_distance: 0.0,
        stop_at_penetration: true,
        compute_impact_geometry_on_penetration: true,
    };

    let tagged = request.exclusions.tagged;
    let untagged = move |_: ColliderHandle, c: &Collider| !c.collision_groups().memberships.intersects(tagged);
    let mut filter = QueryFilter::default().predicate(&untagged);
    if let Some(body) = request.exclusions.body {
        filter = filter.exclude_rigid_body(body);
    }

    let (handle, hit) = query.cast_shape(bodies, colliders, &shape_pos, &dir, &shape, options, filter)?;

    let surface_friction = colliders.get(handle).map(|c| c.friction()).unwrap_or(0.0);
    let distance = hit.time_of_impact;

    Some(SceneHit {
        distance,
        end_position: request.start + dir * distance,
        surface_friction,
    })
}

impl SceneQuery for RapierScene<'_> {
    fn cast(&self, request: &ProbeRequest) -> Option<SceneHit> {
        cast_ball(self.bodies, self.colliders, self.query, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedScene {
        hit: Option<SceneHit>,
        seen: RefCell<Vec<ProbeRequest>>,
    }

    impl SceneQuery for FixedScene {
        fn cast(&self, request: &ProbeRequest) -> Option<SceneHit> {
            self.seen.borrow_mut().push(*request);
            self.hit
        }
    }

    fn down() -> Vec3 {
        vector![0.0, -1.0, 0.0]
    }

    #[test]
    fn request_spans_full_travel_from_min_offset() {
        let scene = FixedScene { hit: None, seen: RefCell::new(Vec::new()) };
        let cfg = WheelConfig { min_suspension_length: 3.0, ..WheelConfig::default() };

        let contact = probe(&scene, point![0.0, 50.0, 0.0], down(), &cfg, ProbeExclusions::default());
        assert!(!contact.grounded);

        let req = scene.seen.borrow()[0];
        assert_eq!(req.radius, PROBE_RADIUS);
        assert_eq!(req.start, point![0.0, 47.0, 0.0]);
        // 3 + 8 + 14 below the mount
        assert_eq!(req.end, point![0.0, 25.0, 0.0]);
        assert_eq!(req.exclusions.tagged, GROUP_VEHICLE_BODY);
    }

    #[test]
    fn distance_is_measured_from_mount() {
        let scene = FixedScene {
            hit: Some(SceneHit {
                distance: 10.0,
                end_position: point![0.0, 37.0, 0.0],
                surface_friction: 0.7,
            }),
            seen: RefCell::new(Vec::new()),
        };
        let cfg = WheelConfig { min_suspension_length: 3.0, ..WheelConfig::default() };

        let contact = probe(&scene, point![0.0, 50.0, 0.0], down(), &cfg, ProbeExclusions::default());
        assert!(contact.grounded);
        assert_eq!(contact.distance, 13.0);
        assert_eq!(contact.contact_point, point![0.0, 37.0, 0.0]);
        assert_eq!(contact.surface_friction, 0.7);
    }

    fn ground_scene() -> (RigidBodySet, ColliderSet) {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        // plane y = 0
        colliders.insert(
            ColliderBuilder::halfspace(Vector::y_axis())
                .collision_groups(InteractionGroups::new(GROUP_GROUND, Group::ALL))
                .friction(0.8)
                .build(),
        );
        (bodies, colliders)
    }

    #[test]
    fn rapier_probe_hits_ground() {
        let (bodies, colliders) = ground_scene();
        let mut query = QueryPipeline::new();
        query.update(&colliders);

        let scene = RapierScene::new(&bodies, &colliders, &query);
        let contact = probe(&scene, point![0.0, 21.0, 0.0], down(), &WheelConfig::default(), ProbeExclusions::default());

        assert!(contact.grounded);
        // sphere centre stops one radius above the surface
        assert!((contact.distance - 20.0).abs() < 1e-2);
        assert!((contact.contact_point.y - 1.0).abs() < 1e-2);
        assert!((contact.surface_friction - 0.8).abs() < 1e-6);
    }

    #[test]
    fn rapier_probe_misses_out_of_range() {
        let (bodies, colliders) = ground_scene();
        let mut query = QueryPipeline::new();
        query.update(&colliders);

        let scene = RapierScene::new(&bodies, &colliders, &query);
        let contact = probe(&scene, point![0.0, 40.0, 0.0], down(), &WheelConfig::default(), ProbeExclusions::default());
        assert!(!contact.grounded);
    }

    #[test]
    fn rapier_cast_skips_own_body_and_any_tagged_membership() {
        let (mut bodies, mut colliders) = ground_scene();

        // the vehicle's own body, sitting between mount and ground
        let own = bodies.insert(RigidBodyBuilder::fixed().translation(vector![0.0, 15.0, 0.0]).build());
        colliders.insert_with_parent(
            ColliderBuilder::cuboid(5.0, 0.5, 5.0)
                .collision_groups(InteractionGroups::new(GROUP_GROUND, Group::ALL))
                .build(),
            own,
            &mut bodies,
        );

        // another vehicle's chassis, tagged as vehicle body
        colliders.insert(
            ColliderBuilder::cuboid(5.0, 0.5, 5.0)
                .translation(vector![0.0, 8.0, 0.0])
                .collision_groups(InteractionGroups::new(GROUP_VEHICLE_BODY, GROUP_GROUND))
                .build(),
        );

        // tagged but also a member of the ground group
        colliders.insert(
            ColliderBuilder::cuboid(5.0, 0.5, 5.0)
                .translation(vector![0.0, 4.0, 0.0])
                .collision_groups(InteractionGroups::new(GROUP_GROUND | GROUP_VEHICLE_BODY, Group::ALL))
                .build(),
        );

        let mut query = QueryPipeline::new();
        query.update(&colliders);

        let scene = RapierScene::new(&bodies, &colliders, &query);
        let contact = probe(&scene, point![0.0, 21.0, 0.0], down(), &WheelConfig::default(), ProbeExclusions::vehicle(own));

        assert!(contact.grounded);
        assert!((contact.distance - 20.0).abs() < 1e-2);
    }
}
