//! Rigid-body world for the ball, the ground and the screen colliders
//!
//! Integration and contact resolution are rapier's; this module only builds
//! the bodies and reports contacts that involve the ball.

use std::sync::Mutex;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::config::PhysicsSettings;
use crate::{to_glam, to_rapier};

/// Restitution of a screen face; multiplied with the ball's 0.5 this gives
/// an effective 0.3 on a screen hit
pub const SCREEN_RESTITUTION: f32 = 0.6;

/// A contact that started between the ball and another collider this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub other: ColliderHandle,
}

/// Collects contact-start pairs during a step
#[derive(Default)]
struct ContactCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, _) = event {
            if let Ok(mut started) = self.started.lock() {
                started.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ContactCollector,

    ball: RigidBodyHandle,
    ball_collider: ColliderHandle,
    ground: ColliderHandle,
}

impl PhysicsWorld {
    /// Build a world holding the ground plane and the ball
    pub fn new(settings: &PhysicsSettings) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Ground: a static half-space facing +Y through the origin
        let ground_body = bodies.insert(RigidBodyBuilder::fixed().build());
        let ground = colliders.insert_with_parent(
            ColliderBuilder::halfspace(Vector::y_axis())
                .restitution(settings.ground_restitution)
                .build(),
            ground_body,
            &mut bodies,
        );

        let ball_body = RigidBodyBuilder::dynamic()
            .translation(to_rapier(Vec3::from_array(settings.ball_start)))
            .angvel(to_rapier(Vec3::from_array(settings.ball_start_spin)))
            .linear_damping(settings.ball_linear_damping)
            .angular_damping(settings.ball_angular_damping)
            .ccd_enabled(true)
            .build();
        let ball = bodies.insert(ball_body);
        let ball_collider = colliders.insert_with_parent(
            ColliderBuilder::ball(settings.ball_radius)
                .mass(settings.ball_mass)
                .restitution(settings.ball_restitution)
                .restitution_combine_rule(CoefficientCombineRule::Multiply)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            ball,
            &mut bodies,
        );

        Self {
            gravity: to_rapier(Vec3::from_array(settings.gravity)),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ContactCollector::default(),
            ball,
            ball_collider,
            ground,
        }
    }

    /// Add a fixed box collider centred at `position`
    pub fn add_screen_collider(&mut self, position: Vec3, half_extents: Vec3) -> ColliderHandle {
        let body = self.bodies.insert(
            RigidBodyBuilder::fixed()
                .translation(to_rapier(position))
                .build(),
        );
        self.colliders.insert_with_parent(
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .restitution(SCREEN_RESTITUTION)
                .build(),
            body,
            &mut self.bodies,
        )
    }

    /// Advance the world by `dt` and return contacts that started on the ball
    pub fn step(&mut self, dt: f32) -> Vec<Contact> {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );

        let started = match self.events.started.lock() {
            Ok(mut started) => std::mem::take(&mut *started),
            Err(_) => return Vec::new(),
        };

        started
            .into_iter()
            .filter_map(|(a, b)| {
                if a == self.ball_collider {
                    Some(Contact { other: b })
                } else if b == self.ball_collider {
                    Some(Contact { other: a })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Overwrite the ball's linear velocity and wake it
    pub fn set_ball_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(self.ball) {
            body.set_linvel(to_rapier(velocity), true);
        }
    }

    pub fn ball_position(&self) -> Vec3 {
        self.bodies
            .get(self.ball)
            .map(|b| to_glam(b.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn ball_rotation(&self) -> Quat {
        self.bodies
            .get(self.ball)
            .map(|b| {
                let q = b.rotation().coords;
                Quat::from_xyzw(q.x, q.y, q.z, q.w)
            })
            .unwrap_or(Quat::IDENTITY)
    }

    pub fn ball_velocity(&self) -> Vec3 {
        self.bodies
            .get(self.ball)
            .map(|b| to_glam(b.linvel()))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn ground_collider(&self) -> ColliderHandle {
        self.ground
    }

    /// World-space centre of a collider
    pub fn collider_position(&self, handle: ColliderHandle) -> Option<Vec3> {
        self.colliders
            .get(handle)
            .map(|c| to_glam(&c.position().translation.vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_ball_starts_at_spawn() {
        let world = PhysicsWorld::new(&PhysicsSettings::default());
        assert_eq!(world.ball_position(), Vec3::new(0.0, 5.0, 2.0));
        assert_eq!(world.ball_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_gravity_pulls_ball_down() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        for _ in 0..30 {
            world.step(SIM_DT);
        }
        let pos = world.ball_position();
        assert!(pos.y < 5.0);
        assert!(world.ball_velocity().y < 0.0);
    }

    #[test]
    fn test_ball_rests_on_ground() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        for _ in 0..60 * 20 {
            world.step(SIM_DT);
        }
        let pos = world.ball_position();
        assert!(pos.y > 0.0, "ball fell through the ground: {pos:?}");
        assert!(pos.y < 0.5, "ball never settled: {pos:?}");
    }

    #[test]
    fn test_ground_contact_is_reported() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        let ground = world.ground_collider();
        let mut hit_ground = false;
        for _ in 0..120 {
            if world.step(SIM_DT).iter().any(|c| c.other == ground) {
                hit_ground = true;
                break;
            }
        }
        assert!(hit_ground);
    }

    #[test]
    fn test_first_bounce_combines_restitution_by_product() {
        let settings = PhysicsSettings::default();
        let mut world = PhysicsWorld::new(&settings);
        let mut impact = 0.0;
        let mut rebound = None;
        for _ in 0..180 {
            world.step(SIM_DT);
            let vy = world.ball_velocity().y;
            if vy < 0.0 {
                impact = -vy;
            } else if impact > 0.0 {
                rebound = Some(vy);
                break;
            }
        }
        let rebound = rebound.expect("ball never bounced");
        // 0.5 ball x 0.8 ground
        let expected = settings.ball_restitution * settings.ground_restitution;
        assert!((expected - 0.4).abs() < 1e-6);
        let ratio = rebound / impact;
        assert!(
            (ratio - expected).abs() < 0.1,
            "rebound {rebound} after impact {impact}, ratio {ratio}"
        );
    }

    #[test]
    fn test_set_velocity() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        world.set_ball_velocity(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(world.ball_velocity(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_ball_hits_screen_collider() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        // Box directly under the spawn point
        let screen = world.add_screen_collider(Vec3::new(0.0, 2.0, 2.0), Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(world.collider_position(screen), Some(Vec3::new(0.0, 2.0, 2.0)));

        let mut hit = false;
        for _ in 0..120 {
            if world.step(SIM_DT).iter().any(|c| c.other == screen) {
                hit = true;
                break;
            }
        }
        assert!(hit);
    }

    #[test]
    fn test_stepping_is_deterministic() {
        let run = || {
            let mut world = PhysicsWorld::new(&PhysicsSettings::default());
            world.add_screen_collider(Vec3::new(0.0, 1.1, -3.0), Vec3::new(1.778, 1.0, 0.05));
            world.set_ball_velocity(Vec3::new(0.3, 2.0, -4.0));
            (0..240)
                .map(|_| {
                    world.step(SIM_DT);
                    (world.ball_position(), world.ball_rotation())
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
