use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::config::PhysicsConfig;
use crate::model::{BodyDesc, BodyKind, BodyShape, Transform};

// Material and damping defaults the scenes were tuned against
const FRICTION: f32 = 0.3;
const LINEAR_DAMPING: f32 = 0.01;
const ANGULAR_DAMPING: f32 = 0.01;

/// Opaque reference to a body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Rigid-body world advanced in fixed steps
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    // Real time not yet covered by a step
    accumulator: f32,
    max_substeps: u32,
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            gravity: vector![gx, gy, gz],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
            max_substeps: config.max_substeps,
            steps: 0,
        }
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = match desc.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(LINEAR_DAMPING)
                .angular_damping(ANGULAR_DAMPING),
        };
        let body = builder.position(to_isometry(&desc.transform)).build();
        let handle = self.bodies.insert(body);

        let collider = match desc.shape {
            BodyShape::Sphere { radius } => ColliderBuilder::ball(radius),
            BodyShape::Plane => ColliderBuilder::halfspace(Vector::z_axis()),
            BodyShape::Box { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
            BodyShape::Cylinder { radius, half_height } => {
                ColliderBuilder::cylinder(half_height, radius)
            }
        }
        .friction(FRICTION);
        let collider = match desc.kind {
            BodyKind::Dynamic => collider.mass(desc.mass),
            BodyKind::Static => collider,
        };
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        tracing::debug!(kind = ?desc.kind, shape = ?desc.shape, position = ?desc.transform.position, "added body");
        BodyHandle(handle)
    }

    /// Feed `dt` seconds of real time and take as many whole timesteps as
    /// fit, at most `max_substeps`. Time past the cap is dropped so a long
    /// stall does not turn into a burst of catch-up frames.
    pub fn step_accumulated(&mut self, dt: f32) -> u32 {
        let timestep = self.integration_parameters.dt;
        if timestep <= 0.0 {
            return 0;
        }
        self.accumulator += dt.max(0.0);

        let mut substeps = 0;
        while self.accumulator >= timestep && substeps < self.max_substeps {
            self.fixed_step();
            self.accumulator -= timestep;
            substeps += 1;
        }
        self.accumulator %= timestep;
        substeps
    }

    /// Advance the simulation by exactly one timestep
    pub fn fixed_step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps += 1;
    }

    pub fn transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.bodies.get(handle.0).map(|body| {
            let t = body.translation();
            let r = body.rotation();
            Transform {
                position: Vec3::new(t.x, t.y, t.z),
                rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
            }
        })
    }

    /// Shift a body's position directly, bypassing the solver
    pub fn translate(&mut self, handle: BodyHandle, offset: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            let moved = *body.translation() + vector![offset.x, offset.y, offset.z];
            body.set_translation(moved, true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Seconds of simulated time so far
    pub fn simulated_time(&self) -> f32 {
        self.steps as f32 * self.timestep()
    }
}

fn to_isometry(t: &Transform) -> Isometry<Real> {
    let q = t.rotation;
    Isometry::from_parts(
        Translation3::new(t.position.x, t.position.y, t.position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn ground_facing_up(y: f32) -> BodyDesc {
        BodyDesc::fixed(BodyShape::Plane)
            .rotated(Quat::from_rotation_x(-FRAC_PI_2))
            .at(Vec3::new(0.0, y, 0.0))
    }

    #[test]
    fn sphere_comes_to_rest_on_ground() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let sphere = world.add_body(
            BodyDesc::dynamic(5.0, BodyShape::Sphere { radius: 1.0 }).at(Vec3::new(0.0, 4.0, 0.0)),
        );
        world.add_body(ground_facing_up(-2.0));

        let mut lowest = f32::MAX;
        for _ in 0..600 {
            world.fixed_step();
            lowest = lowest.min(world.transform(sphere).unwrap().position.y);
        }

        let y = world.transform(sphere).unwrap().position.y;
        assert!((y + 1.0).abs() < 0.05, "sphere rests at {y}");
        assert!(lowest > -1.5, "sphere sank to {lowest}");
    }

    #[test]
    fn static_bodies_do_not_fall() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let block = world.add_body(
            BodyDesc::fixed(BodyShape::Box { half_extents: Vec3::ONE }).at(Vec3::new(1.5, -1.0, -0.5)),
        );
        for _ in 0..30 {
            world.fixed_step();
        }
        assert_eq!(world.transform(block).unwrap().position, Vec3::new(1.5, -1.0, -0.5));
        assert_eq!(world.steps(), 30);
    }

    #[test]
    fn one_step_advances_one_timestep_of_free_fall() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let ball = world.add_body(BodyDesc::dynamic(1.0, BodyShape::Sphere { radius: 0.5 }));
        world.fixed_step();
        let v = world.bodies.get(ball.0).unwrap().linvel().y;
        // Damping shaves a little off the ideal g*dt
        assert!((v + 9.82 / 60.0).abs() < 1e-3, "velocity after one step: {v}");
    }

    #[test]
    fn translate_moves_without_gravity() {
        let config = PhysicsConfig { gravity: [0.0; 3], ..PhysicsConfig::default() };
        let mut world = PhysicsWorld::new(&config);
        let body = world.add_body(
            BodyDesc::dynamic(999.0, BodyShape::Cylinder { radius: 0.5, half_height: 1.0 })
                .at(Vec3::new(-4.0, -1.0, 0.0)),
        );
        world.translate(body, Vec3::new(0.0, 0.0, -0.1));
        world.fixed_step();
        let p = world.transform(body).unwrap().position;
        assert!((p - Vec3::new(-4.0, -1.0, -0.1)).length() < 1e-5);
    }

    #[test]
    fn plane_rotation_is_preserved() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let ground = world.add_body(ground_facing_up(0.0));
        let r = world.transform(ground).unwrap().rotation;
        let normal = r * Vec3::Z;
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn frame_at_the_timestep_takes_one_step() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        for _ in 0..60 {
            assert_eq!(world.step_accumulated(1.0 / 60.0), 1);
        }
        assert_eq!(world.steps(), 60);
    }

    #[test]
    fn high_refresh_frames_share_steps() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut total = 0;
        for _ in 0..144 {
            let n = world.step_accumulated(1.0 / 144.0);
            assert!(n <= 1, "took {n} steps in one 144 Hz frame");
            total += n;
        }
        // One real second is one simulated second
        assert!((59..=60).contains(&total), "took {total} steps");
        assert!((world.simulated_time() - 1.0).abs() < 0.02);
    }

    #[test]
    fn long_frame_is_capped_and_the_rest_dropped() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        assert_eq!(world.step_accumulated(0.5), 10);
        assert_eq!(world.step_accumulated(0.0), 0);
        assert_eq!(world.steps(), 10);
    }

    #[test]
    fn dropped_frames_catch_up() {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        // 30 Hz display
        for _ in 0..30 {
            world.step_accumulated(1.0 / 30.0);
        }
        assert!((59..=60).contains(&world.steps()), "took {} steps", world.steps());
    }
}
