use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::config::DemoConfig;
use crate::controller::{FrameLoopContext, OrbitControls, PhysicsWorld};
use crate::model::{BodyDesc, BodyShape, Camera, Geometry, Material, Scene, Transform};

pub const GROUND_Y: f32 = -2.0;
pub const SPHERE_START: Vec3 = Vec3::new(0.0, 4.0, 0.0);
pub const PLAYER_START: Vec3 = Vec3::new(-4.0, -1.0, 0.0);

const OBSTACLE_SIZE: f32 = 1.0;
const OBSTACLE_POS: Vec3 = Vec3::new(1.5, -1.0, -0.5);
const PLAYER_RADIUS: f32 = 0.5;
const PLAYER_HEIGHT: f32 = 2.0;
const PLAYER_SEGMENTS: u32 = 12;

/// Rotation that turns a +Z facing plane into a floor facing +Y
pub fn face_up() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

pub fn scene(config: DemoConfig, width: u32, height: u32) -> FrameLoopContext {
    let mut camera = Camera::new(45.0, width, height);
    camera.eye = Vec3::new(0.0, 0.0, 9.0);
    let controls = OrbitControls::new(Vec3::ZERO, &config.camera);

    let mut world = PhysicsWorld::new(&config.physics);
    let sphere = world.add_body(
        BodyDesc::dynamic(5.0, BodyShape::Sphere { radius: 1.0 }).at(SPHERE_START),
    );
    world.add_body(
        BodyDesc::fixed(BodyShape::Plane)
            .at(Vec3::new(0.0, GROUND_Y, 0.0))
            .rotated(face_up()),
    );
    let obstacle = world.add_body(
        BodyDesc::fixed(BodyShape::Box { half_extents: Vec3::splat(OBSTACLE_SIZE) }).at(OBSTACLE_POS),
    );
    let player = world.add_body(
        BodyDesc::dynamic(
            999.0,
            BodyShape::Cylinder { radius: PLAYER_RADIUS, half_height: PLAYER_HEIGHT * 0.5 },
        )
        .at(PLAYER_START),
    );

    let mut scene = Scene::new();
    let sphere_mesh = scene.add_mesh("sphere", Geometry::Sphere { radius: 1.0 }, Material::Normal);
    let ground = scene.add_mesh(
        "ground",
        Geometry::Plane { width: 20.0, height: 20.0 },
        Material::basic_hex(0x333333),
    );
    scene.set_transform(
        ground,
        Transform::from_position(Vec3::new(0.0, GROUND_Y, 0.0)).with_rotation(face_up()),
    );
    let obstacle_mesh = scene.add_mesh(
        "obstacle",
        Geometry::Box { size: Vec3::splat(OBSTACLE_SIZE * 2.0) },
        Material::basic_hex(0xdddddd),
    );
    // Static, so the position is copied once
    if let Some(t) = world.transform(obstacle) {
        scene.set_transform(obstacle_mesh, Transform::from_position(t.position));
    }
    let player_mesh = scene.add_mesh(
        "player",
        Geometry::Cylinder {
            radius_top: PLAYER_RADIUS,
            radius_bottom: PLAYER_RADIUS,
            height: PLAYER_HEIGHT,
            segments: PLAYER_SEGMENTS,
        },
        Material::basic_hex(0x00ff00),
    );

    let mut ctx = FrameLoopContext::new(scene, camera, controls, config);
    ctx.physics = Some(world);
    ctx.player = Some(player);
    ctx.bind(sphere, sphere_mesh);
    ctx.bind(player, player_mesh);
    ctx.resize(width, height);
    ctx
}
