use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::config::DemoConfig;
use crate::controller::{AssetHandle, FrameLoopContext, LoadedModel, ModelSlot, PhysicsWorld};
use crate::model::{BodyDesc, BodyShape, Geometry, Material, Transform};
use crate::scenes::blend::{stage, FOX_SCALE};
use crate::scenes::controls::face_up;

/// Half extents of the player box
pub const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.3, 1.0, 1.5);
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 1.0, 0.0);

const OBSTACLE_POS: Vec3 = Vec3::new(-3.0, 1.0, 0.0);

/// The blend scene's fox attached to a physics body, plus a falling sphere
/// and a static obstacle.
pub fn scene(config: DemoConfig, width: u32, height: u32, model: AssetHandle<LoadedModel>) -> FrameLoopContext {
    let (mut scene, camera, controls) = stage(&config, width, height);

    let mut world = PhysicsWorld::new(&config.physics);
    let sphere = world.add_body(
        BodyDesc::dynamic(5.0, BodyShape::Sphere { radius: 1.0 }).at(Vec3::new(0.0, 4.0, 0.0)),
    );
    world.add_body(BodyDesc::fixed(BodyShape::Plane).rotated(face_up()));
    world.add_body(
        BodyDesc::fixed(BodyShape::Box { half_extents: Vec3::ONE }).at(OBSTACLE_POS),
    );
    let player = world.add_body(
        BodyDesc::dynamic(999.0, BodyShape::Box { half_extents: PLAYER_HALF_EXTENTS }).at(PLAYER_START),
    );

    let sphere_mesh = scene.add_mesh("sphere", Geometry::Sphere { radius: 1.0 }, Material::Normal);
    let obstacle_mesh = scene.add_mesh(
        "obstacle",
        Geometry::Box { size: Vec3::splat(2.0) },
        Material::basic_hex(0xdddddd),
    );
    scene.set_transform(obstacle_mesh, Transform::from_position(OBSTACLE_POS));
    let fox_player = scene.add_group("fox_player");

    let mut ctx = FrameLoopContext::new(scene, camera, controls, config);
    ctx.physics = Some(world);
    ctx.player = Some(player);
    ctx.bind(sphere, sphere_mesh);
    ctx.bind(player, fox_player);
    // Feet on the bottom of the box, facing -Z
    ctx.model = Some(ModelSlot {
        handle: model,
        group: fox_player,
        local: Transform::from_position(Vec3::new(0.0, -PLAYER_HALF_EXTENTS.y, 0.0))
            .with_rotation(Quat::from_rotation_y(PI)),
        scale: Vec3::splat(FOX_SCALE),
        material: Material::standard_hex(0xffffff),
    });
    ctx.resize(width, height);
    ctx
}
