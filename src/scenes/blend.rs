use glam::Vec3;

use crate::config::DemoConfig;
use crate::controller::{AssetHandle, FrameLoopContext, LoadedModel, ModelSlot, OrbitControls};
use crate::model::{Camera, Geometry, Lights, Material, Scene, Transform};
use crate::scenes::controls::face_up;

pub const FOX_SCALE: f32 = 0.025;
const FLOOR_COLOR: u32 = 0x444444;

/// Camera, controls, lights and floor shared with the world scene
pub(crate) fn stage(config: &DemoConfig, width: u32, height: u32) -> (Scene, Camera, OrbitControls) {
    let mut camera = Camera::new(75.0, width, height);
    camera.eye = Vec3::new(2.0, 2.0, 2.0);
    let controls = OrbitControls::new(Vec3::new(0.0, 0.75, 0.0), &config.camera);

    let mut scene = Scene::new();
    scene.lights = Lights {
        ambient_color: [1.0, 1.0, 1.0],
        ambient_intensity: 2.4,
        directional_color: [1.0, 1.0, 1.0],
        directional_intensity: 1.8,
        directional_position: Vec3::new(-5.0, 5.0, 0.0),
    };
    let floor = scene.add_mesh(
        "floor",
        Geometry::Plane { width: 10.0, height: 10.0 },
        Material::standard_hex(FLOOR_COLOR),
    );
    scene.set_transform(floor, Transform::IDENTITY.with_rotation(face_up()));

    (scene, camera, controls)
}

/// Fox on a floor. Movement keys only switch between the idle and run clips.
pub fn scene(config: DemoConfig, width: u32, height: u32, model: AssetHandle<LoadedModel>) -> FrameLoopContext {
    let (mut scene, camera, controls) = stage(&config, width, height);
    let fox = scene.add_group("fox");

    let mut ctx = FrameLoopContext::new(scene, camera, controls, config);
    ctx.model = Some(ModelSlot {
        handle: model,
        group: fox,
        local: Transform::IDENTITY,
        scale: Vec3::splat(FOX_SCALE),
        material: Material::standard_hex(0xffffff),
    });
    ctx.resize(width, height);
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::InputEvent;
    use crate::model::AnimationClip;

    fn fox() -> LoadedModel {
        LoadedModel {
            meshes: Vec::new(),
            clips: ["Survey", "Walk", "Run"]
                .into_iter()
                .map(|name| AnimationClip { name: name.into(), duration: 1.0 })
                .collect(),
        }
    }

    #[test]
    fn has_no_physics() {
        let ctx = scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
        assert!(ctx.physics.is_none());
        assert!(ctx.player.is_none());
    }

    #[test]
    fn movement_keys_drive_the_blend() {
        let mut ctx = scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
        ctx.tick(0.016);

        ctx.handle_event(&InputEvent::KeyDown("a".into()));
        ctx.tick(0.016);
        let anim = ctx.animation.as_ref().unwrap();
        assert_eq!(anim.blend.weights(&anim.mixer), (0.0, 1.0));

        ctx.handle_event(&InputEvent::KeyUp("a".into()));
        ctx.tick(0.016);
        let anim = ctx.animation.as_ref().unwrap();
        assert_eq!(anim.blend.weights(&anim.mixer), (1.0, 0.0));
    }

    #[test]
    fn jump_alone_keeps_idle() {
        let mut ctx = scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
        ctx.handle_event(&InputEvent::KeyDown(" ".into()));
        ctx.tick(0.016);
        let anim = ctx.animation.as_ref().unwrap();
        assert_eq!(anim.blend.weights(&anim.mixer), (1.0, 0.0));
    }
}
