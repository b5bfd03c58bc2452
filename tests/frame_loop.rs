use glam::Vec3;

use bodysync::config::DemoConfig;
use bodysync::controller::{
    Action, AssetHandle, BodyHandle, FrameLoopContext, InputEvent, LoadedModel, OrbitControls, PhysicsWorld,
};
use bodysync::model::{AnimationClip, BodyDesc, BodyShape, Camera, Geometry, Material, ProxyId, Scene};
use bodysync::scenes::{self, SceneKind};

const DT: f32 = 1.0 / 60.0;

fn zero_gravity() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.physics.gravity = [0.0, 0.0, 0.0];
    config
}

/// One free dynamic sphere as the player, with a proxy bound to it
fn single_body(config: DemoConfig, start: Vec3) -> (FrameLoopContext, BodyHandle, ProxyId) {
    let controls = OrbitControls::new(Vec3::ZERO, &config.camera);
    let mut world = PhysicsWorld::new(&config.physics);
    let body = world.add_body(BodyDesc::dynamic(5.0, BodyShape::Sphere { radius: 1.0 }).at(start));

    let mut scene = Scene::new();
    let proxy = scene.add_mesh("body", Geometry::Sphere { radius: 1.0 }, Material::Normal);

    let mut ctx = FrameLoopContext::new(scene, Camera::new(45.0, 800, 600), controls, config);
    ctx.physics = Some(world);
    ctx.player = Some(body);
    ctx.bind(body, proxy);
    ctx.resize(800, 600);
    (ctx, body, proxy)
}

fn body_position(ctx: &FrameLoopContext, body: BodyHandle) -> Vec3 {
    ctx.physics
        .as_ref()
        .and_then(|w| w.transform(body))
        .map(|t| t.position)
        .unwrap()
}

fn fox() -> LoadedModel {
    LoadedModel {
        meshes: Vec::new(),
        clips: vec![
            AnimationClip { name: "Survey".into(), duration: 3.4 },
            AnimationClip { name: "Walk".into(), duration: 0.7 },
            AnimationClip { name: "Run".into(), duration: 0.5 },
        ],
    }
}

fn weights(ctx: &FrameLoopContext) -> (f32, f32) {
    let anim = ctx.animation.as_ref().expect("animation is active");
    anim.blend.weights(&anim.mixer)
}

fn run_time_scale(ctx: &FrameLoopContext) -> f32 {
    let anim = ctx.animation.as_ref().expect("animation is active");
    anim.blend.run_time_scale(&anim.mixer)
}

#[test]
fn proxies_match_bodies_after_every_tick() {
    let mut ctx = scenes::controls::scene(DemoConfig::default(), 800, 600);
    ctx.handle_event(&InputEvent::KeyDown("d".into()));

    for _ in 0..120 {
        ctx.tick(DT);
        let world = ctx.physics.as_ref().unwrap();
        for &(body, proxy) in &ctx.bindings {
            let proxy_transform = ctx.scene.get(proxy).unwrap().transform;
            assert_eq!(Some(proxy_transform), world.transform(body));
        }
    }
}

#[test]
fn holding_forward_moves_by_speed_per_frame() {
    let (mut ctx, body, proxy) = single_body(zero_gravity(), Vec3::ZERO);
    ctx.handle_event(&InputEvent::KeyDown("w".into()));

    for _ in 0..30 {
        ctx.tick(DT);
    }

    let pos = body_position(&ctx, body);
    assert!((pos.z - (-3.0)).abs() < 1e-4, "z = {}", pos.z);
    assert!(pos.x.abs() < 1e-6 && pos.y.abs() < 1e-6);
    assert_eq!(ctx.scene.get(proxy).unwrap().transform.position, pos);
}

#[test]
fn holding_jump_climbs_five_units_in_fifty_frames() {
    let (mut ctx, body, _) = single_body(zero_gravity(), Vec3::ZERO);
    ctx.handle_event(&InputEvent::KeyDown(" ".into()));

    for _ in 0..50 {
        ctx.tick(DT);
    }

    let pos = body_position(&ctx, body);
    assert!((pos.y - 5.0).abs() < 1e-4, "y = {}", pos.y);
}

#[test]
fn released_keys_stop_movement() {
    let (mut ctx, body, _) = single_body(zero_gravity(), Vec3::ZERO);
    ctx.handle_event(&InputEvent::KeyDown("a".into()));
    for _ in 0..10 {
        ctx.tick(DT);
    }
    ctx.handle_event(&InputEvent::KeyUp("a".into()));
    let stopped_at = body_position(&ctx, body);
    for _ in 0..10 {
        ctx.tick(DT);
    }
    assert!((body_position(&ctx, body) - stopped_at).length() < 1e-6);
    assert!((stopped_at.x - (-1.0)).abs() < 1e-4);
}

#[test]
fn focus_loss_releases_held_keys() {
    let (mut ctx, body, _) = single_body(zero_gravity(), Vec3::ZERO);
    ctx.handle_event(&InputEvent::KeyDown("w".into()));
    ctx.tick(DT);
    ctx.handle_event(&InputEvent::FocusLost);
    ctx.tick(DT);
    ctx.tick(DT);
    assert!((body_position(&ctx, body).z - (-0.1)).abs() < 1e-5);
}

#[test]
fn sphere_settles_on_plane() {
    let config = DemoConfig::default();
    let (mut ctx, body, _) = single_body(config, Vec3::new(0.0, 4.0, 0.0));
    // The sphere is not steered in this test
    ctx.player = None;
    ctx.physics.as_mut().unwrap().add_body(
        BodyDesc::fixed(BodyShape::Plane)
            .at(Vec3::new(0.0, -2.0, 0.0))
            .rotated(scenes::controls::face_up()),
    );

    let mut lowest = f32::MAX;
    for _ in 0..600 {
        ctx.tick(DT);
        lowest = lowest.min(body_position(&ctx, body).y);
    }

    let y = body_position(&ctx, body).y;
    assert!((y - (-1.0)).abs() < 0.05, "rested at y = {y}");
    assert!(lowest > -1.5, "sank to y = {lowest}");
}

#[test]
fn blend_weights_follow_movement_keys() {
    let mut ctx = scenes::blend::scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
    ctx.tick(DT);
    assert_eq!(weights(&ctx), (1.0, 0.0));

    for key in ["w", "s", "a", "d"] {
        ctx.handle_event(&InputEvent::KeyDown(key.into()));
        ctx.tick(DT);
        assert_eq!(weights(&ctx), (0.0, 1.0), "holding {key:?}");
        ctx.handle_event(&InputEvent::KeyUp(key.into()));
        ctx.tick(DT);
        assert_eq!(weights(&ctx), (1.0, 0.0), "released {key:?}");
    }
}

#[test]
fn run_plays_backwards_after_backward_is_released() {
    let mut ctx = scenes::blend::scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
    ctx.tick(DT);
    assert_eq!(run_time_scale(&ctx), 1.0);

    ctx.handle_event(&InputEvent::KeyDown("s".into()));
    ctx.tick(DT);
    assert_eq!(run_time_scale(&ctx), -1.0);

    ctx.handle_event(&InputEvent::KeyUp("s".into()));
    ctx.tick(DT);
    let input = ctx.input.borrow();
    assert!(Action::ALL.iter().all(|a| !input.is_held(*a)));
    drop(input);
    assert_eq!(run_time_scale(&ctx), -1.0);
    assert_eq!(weights(&ctx), (1.0, 0.0));

    ctx.handle_event(&InputEvent::KeyDown("w".into()));
    ctx.tick(DT);
    assert_eq!(run_time_scale(&ctx), 1.0);
}

#[test]
fn eased_blend_reaches_run_gradually() {
    let mut config = DemoConfig::default();
    config.animation.blend = bodysync::config::BlendMode::Eased { transition_speed: 5.0 };
    let mut ctx = scenes::blend::scene(config, 800, 600, AssetHandle::ready(Ok(fox())));
    // Run starts at full weight and eases out
    for _ in 0..10 {
        ctx.tick(0.1);
    }
    assert_eq!(weights(&ctx), (1.0, 0.0));

    ctx.handle_event(&InputEvent::KeyDown("w".into()));
    ctx.tick(0.1);
    let (idle, run) = weights(&ctx);
    assert!((idle - 0.5).abs() < 1e-5, "idle = {idle}");
    assert!((run - 0.5).abs() < 1e-5, "run = {run}");

    for _ in 0..10 {
        ctx.tick(0.1);
    }
    assert_eq!(weights(&ctx), (0.0, 1.0));
}

#[test]
fn world_keeps_running_while_model_is_pending() {
    let (handle, promise) = AssetHandle::<LoadedModel>::pending();
    let mut ctx = scenes::world::scene(DemoConfig::default(), 800, 600, handle);
    ctx.handle_event(&InputEvent::KeyDown("s".into()));

    for _ in 0..30 {
        let stats = ctx.tick(DT);
        assert_eq!(stats.physics_steps, 1);
        assert!(ctx.animation.is_none());
    }

    promise.complete(Ok(fox()));
    ctx.tick(DT);
    // Backward is still held, but its press happened before the model existed
    assert_eq!(weights(&ctx), (0.0, 1.0));
    assert_eq!(run_time_scale(&ctx), 1.0);
}

#[test]
fn world_survives_a_loader_that_never_reports() {
    let (handle, promise) = AssetHandle::<LoadedModel>::pending();
    drop(promise);
    let mut ctx = scenes::world::scene(DemoConfig::default(), 800, 600, handle);
    for _ in 0..5 {
        ctx.tick(DT);
    }
    assert!(ctx.animation.is_none());
}

#[test]
fn frame_stats_count_frames_and_time() {
    let mut ctx = scenes::controls::scene(DemoConfig::default(), 800, 600);
    ctx.tick(0.02);
    let stats = ctx.tick(0.025);
    assert_eq!(stats.frame, 2);
    assert!((stats.elapsed - 0.045).abs() < 1e-6);
    assert_eq!(stats.delta, 0.025);
    assert_eq!(stats.physics_steps, 1);
    assert_eq!(SceneKind::default(), SceneKind::Controls);
}

#[test]
fn high_refresh_display_simulates_in_real_time() {
    let mut ctx = scenes::controls::scene(DemoConfig::default(), 800, 600);
    let steps: u32 = (0..144).map(|_| ctx.tick(1.0 / 144.0).physics_steps).sum();
    assert!((59..=60).contains(&steps), "took {steps} steps in one second");
}

#[test]
fn stalled_frame_catches_up_at_most_ten_steps() {
    let mut ctx = scenes::controls::scene(DemoConfig::default(), 800, 600);
    assert_eq!(ctx.tick(0.5).physics_steps, 10);
    assert_eq!(ctx.tick(0.0).physics_steps, 0);
}

#[test]
fn movement_is_applied_once_per_frame_whatever_the_step_count() {
    let (mut ctx, body, _) = single_body(zero_gravity(), Vec3::ZERO);
    ctx.handle_event(&InputEvent::KeyDown("w".into()));

    // Frames too short for a step still move the player
    let stats = ctx.tick(1.0 / 240.0);
    assert_eq!(stats.physics_steps, 0);
    assert!((body_position(&ctx, body).z - (-0.1)).abs() < 1e-5);

    let stats = ctx.tick(0.1);
    assert!(stats.physics_steps > 1);
    assert!((body_position(&ctx, body).z - (-0.2)).abs() < 1e-5);
}

#[test]
fn rebound_forward_key_moves_the_player() {
    let mut config = zero_gravity();
    config.keys.forward = "ArrowUp".into();
    let (mut ctx, body, _) = single_body(config, Vec3::ZERO);

    ctx.handle_event(&InputEvent::KeyDown("w".into()));
    ctx.tick(DT);
    assert!(body_position(&ctx, body).length() < 1e-6);

    ctx.handle_event(&InputEvent::KeyDown("ArrowUp".into()));
    ctx.tick(DT);
    assert!((body_position(&ctx, body).z - (-0.1)).abs() < 1e-5);
}

#[test]
fn wheel_notches_in_one_frame_all_dolly() {
    let mut ctx = scenes::blend::scene(DemoConfig::default(), 800, 600, AssetHandle::ready(Ok(fox())));
    ctx.tick(DT);
    let start = (ctx.camera.eye - ctx.controls.target).length();

    for _ in 0..3 {
        ctx.handle_event(&InputEvent::Wheel { steps: -1.0 });
    }
    ctx.tick(DT);
    let after = (ctx.camera.eye - ctx.controls.target).length();
    assert!((after - start * 0.95f32.powi(3)).abs() < 1e-3, "{start} -> {after}");
}
