use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::config::DemoConfig;
use crate::controller::assets::{AssetHandle, LoadedModel};
use crate::controller::blend::AnimationBlend;
use crate::controller::camera_controller::OrbitControls;
use crate::controller::input::{InputEvent, InputProcessor, InputState};
use crate::controller::movement::PlayerMovement;
use crate::controller::physics::{BodyHandle, PhysicsWorld};
use crate::model::{AnimationMixer, Camera, Material, ModelAttachment, ProxyId, Scene, Transform};

/// Where a loaded model goes once its asset resolves
pub struct ModelSlot {
    pub handle: AssetHandle<LoadedModel>,
    pub group: ProxyId,
    pub local: Transform,
    pub scale: Vec3,
    pub material: Material,
}

/// Mixer plus the idle/run pair, present only after the model loaded
pub struct Animated {
    pub mixer: AnimationMixer,
    pub blend: AnimationBlend,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub physics_steps: u32,
}

/// Main demo loop state and update logic
pub struct FrameLoopContext {
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub physics: Option<PhysicsWorld>,
    pub input: Rc<RefCell<InputState>>,
    pub input_processor: InputProcessor,
    pub movement: PlayerMovement,
    pub player: Option<BodyHandle>,
    /// Proxies that copy a body's transform every tick
    pub bindings: Vec<(BodyHandle, ProxyId)>,
    pub model: Option<ModelSlot>,
    pub animation: Option<Animated>,
    pub config: DemoConfig,
    pub viewport: (u32, u32),
    frame: u64,
    elapsed: f32,
}

impl FrameLoopContext {
    pub fn new(scene: Scene, camera: Camera, controls: OrbitControls, config: DemoConfig) -> Self {
        Self {
            scene,
            camera,
            controls,
            physics: None,
            input: Rc::new(RefCell::new(InputState::new())),
            input_processor: InputProcessor::new(config.keys.clone()),
            movement: PlayerMovement::new(config.movement.speed),
            player: None,
            bindings: Vec::new(),
            model: None,
            animation: None,
            config,
            viewport: (1, 1),
            frame: 0,
            elapsed: 0.0,
        }
    }

    /// Keep `proxy` on top of `body` from the next tick on. The proxy starts
    /// at the body's current transform.
    pub fn bind(&mut self, body: BodyHandle, proxy: ProxyId) {
        if let Some(t) = self.physics.as_ref().and_then(|w| w.transform(body)) {
            self.scene.set_transform(proxy, t);
        }
        self.bindings.push((body, proxy));
    }

    pub fn handle_event(&self, event: &InputEvent) {
        self.input.borrow_mut().process_event(&self.input_processor, event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
    }

    /// Advance the demo by one display frame. Rendering is left to the
    /// caller, which draws `scene` from `camera` afterwards.
    pub fn tick(&mut self, dt: f32) -> FrameStats {
        self.frame += 1;
        self.elapsed += dt;
        let _span = tracing::trace_span!("tick", frame = self.frame, dt).entered();

        self.poll_model();

        let mut input = self.input.borrow_mut();

        for action in input.take_pressed() {
            if let Some(anim) = self.animation.as_mut() {
                anim.blend.on_pressed(&mut anim.mixer, action);
            }
        }

        let mut physics_steps = 0;
        if let Some(world) = self.physics.as_mut() {
            physics_steps = world.step_accumulated(dt);

            if let Some(player) = self.player {
                self.movement.apply(world, player, &input);
            }

            for &(body, proxy) in &self.bindings {
                if let Some(t) = world.transform(body) {
                    self.scene.set_transform(proxy, t);
                }
            }
        }

        if let Some(anim) = self.animation.as_mut() {
            anim.mixer.update(dt);
            anim.blend.update(&mut anim.mixer, input.any_movement(), dt);
        }

        let (dx, dy) = input.consume_look();
        let zoom = input.consume_zoom();
        drop(input);
        self.controls.apply_drag(dx, dy, self.viewport.1);
        self.controls.apply_zoom(zoom);
        self.controls.update(&mut self.camera);

        FrameStats {
            frame: self.frame,
            elapsed: self.elapsed,
            delta: dt,
            physics_steps,
        }
    }

    /// Attach the model and start its clips the first tick the asset is ready
    fn poll_model(&mut self) {
        let Some(slot) = self.model.as_ref() else { return };
        let Some(result) = slot.handle.take() else { return };
        let slot = match self.model.take() {
            Some(slot) => slot,
            None => return,
        };

        let model = match result {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!("model failed to load, continuing without animation: {e}");
                return;
            }
        };

        let attached = self.scene.attach(
            slot.group,
            ModelAttachment {
                local: slot.local,
                scale: slot.scale,
                material: slot.material,
                meshes: model.meshes.clone(),
            },
        );
        if !attached {
            tracing::warn!(group = ?slot.group, "model target is not a group proxy");
        }

        let clips = model
            .clip(self.config.animation.idle_clip)
            .and_then(|idle| Ok((idle, model.clip(self.config.animation.run_clip)?)));
        match clips {
            Ok((idle, run)) => {
                tracing::info!(idle = %idle.name, run = %run.name, "animation ready");
                let mut mixer = AnimationMixer::new();
                let blend = AnimationBlend::new(&mut mixer, idle, run, self.config.animation.blend);
                self.animation = Some(Animated { mixer, blend });
            }
            Err(e) => tracing::warn!("model has no usable clips: {e}"),
        }
    }
}
