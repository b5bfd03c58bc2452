// CONTROLLER: Input, physics, animation and the per-frame update
pub mod assets;
pub mod blend;
pub mod camera_controller;
pub mod frame_loop;
pub mod input;
pub mod movement;
pub mod physics;

pub use assets::{load_model, AssetHandle, AssetPromise, LoadedModel};
pub use blend::AnimationBlend;
pub use camera_controller::OrbitControls;
pub use frame_loop::{Animated, FrameLoopContext, FrameStats, ModelSlot};
pub use input::{Action, InputEvent, InputProcessor, InputState, KeyBindings};
pub use movement::PlayerMovement;
pub use physics::{BodyHandle, PhysicsWorld};
