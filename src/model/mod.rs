// MODEL: Scene data, bodies and animation state
pub mod animation;
pub mod body;
pub mod camera;
pub mod scene;

pub use animation::{ActionId, AnimationClip, AnimationMixer, ClipAction};
pub use body::{BodyDesc, BodyKind, BodyShape, Transform};
pub use camera::Camera;
pub use scene::{Geometry, Lights, Material, ModelAttachment, ProxyId, ProxyKind, RenderProxy, Scene};
