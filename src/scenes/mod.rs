//! The three demo scenes. Each builder returns a ready [`FrameLoopContext`].

use std::fmt;
use std::str::FromStr;

use crate::config::DemoConfig;
use crate::controller::{load_model, FrameLoopContext};
use crate::error::DemoError;

pub mod blend;
pub mod controls;
pub mod world;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    /// Falling sphere and a keyboard-driven cylinder
    #[default]
    Controls,
    /// Fox model switching between idle and run
    Blend,
    /// The fox riding a physics body among the controls props
    World,
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [SceneKind::Controls, SceneKind::Blend, SceneKind::World];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Controls => "controls",
            SceneKind::Blend => "blend",
            SceneKind::World => "world",
        }
    }

    /// Build the scene for a `width` x `height` viewport. Scenes with a model
    /// start loading it here; it shows up on a later frame.
    pub fn build(self, config: DemoConfig, width: u32, height: u32) -> FrameLoopContext {
        tracing::info!(scene = self.name(), width, height, "building scene");
        match self {
            SceneKind::Controls => controls::scene(config, width, height),
            SceneKind::Blend => {
                let model = load_model(&config.model_path);
                blend::scene(config, width, height, model)
            }
            SceneKind::World => {
                let model = load_model(&config.model_path);
                world::scene(config, width, height, model)
            }
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DemoError::UnknownScene(s.to_string()))
    }
}
