use serde::Deserialize;

use crate::error::Result;

/// Tunables shared by every demo scene.
///
/// All fields are optional in the TOML file; anything missing falls back to
/// the values the scenes were authored with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub movement: MovementConfig,
    pub physics: PhysicsConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub keys: KeyBindings,
    /// Binary glTF with an idle and a run clip
    pub model_path: String,
    pub max_pixel_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// World units added per frame while a direction is held
    pub speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    /// Seconds simulated by one fixed step
    pub timestep: f32,
    /// Most steps one frame may take while catching up with real time
    pub max_substeps: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub idle_clip: usize,
    pub run_clip: usize,
    pub blend: BlendMode,
}

/// How idle/run weights reach their target each frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Weights jump to the target immediately
    #[default]
    Cut,
    /// Weights move toward the target by `transition_speed * dt`
    Eased { transition_speed: f32 },
}

/// Key strings as the browser reports them (`KeyboardEvent.key`), matched
/// without regard to case
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            physics: PhysicsConfig::default(),
            animation: AnimationConfig::default(),
            camera: CameraConfig::default(),
            keys: KeyBindings::default(),
            model_path: "models/Fox/glTF-Binary/Fox.glb".to_string(),
            max_pixel_ratio: 2.0,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { speed: 0.1 }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 10,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_clip: 0,
            run_clip: 1,
            blend: BlendMode::Cut,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

impl DemoConfig {
    pub fn from_toml(src: &str) -> Result<Self> {
        Ok(toml::from_str(src)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&src)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
