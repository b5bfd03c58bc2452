use crate::config::BlendMode;
use crate::controller::input::Action;
use crate::model::{ActionId, AnimationClip, AnimationMixer};

/// Idle/run weight pair driven by whether the player is moving.
#[derive(Debug, Clone, Copy)]
pub struct AnimationBlend {
    pub idle: ActionId,
    pub run: ActionId,
    pub mode: BlendMode,
}

impl AnimationBlend {
    /// Create both actions on `mixer` and start them. Idle starts fully
    /// weighted; run keeps the default weight until the first update.
    pub fn new(mixer: &mut AnimationMixer, idle: AnimationClip, run: AnimationClip, mode: BlendMode) -> Self {
        let idle = mixer.clip_action(idle);
        let run = mixer.clip_action(run);
        if let Some(action) = mixer.action_mut(idle) {
            action.set_effective_weight(1.0);
        }
        mixer.play(idle);
        mixer.play(run);
        Self { idle, run, mode }
    }

    /// React to a fresh key press. Forward plays the run clip forwards,
    /// backward plays it in reverse. Releasing keys leaves the scale alone.
    pub fn on_pressed(&self, mixer: &mut AnimationMixer, action: Action) {
        let scale = match action {
            Action::Forward => 1.0,
            Action::Backward => -1.0,
            _ => return,
        };
        if let Some(run) = mixer.action_mut(self.run) {
            run.time_scale = scale;
        }
    }

    /// Move weights toward idle=1/run=0 when still, idle=0/run=1 when moving
    pub fn update(&self, mixer: &mut AnimationMixer, moving: bool, dt: f32) {
        let (target_idle, target_run) = if moving { (0.0, 1.0) } else { (1.0, 0.0) };
        for (id, target) in [(self.idle, target_idle), (self.run, target_run)] {
            let Some(action) = mixer.action_mut(id) else { continue };
            let next = match self.mode {
                BlendMode::Cut => target,
                BlendMode::Eased { transition_speed } => {
                    approach(action.weight, target, transition_speed * dt)
                }
            };
            action.set_effective_weight(next);
        }
    }

    pub fn weights(&self, mixer: &AnimationMixer) -> (f32, f32) {
        let idle = mixer.action(self.idle).map_or(0.0, |a| a.weight);
        let run = mixer.action(self.run).map_or(0.0, |a| a.weight);
        (idle, run)
    }

    pub fn run_time_scale(&self, mixer: &AnimationMixer) -> f32 {
        mixer.action(self.run).map_or(1.0, |a| a.time_scale)
    }
}

fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}
