//! Clip playback bookkeeping.
//!
//! The mixer tracks per-action time, weight and time-scale. Turning those
//! into a skeletal pose is left to whatever consumes the actions.

/// Named clip with its length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

/// Index of an action inside its [`AnimationMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

/// Playable instance of a clip.
#[derive(Debug, Clone)]
pub struct ClipAction {
    pub clip: AnimationClip,
    pub time: f32,
    pub weight: f32,
    pub time_scale: f32,
    pub playing: bool,
}

impl ClipAction {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 1.0,
            time_scale: 1.0,
            playing: false,
        }
    }

    pub fn set_effective_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let duration = self.clip.duration;
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        // Loop in both directions so a negative time-scale plays backwards
        self.time = (self.time + dt * self.time_scale).rem_euclid(duration);
    }
}

#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<ClipAction>,
    pub time: f32,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an action for `clip`. Each call gives a new, stopped action.
    pub fn clip_action(&mut self, clip: AnimationClip) -> ActionId {
        self.actions.push(ClipAction::new(clip));
        ActionId(self.actions.len() - 1)
    }

    pub fn action(&self, id: ActionId) -> Option<&ClipAction> {
        self.actions.get(id.0)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut ClipAction> {
        self.actions.get_mut(id.0)
    }

    pub fn play(&mut self, id: ActionId) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.playing = true;
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        for action in &mut self.actions {
            action.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration: f32) -> AnimationClip {
        AnimationClip { name: "Run".into(), duration }
    }

    #[test]
    fn stopped_actions_do_not_advance() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(clip(1.0));
        mixer.update(0.5);
        assert_eq!(mixer.action(id).unwrap().time, 0.0);
        assert!((mixer.time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn playing_action_wraps_at_duration() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(clip(1.0));
        mixer.play(id);
        mixer.update(0.75);
        mixer.update(0.5);
        assert!((mixer.action(id).unwrap().time - 0.25).abs() < 1e-5);
    }

    #[test]
    fn negative_time_scale_plays_backwards() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(clip(2.0));
        mixer.play(id);
        mixer.action_mut(id).unwrap().time_scale = -1.0;
        mixer.update(0.5);
        assert!((mixer.action(id).unwrap().time - 1.5).abs() < 1e-5);
    }

    #[test]
    fn weight_is_clamped() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(clip(1.0));
        mixer.action_mut(id).unwrap().set_effective_weight(3.0);
        assert_eq!(mixer.action(id).unwrap().weight, 1.0);
    }
}
