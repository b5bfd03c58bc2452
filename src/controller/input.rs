//! Platform-agnostic input handling system

pub use crate::config::KeyBindings;

/// Logical actions the demos react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Jump,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Directional actions drive the run animation, jump does not
    pub fn is_movement(self) -> bool {
        !matches!(self, Action::Jump)
    }
}

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer events
    PointerDrag { dx: f32, dy: f32 },
    /// Wheel notches, positive away from the target
    Wheel { steps: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Held actions plus pointer deltas, written by event handlers and read once
/// per frame.
#[derive(Debug, Default)]
pub struct InputState {
    held: [bool; 5],
    just_pressed: Vec<Action>,
    pub look_delta: (f32, f32),
    pub zoom_steps: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, processor: &InputProcessor, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(action) = processor.action_for_key(key) {
                    self.press(action);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(action) = processor.action_for_key(key) {
                    self.release(action);
                }
            }
            InputEvent::PointerDrag { dx, dy } => {
                self.look_delta.0 += dx;
                self.look_delta.1 += dy;
            }
            InputEvent::Wheel { steps } => {
                self.zoom_steps += steps;
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
            }
        }
    }

    pub fn press(&mut self, action: Action) {
        self.held[action.index()] = true;
        self.just_pressed.push(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held[action.index()] = false;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    /// True while any of forward/backward/left/right is held
    pub fn any_movement(&self) -> bool {
        Action::ALL
            .iter()
            .any(|a| a.is_movement() && self.is_held(*a))
    }

    pub fn clear_keys(&mut self) {
        self.held = [false; 5];
    }

    /// Actions pressed since the previous call, in event order. Key repeat
    /// counts as a fresh press.
    pub fn take_pressed(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.just_pressed)
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    pub fn consume_zoom(&mut self) -> f32 {
        std::mem::take(&mut self.zoom_steps)
    }
}

/// One notch per wheel event whatever its pixel size, like the browser
/// orbit controls
pub fn wheel_notch(delta_y: f32) -> f32 {
    if delta_y > 0.0 {
        1.0
    } else if delta_y < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Maps key strings to actions
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        let b = &self.bindings;
        [
            (&b.forward, Action::Forward),
            (&b.backward, Action::Backward),
            (&b.left, Action::Left),
            (&b.right, Action::Right),
            (&b.jump, Action::Jump),
        ]
        .into_iter()
        .find(|(bound, _)| key.eq_ignore_ascii_case(bound))
        .map(|(_, action)| action)
    }

    /// Keys the browser should not act on (scrolling on space, etc.)
    pub fn is_bound(&self, key: &str) -> bool {
        self.action_for_key(key).is_some()
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, WheelEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn wheel_to_input(e: &WheelEvent) -> InputEvent {
        InputEvent::Wheel { steps: wheel_notch(e.delta_y() as f32) }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::MouseScrollDelta;
    use winit::keyboard::{Key, NamedKey};

    /// Same key strings the browser reports, so one binding table serves both
    pub fn key_to_string(key: &Key) -> Option<String> {
        let named = match key {
            Key::Character(c) => return Some(c.to_string()),
            Key::Named(named) => named,
            _ => return None,
        };
        let s = match named {
            NamedKey::Space => " ",
            NamedKey::ArrowUp => "ArrowUp",
            NamedKey::ArrowDown => "ArrowDown",
            NamedKey::ArrowLeft => "ArrowLeft",
            NamedKey::ArrowRight => "ArrowRight",
            NamedKey::Shift => "Shift",
            NamedKey::Control => "Control",
            NamedKey::Enter => "Enter",
            NamedKey::Escape => "Escape",
            _ => return None,
        };
        Some(s.to_string())
    }

    pub fn key_to_input(key: &Key, is_down: bool) -> Option<InputEvent> {
        let key = key_to_string(key)?;
        Some(if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        })
    }

    /// Line deltas count each line as a notch. Winit reports scrolling
    /// toward the user as positive, the browser the other way round.
    pub fn scroll_to_input(delta: &MouseScrollDelta) -> InputEvent {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => -*y,
            MouseScrollDelta::PixelDelta(p) => wheel_notch(-p.y as f32),
        };
        InputEvent::Wheel { steps }
    }

}
