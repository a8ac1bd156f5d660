//! Keyboard and mouse state, mapped onto walker commands.

use glam::Vec2;
use std::collections::HashSet;

/// Discrete command for a player-controlled walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerCommand {
    #[default]
    Idle,
    TurnLeft,
    TurnRight,
    GoForward,
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,

    /// Cursor position in window coordinates.
    mouse_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.mouse_held.contains(&button) {
                    self.mouse_pressed.insert(button);
                }
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.mouse_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    fn either_held(&self, a: KeyCode, b: KeyCode) -> bool {
        self.is_key_held(a) || self.is_key_held(b)
    }

    /// Walker command from held keys (W/Up, A/Left, D/Right).
    /// Forward wins over turning; opposite turns cancel.
    pub fn player_command(&self) -> PlayerCommand {
        if self.either_held(KeyCode::KeyW, KeyCode::ArrowUp) {
            return PlayerCommand::GoForward;
        }
        let left = self.either_held(KeyCode::KeyA, KeyCode::ArrowLeft);
        let right = self.either_held(KeyCode::KeyD, KeyCode::ArrowRight);
        match (left, right) {
            (true, false) => PlayerCommand::TurnLeft,
            (false, true) => PlayerCommand::TurnRight,
            _ => PlayerCommand::Idle,
        }
    }

    /// Check if terrain reset was pressed (R).
    pub fn is_reset_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyR)
    }

    /// Cursor position if the left button went down this frame.
    pub fn pointer_press(&self) -> Option<Vec2> {
        self.is_mouse_pressed(MouseButton::Left)
            .then_some(self.mouse_position)
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_map_to_commands() {
        let mut input = InputState::new();
        assert_eq!(input.player_command(), PlayerCommand::Idle);

        input.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);
        assert_eq!(input.player_command(), PlayerCommand::TurnLeft);

        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        assert_eq!(input.player_command(), PlayerCommand::Idle);

        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        assert_eq!(input.player_command(), PlayerCommand::GoForward);

        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        input.process_keyboard(KeyCode::ArrowLeft, ElementState::Released);
        assert_eq!(input.player_command(), PlayerCommand::TurnRight);
    }

    #[test]
    fn reset_is_one_shot() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        assert!(input.is_reset_pressed());
        input.begin_frame();
        // Still held, but no longer a fresh press.
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        assert!(!input.is_reset_pressed());
        assert!(input.is_key_held(KeyCode::KeyR));
    }

    #[test]
    fn pointer_press_reports_cursor() {
        let mut input = InputState::new();
        input.process_cursor_position((120.0, 48.5));
        assert_eq!(input.pointer_press(), None);

        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.pointer_press(), Some(Vec2::new(120.0, 48.5)));

        input.begin_frame();
        assert_eq!(input.pointer_press(), None);
    }
}
