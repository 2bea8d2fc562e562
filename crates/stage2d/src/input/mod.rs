//! Input management system
//!
//! Polled keyboard and mouse state. The engine feeds window events in with
//! [`InputManager::handle_event`] and calls [`InputManager::update`] once at
//! the start of every frame to age the per-frame edges.

use std::collections::HashSet;

use crate::foundation::math::Vec2;
use crate::render::WindowEvent;

/// Input manager
#[derive(Debug, Default)]
pub struct InputManager {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: clear the pressed/released edges
    pub fn update(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.mouse_delta = Vec2::zeros();
    }

    /// Apply a window event
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::Key { key, pressed } => self.handle_key_input(key, pressed),
            WindowEvent::MouseButton { button, pressed } => self.handle_mouse_button(button, pressed),
            WindowEvent::CursorMoved { x, y } => self.handle_mouse_move(x, y),
            WindowEvent::Focus(false) => {
                // Keys held while focus is lost never see their release.
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.buttons_down.insert(button) {
                self.buttons_pressed.insert(button);
            }
        } else if self.buttons_down.remove(&button) {
            self.buttons_released.insert(button);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    /// Whether the key is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether the key went down this frame
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Whether the key went up this frame
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Whether the mouse button is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Whether the mouse button went down this frame
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Whether the mouse button went up this frame
    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Cursor position in window pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor movement since the last [`InputManager::update`]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    LeftShift,
    LeftControl,
    /// Any key without a mapping
    Unknown,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}
