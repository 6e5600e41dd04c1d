//! Input event types for pointer and keyboard handling.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event, unified for mouse and touch input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

/// Keys the session cares about. Everything else arrives as `Other` and is
/// ignored by the text-entry flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Shift,
    CapsLock,
    Char(char),
    Other,
}

/// Keyboard event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

/// Modifier state, tracked continuously from key-down/key-up so a modifier
/// that is already held when a text entry starts is still honored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub caps_lock: bool,
}

impl Modifiers {
    /// Update held-modifier state from a key transition.
    pub fn apply(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed(Key::Shift) => self.shift = true,
            KeyEvent::Released(Key::Shift) => self.shift = false,
            KeyEvent::Pressed(Key::CapsLock) => self.caps_lock = true,
            KeyEvent::Released(Key::CapsLock) => self.caps_lock = false,
            _ => {}
        }
    }

    /// Whether typed characters should be uppercased right now.
    pub fn uppercase(&self) -> bool {
        self.shift || self.caps_lock
    }
}
