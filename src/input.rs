//! Input events
//!
//! The platform layer translates raw key events into `InputEvent`s and pushes
//! them into an `InputQueue`; the owner drains it into one batch per frame.

use serde::{Deserialize, Serialize};

/// Logical keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Pause,
    /// Restart after game over
    Confirm,
    ToggleFps,
    Escape,
}

impl Key {
    /// Map a platform key name (W/A/S/D, arrows, space, P, Enter, F2, Esc)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "w" | "up" | "arrowup" => Some(Key::Up),
            "s" | "down" | "arrowdown" => Some(Key::Down),
            "a" | "left" | "arrowleft" => Some(Key::Left),
            "d" | "right" | "arrowright" => Some(Key::Right),
            "space" | " " | "fire" => Some(Key::Fire),
            "p" | "pause" => Some(Key::Pause),
            "enter" | "return" => Some(Key::Confirm),
            "f2" => Some(Key::ToggleFps),
            "escape" | "esc" => Some(Key::Escape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Window closed
    Quit,
}

impl InputEvent {
    pub fn is_down(&self, key: Key) -> bool {
        *self == InputEvent::KeyDown(key)
    }

    pub fn is_up(&self, key: Key) -> bool {
        *self == InputEvent::KeyUp(key)
    }
}

/// Events accumulated between frames
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Push a named key transition; unknown names are ignored
    pub fn push_named(&mut self, name: &str, down: bool) -> bool {
        let Some(key) = Key::from_name(name) else {
            log::debug!("ignoring unmapped key {name:?}");
            return false;
        };
        self.push(if down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        });
        true
    }

    /// Take this frame's batch in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
