//! Edge-triggered keyboard input.
//!
//! `is_just_pressed(key)` is true from the press until `end_frame()`. The held
//! set only filters OS key repeat, so a key kept down triggers once. The main
//! loop clears edges only after a fixed simulation step has consumed them, so a
//! jump pressed on a frame with zero simulation steps is not lost.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Up,
    W,
    R,
    F3,
    Escape,
}

/// Keys that trigger a jump.
pub const JUMP_KEYS: &[Key] = &[Key::Space, Key::Up, Key::W];

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.just_pressed.contains(key))
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}
