//! Input capability
//!
//! The simulation never sees raw keys. Callers refresh an [`InputSource`]
//! once per tick and the core only asks the four questions below.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// What the core asks of the input layer each tick
pub trait InputSource {
    fn left_pressed(&self) -> bool;
    fn right_pressed(&self) -> bool;
    fn fire_pressed(&self) -> bool;
    /// Edge-triggered: true only on the tick fire went down
    fn fire_just_pressed(&self) -> bool;
}

/// Plain per-tick input values (tests, autopilot, replays)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub fire_just_pressed: bool,
}

impl InputSnapshot {
    /// A tick where fire goes down (held and edge)
    pub fn fire_tap() -> Self {
        Self {
            fire: true,
            fire_just_pressed: true,
            ..Self::default()
        }
    }
}

impl InputSource for InputSnapshot {
    fn left_pressed(&self) -> bool {
        self.left
    }

    fn right_pressed(&self) -> bool {
        self.right
    }

    fn fire_pressed(&self) -> bool {
        self.fire
    }

    fn fire_just_pressed(&self) -> bool {
        self.fire_just_pressed
    }
}

/// Discrete keys understood by the screens and the key tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    Space,
    Enter,
    Escape,
}

/// Tracks held keys across ticks for edge detection
///
/// Left maps from `Left`/`A`, right from `Right`/`D`, fire from `Space`.
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    current: HashSet<Key>,
    previous: HashSet<Key>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.current.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.current.remove(&key);
    }

    /// Forward a key event from the platform layer
    pub fn handle(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.key_down(key);
        } else {
            self.key_up(key);
        }
    }

    /// Call after the core has consumed this tick's input
    pub fn end_tick(&mut self) {
        self.previous.clone_from(&self.current);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.current.contains(&key)
    }

    pub fn was_just_pressed(&self, key: Key) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    pub fn was_just_released(&self, key: Key) -> bool {
        !self.current.contains(&key) && self.previous.contains(&key)
    }

    /// Freeze the current state into a value
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.left_pressed(),
            right: self.right_pressed(),
            fire: self.fire_pressed(),
            fire_just_pressed: self.fire_just_pressed(),
        }
    }
}

impl InputSource for KeyTracker {
    fn left_pressed(&self) -> bool {
        self.is_down(Key::Left) || self.is_down(Key::A)
    }

    fn right_pressed(&self) -> bool {
        self.is_down(Key::Right) || self.is_down(Key::D)
    }

    fn fire_pressed(&self) -> bool {
        self.is_down(Key::Space)
    }

    fn fire_just_pressed(&self) -> bool {
        self.was_just_pressed(Key::Space)
    }
}
