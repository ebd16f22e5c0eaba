//! Keyboard capture producing discrete directional events and control toggles

use crate::intent::Direction;
use macroquad::prelude::*;

/// One-shot control requests detected this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEvents {
    pub toggle_proximity: bool,
    pub toggle_hud: bool,
    pub reconnect: bool,
    pub quit: bool,
}

/// Samples the keyboard once per frame.
///
/// Movement keys produce one event per press rather than one per frame held,
/// mirroring browser `keydown` semantics.
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_key_p: bool,
    prev_key_h: bool,
    prev_key_r: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_key_p: false,
            prev_key_h: false,
            prev_key_r: false,
        }
    }

    /// Returns this frame's control events and directional presses, in
    /// up/down/left/right order.
    pub fn update(&mut self) -> (ControlEvents, Vec<Direction>) {
        let directions: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                key_bindings(*direction)
                    .iter()
                    .any(|key| is_key_pressed(*key))
            })
            .collect();

        let key_p = is_key_down(KeyCode::P);
        let key_h = is_key_down(KeyCode::H);
        let key_r = is_key_down(KeyCode::R);

        let controls = ControlEvents {
            toggle_proximity: key_p && !self.prev_key_p,
            toggle_hud: key_h && !self.prev_key_h,
            reconnect: key_r && !self.prev_key_r,
            quit: is_key_pressed(KeyCode::Escape),
        };

        self.prev_key_p = key_p;
        self.prev_key_h = key_h;
        self.prev_key_r = key_r;

        (controls, directions)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Arrow keys plus WASD aliases.
pub fn key_bindings(direction: Direction) -> [KeyCode; 2] {
    match direction {
        Direction::Up => [KeyCode::Up, KeyCode::W],
        Direction::Down => [KeyCode::Down, KeyCode::S],
        Direction::Left => [KeyCode::Left, KeyCode::A],
        Direction::Right => [KeyCode::Right, KeyCode::D],
    }
}
