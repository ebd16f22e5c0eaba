//! Translation of discrete directional input into movement requests

use crate::world::WorldStateStore;
use shared::{ClientMessage, MOVE_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Offset for a single press. Screen coordinates: y grows downwards.
    pub fn delta(self, step: f64) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
        }
    }
}

/// Builds absolute `MOVE` requests from the last-known local position.
///
/// The store is never touched here; the local position only changes once the
/// server echoes the move back in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentDispatcher {
    step: f64,
}

impl IntentDispatcher {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    pub fn on_directional_input(
        &self,
        direction: Direction,
        store: &WorldStateStore,
    ) -> Option<ClientMessage> {
        let me = store.local_player()?;
        let (dx, dy) = direction.delta(self.step);

        Some(ClientMessage::Move {
            x: me.x + dx,
            y: me.y + dy,
        })
    }
}

impl Default for IntentDispatcher {
    fn default() -> Self {
        Self::new(MOVE_STEP)
    }
}
