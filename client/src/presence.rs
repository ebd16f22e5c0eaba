use crate::proximity::{ProximityEngine, ProximitySet};
use crate::world::WorldStateStore;
use log::{debug, info, warn};
use shared::{PlayerId, PlayerRecord, ServerMessage};
use std::collections::HashMap;

/// Outcome of feeding one inbound message to [`PresenceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Joined,
    Snapshot,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRole {
    Local,
    Nearby,
    Other,
}

/// Owner of the world state and everything derived from it.
///
/// All writes go through this type, and each write recomputes the proximity set
/// before returning, so readers never see a store and a proximity set from
/// different generations.
#[derive(Debug, Clone)]
pub struct PresenceState {
    store: WorldStateStore,
    engine: ProximityEngine,
    proximity_enabled: bool,
    proximity: ProximitySet,
    generation: u64,
}

impl PresenceState {
    pub fn new(engine: ProximityEngine, proximity_enabled: bool) -> Self {
        Self {
            store: WorldStateStore::new(),
            engine,
            proximity_enabled,
            proximity: ProximitySet::new(),
            generation: 0,
        }
    }

    /// Decodes and applies a raw text frame. Malformed frames leave the state
    /// untouched.
    pub fn handle_text(&mut self, text: &str) -> Applied {
        match ServerMessage::decode(text) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                warn!("Ignoring inbound message: {}", e);
                Applied::Ignored
            }
        }
    }

    pub fn handle_message(&mut self, message: ServerMessage) -> Applied {
        match message {
            ServerMessage::Join { your_id, players } => {
                self.apply_join(your_id, players);
                Applied::Joined
            }
            ServerMessage::WorldState { players, your_id } => {
                self.apply_snapshot(players, your_id);
                Applied::Snapshot
            }
        }
    }

    pub fn apply_join(&mut self, local_id: PlayerId, players: Vec<PlayerRecord>) {
        info!("Joined as {} with {} players", local_id, players.len());
        self.store.apply_join(local_id, players);
        self.recompute();
    }

    pub fn apply_snapshot(&mut self, players: Vec<PlayerRecord>, local_id: Option<PlayerId>) {
        self.store.apply_snapshot(players, local_id);
        self.recompute();
        debug!(
            "Snapshot #{}: {} players, {} nearby",
            self.generation,
            self.store.len(),
            self.proximity.len()
        );
    }

    pub fn set_proximity_enabled(&mut self, enabled: bool) {
        self.proximity_enabled = enabled;
        self.recompute();
    }

    pub fn proximity_enabled(&self) -> bool {
        self.proximity_enabled
    }

    pub fn store(&self) -> &WorldStateStore {
        &self.store
    }

    pub fn proximity(&self) -> &ProximitySet {
        &self.proximity
    }

    /// Number of proximity recomputations: one per store write or toggle.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> PresenceView<'_> {
        PresenceView {
            players: self.store.players(),
            local_id: self.store.local_id(),
            proximity: &self.proximity,
            generation: self.generation,
        }
    }

    fn recompute(&mut self) {
        self.proximity = if self.proximity_enabled {
            self.engine.compute(&self.store)
        } else {
            ProximitySet::new()
        };
        self.generation += 1;
    }
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::new(ProximityEngine::default(), true)
    }
}

/// Read-only snapshot handed to the renderer once per frame.
#[derive(Debug, Clone, Copy)]
pub struct PresenceView<'a> {
    pub players: &'a HashMap<PlayerId, PlayerRecord>,
    pub local_id: Option<&'a PlayerId>,
    pub proximity: &'a ProximitySet,
    pub generation: u64,
}

impl<'a> PresenceView<'a> {
    pub fn role_of(&self, player: &PlayerRecord) -> PlayerRole {
        if Some(&player.id) == self.local_id {
            PlayerRole::Local
        } else if self.proximity.contains(&player.id) {
            PlayerRole::Nearby
        } else {
            PlayerRole::Other
        }
    }

    pub fn local_player(&self) -> Option<&'a PlayerRecord> {
        self.local_id.and_then(|id| self.players.get(id))
    }

    /// Players sorted by identity so draw order is stable between frames.
    pub fn players_sorted(&self) -> Vec<&'a PlayerRecord> {
        let mut players: Vec<&PlayerRecord> = self.players.values().collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }
}
