use shared::{PlayerId, PlayerRecord};
use std::collections::HashMap;

/// Last-known world state as reported by the server.
///
/// Every update replaces the player table wholesale; records are never patched
/// field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldStateStore {
    players: HashMap<PlayerId, PlayerRecord>,
    local_id: Option<PlayerId>,
}

impl WorldStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session: prior players and identity are discarded, not merged.
    pub fn apply_join(&mut self, local_id: PlayerId, players: Vec<PlayerRecord>) {
        self.local_id = Some(local_id);
        self.players = Self::index(players);
    }

    /// Replaces the player table. The local identity only changes when the
    /// snapshot carries a non-empty one.
    pub fn apply_snapshot(&mut self, players: Vec<PlayerRecord>, local_id: Option<PlayerId>) {
        self.players = Self::index(players);

        if let Some(local_id) = local_id.filter(|id| !id.is_empty()) {
            self.local_id = Some(local_id);
        }
    }

    /// The local player's record, absent until both the identity and a snapshot
    /// containing it have arrived.
    pub fn local_player(&self) -> Option<&PlayerRecord> {
        self.local_id.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        self.local_id.as_ref()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.players.get(id)
    }

    pub fn players(&self) -> &HashMap<PlayerId, PlayerRecord> {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    // Later duplicates overwrite earlier ones.
    fn index(players: Vec<PlayerRecord>) -> HashMap<PlayerId, PlayerRecord> {
        let mut indexed = HashMap::with_capacity(players.len());
        for player in players {
            indexed.insert(player.id.clone(), player);
        }
        indexed
    }
}
