//! Proximity detection derived from the last-known world state

use crate::world::WorldStateStore;
use shared::{PlayerId, PROXIMITY_THRESHOLD};
use std::collections::hash_set;
use std::collections::HashSet;

/// Identities within the threshold distance of the local player.
///
/// Always rebuilt from scratch; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProximitySet(HashSet<PlayerId>);

impl ProximitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, PlayerId> {
        self.0.iter()
    }
}

impl FromIterator<PlayerId> for ProximitySet {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ProximitySet {
    type Item = &'a PlayerId;
    type IntoIter = hash_set::Iter<'a, PlayerId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityEngine {
    threshold: f64,
}

impl ProximityEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn compute(&self, store: &WorldStateStore) -> ProximitySet {
        compute_proximity(store, self.threshold)
    }
}

impl Default for ProximityEngine {
    fn default() -> Self {
        Self::new(PROXIMITY_THRESHOLD)
    }
}

/// Players strictly closer than `threshold` to the local player, excluding the
/// local player itself. Empty when there is no local player to anchor on.
pub fn compute_proximity(store: &WorldStateStore, threshold: f64) -> ProximitySet {
    let Some(me) = store.local_player() else {
        return ProximitySet::new();
    };

    store
        .players()
        .values()
        .filter(|other| other.id != me.id)
        .filter(|other| me.distance_to(other) < threshold)
        .map(|other| other.id.clone())
        .collect()
}
