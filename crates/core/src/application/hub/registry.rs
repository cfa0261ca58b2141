// Topic index: topic key -> connection ids
//
// Every method touches one map entry and releases the shard lock before
// returning. Empty sets are removed so the index never grows with dead keys.

use crate::port::ConnectionId;
use dashmap::DashMap;
use std::collections::HashSet;

#[derive(Default)]
pub(crate) struct TopicIndex {
    members: DashMap<String, HashSet<ConnectionId>>,
}

impl TopicIndex {
    /// Returns true if the connection was not yet registered under `key`
    pub(crate) fn add(&self, key: &str, connection_id: ConnectionId) -> bool {
        self.members
            .entry(key.to_string())
            .or_default()
            .insert(connection_id)
    }

    pub(crate) fn remove(&self, key: &str, connection_id: ConnectionId) -> bool {
        let removed = match self.members.get_mut(key) {
            Some(mut set) => set.remove(&connection_id),
            None => false,
        };
        // The entry guard above is gone; safe to take the shard lock again
        self.members.remove_if(key, |_, set| set.is_empty());
        removed
    }

    /// Snapshot of the connections registered under `key`
    pub(crate) fn members(&self, key: &str) -> Vec<ConnectionId> {
        self.members
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, key: &str) -> usize {
        self.members.get(key).map(|set| set.len()).unwrap_or(0)
    }

    pub(crate) fn key_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn clear(&self) {
        self.members.clear();
    }
}
