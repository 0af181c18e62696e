use std::sync::RwLock;

use super::{CountMap, Participant, ParticipantStore};

/// Volatile backend: the mapping lives in process memory and resets on
/// restart. Intentional for one-off events where yesterday's tally should
/// not haunt today's.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<CountMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParticipantStore for MemoryStore {
    fn load(&self) -> CountMap {
        self.map.read().unwrap().clone()
    }

    /// Replaces the live mapping. Durability-wise a no-op: memory is all
    /// there is.
    fn save(&self, map: &CountMap) {
        *self.map.write().unwrap() = map.clone();
    }

    fn get_count(&self, name: &str) -> u64 {
        self.map.read().unwrap().get(name).copied().unwrap_or(0)
    }

    fn ensure_participant(&self, name: &str) {
        let mut map = self.map.write().unwrap();
        map.entry(name.to_string()).or_insert(0);
    }

    fn increment(&self, name: &str) -> u64 {
        let mut map = self.map.write().unwrap();
        let entry = map.entry(name.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    fn decrement(&self, name: &str) -> u64 {
        let mut map = self.map.write().unwrap();
        let entry = map.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_sub(1);
        *entry
    }

    fn list_sorted(&self) -> Vec<Participant> {
        super::sorted_rows(&self.map.read().unwrap())
    }
}
