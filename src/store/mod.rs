//! Participant count storage.
//!
//! One trait, two interchangeable backends chosen at startup:
//! [`JsonFileStore`] persists the whole mapping as a single JSON document on
//! every mutation, [`MemoryStore`] keeps it in process memory only. Handlers
//! hold the store as `Arc<dyn ParticipantStore>` and never know which one is
//! behind it.
//!
//! Every operation is infallible from the caller's perspective: a missing or
//! corrupt file reads as empty state, a failed write logs a warning and the
//! request still succeeds (durability is lost silently, which is the
//! intended trade for a party tally).

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// The authoritative mapping from participant name to drink count.
///
/// A `BTreeMap` keeps iteration in name order, which makes the leaderboard
/// tie-break deterministic.
pub type CountMap = BTreeMap<String, u64>;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub count: u64,
}

/// Storage contract shared by both backends.
///
/// Mutating operations run their whole load-mutate-save cycle under the
/// backend's lock, so concurrent updates to one name never lose writes.
pub trait ParticipantStore: Send + Sync {
    /// Current full state. Never fails; unreadable state is empty state.
    fn load(&self) -> CountMap;

    /// Persist the full mapping, replacing whatever was there.
    fn save(&self, map: &CountMap);

    /// Count for `name`, 0 if unknown. Never creates an entry.
    fn get_count(&self, name: &str) -> u64;

    /// Insert `name` with count 0 if absent, then persist. Existing entries
    /// are left untouched.
    fn ensure_participant(&self, name: &str);

    /// Add one to `name`'s count and persist; returns the new count.
    fn increment(&self, name: &str) -> u64;

    /// Subtract one from `name`'s count, floored at 0, and persist; returns
    /// the new count.
    fn decrement(&self, name: &str) -> u64;

    /// Full state as rows sorted by count descending, ties in name order.
    fn list_sorted(&self) -> Vec<Participant> {
        sorted_rows(&self.load())
    }
}

/// Sort a mapping into leaderboard order: count descending, equal counts in
/// name order (stable sort over name-ordered input).
pub(crate) fn sorted_rows(map: &CountMap) -> Vec<Participant> {
    let mut rows: Vec<Participant> = map
        .iter()
        .map(|(name, count)| Participant {
            name: name.clone(),
            count: *count,
        })
        .collect();
    rows.sort_by_key(|p| Reverse(p.count));
    rows
}
