use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{CountMap, Participant, ParticipantStore};

/// Durable backend: the whole mapping lives in one pretty-printed JSON
/// document, reloaded on every access and rewritten wholesale on every
/// mutation.
///
/// There is deliberately no in-memory cache: a second store over the same
/// path (or a human with an editor) sees and makes changes immediately. The
/// mutex serializes the read-modify-write cycle within this process; the
/// file itself is still replaced non-atomically, and a corrupt file simply
/// reads as empty.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_map(&self) -> CountMap {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %self.path.display(), "Count file absent, starting empty");
                return CountMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Count file is not valid JSON, treating as empty"
                );
                CountMap::new()
            }
        }
    }

    fn write_map(&self, map: &CountMap) {
        let doc = match serde_json::to_string_pretty(map) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Could not serialize counts");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, doc) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Could not write count file, durability lost for this update"
            );
        }
    }
}

impl ParticipantStore for JsonFileStore {
    fn load(&self) -> CountMap {
        let _guard = self.lock.lock().unwrap();
        self.read_map()
    }

    fn save(&self, map: &CountMap) {
        let _guard = self.lock.lock().unwrap();
        self.write_map(map);
    }

    fn get_count(&self, name: &str) -> u64 {
        let _guard = self.lock.lock().unwrap();
        self.read_map().get(name).copied().unwrap_or(0)
    }

    fn ensure_participant(&self, name: &str) {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map();
        if !map.contains_key(name) {
            map.insert(name.to_string(), 0);
            self.write_map(&map);
        }
    }

    fn increment(&self, name: &str) -> u64 {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map();
        let next = map.get(name).copied().unwrap_or(0) + 1;
        map.insert(name.to_string(), next);
        self.write_map(&map);
        next
    }

    fn decrement(&self, name: &str) -> u64 {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map();
        let next = map.get(name).copied().unwrap_or(0).saturating_sub(1);
        map.insert(name.to_string(), next);
        self.write_map(&map);
        next
    }

    fn list_sorted(&self) -> Vec<Participant> {
        let _guard = self.lock.lock().unwrap();
        super::sorted_rows(&self.read_map())
    }
}
