use crate::store::Store;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

struct MemoryEntry {
    value: Value,
    expires_at: Option<Instant>,
}

/// In-memory store. Nothing survives the process; used when the on-disk
/// store cannot be opened and as the test double for persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(key)?;
        if let Some(expires_at) = entry.expires_at {
            if expires_at < Instant::now() {
                debug!("Store entry expired for key: {key}");
                return None;
            }
        }
        debug!("Store HIT for key: {key}");
        Some(entry.value.clone())
    }

    fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut entries = self.entries.write().unwrap();
        debug!("Store PUT for key: {key}");
        entries.insert(key.to_string(), MemoryEntry { value, expires_at });
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        debug!("Store REMOVE for key: {key}");
    }
}
