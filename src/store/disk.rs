use crate::store::Store;
use anyhow::Result;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct DiskEntry {
    value: Value,
    expires_at: Option<SystemTime>,
}

/// Fjall-backed store. One partition holds every key; each entry is a
/// JSON envelope carrying the value and an optional expiry.
pub struct DiskStore {
    // The keyspace must outlive the partition handle.
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path.join("store")).open()?;
        let partition = keyspace.open_partition("state", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }
}

impl Store for DiskStore {
    fn get(&self, key: &str) -> Option<Value> {
        let res: Result<Option<Value>> = (|| {
            if let Some(bytes) = self.partition.get(key)? {
                let entry: DiskEntry = serde_json::from_slice(&bytes)?;
                if let Some(expires_at) = entry.expires_at {
                    if SystemTime::now() > expires_at {
                        debug!("Store entry expired for key: {key}");
                        self.partition.remove(key)?;
                        return Ok(None);
                    }
                }
                debug!("Store HIT for key: {key}");
                return Ok(Some(entry.value));
            }
            debug!("Store MISS for key: {key}");
            Ok(None)
        })();

        match res {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskStore get error: {e}");
                None
            }
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let res: Result<()> = (|| {
            let expires_at = ttl.map(|d| SystemTime::now() + d);
            let entry = DiskEntry { value, expires_at };
            self.partition.insert(key, serde_json::to_vec(&entry)?)?;
            debug!("Store PUT for key: {key}");
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskStore put error: {e}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskStore remove error: {e}");
        }
    }
}
