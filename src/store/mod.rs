pub mod disk;
pub mod memory;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A durable key-value store for JSON values.
///
/// Entries may carry a time-to-live; an expired entry behaves like a miss.
/// Storage failures are swallowed by implementations (a broken store
/// degrades into a cache miss, it never aborts the app).
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value, ttl: Option<Duration>);
    fn remove(&self, key: &str);
}

/// Typed JSON helpers over any `Store`.
pub trait StoreExt {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
    fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>);
}

impl<S: Store + ?Sized> StoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("Discarding unreadable store value for key {key}: {e}");
                None
            }
        }
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(encoded) => self.put(key, encoded, ttl),
            Err(e) => debug!("Failed to serialize store value for key {key}: {e}"),
        }
    }
}
