//! Conversion history: a small persisted log of completed conversions

use crate::store::{Store, StoreExt};
use serde::{Deserialize, Serialize};

pub const HISTORY_KEY: &str = "conversionHistory";
pub const HISTORY_LIMIT: usize = 5;

/// A persisted record of one completed conversion. `result` keeps the
/// 2-decimal rendering shown to the user at conversion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "to")]
    pub target: String,
    pub amount: f64,
    pub result: String,
}

/// Most-recent-first log of conversions, capped at `HISTORY_LIMIT`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<HistoryEntry>);

impl HistoryLog {
    pub fn load(store: &dyn Store) -> Self {
        store.get_json(HISTORY_KEY).unwrap_or_default()
    }

    /// Prepends `entry`, discarding the oldest entries beyond the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.0.insert(0, entry);
        self.0.truncate(HISTORY_LIMIT);
    }

    pub fn persist(&self, store: &dyn Store) {
        store.put_json(HISTORY_KEY, self, None);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
