//! Exchange rate abstractions and core types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Snapshot of exchange rates for one base currency at fetch time.
///
/// Values are units of target currency per 1 unit of the base. A valid
/// snapshot only holds positive rates; `from_rates` drops anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateMapping(HashMap<String, f64>);

impl RateMapping {
    pub fn from_rates(rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self(
            rates
                .into_iter()
                .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
                .collect(),
        )
    }

    /// Rate for one unit of the base in `code`, if known.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    /// Sorted list of known currency codes.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.0.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Request(String),
    #[error("rate source returned HTTP {0}")]
    Http(u16),
    #[error("malformed rate response: {0}")]
    Parse(String),
    #[error("no rates found for base currency {0:?}")]
    MissingBase(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Returns the mapping of every known currency to its rate relative
    /// to one unit of `base`.
    async fn rates(&self, base: &str) -> Result<RateMapping, RateError>;
}
