use crate::core::rates::{RateError, RateMapping, RateProvider};
use crate::store::{Store, StoreExt};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Store key for the cached mapping of one base currency.
fn cache_key(base: &str) -> String {
    format!("currency-{base}")
}

/// Rate provider backed by the jsDelivr mirror of the fawazahmed0
/// currency-api. Responses are cached per base currency in the durable
/// store; a cached base never touches the network again until the entry
/// expires.
pub struct CurrencyApiProvider {
    base_url: String,
    store: Arc<dyn Store>,
    ttl: Option<Duration>,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str, store: Arc<dyn Store>, ttl: Option<Duration>) -> Self {
        CurrencyApiProvider {
            base_url: base_url.to_string(),
            store,
            ttl,
        }
    }
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    async fn rates(&self, base: &str) -> Result<RateMapping, RateError> {
        let key = cache_key(base);
        if let Some(cached) = self.store.get_json::<RateMapping>(&key) {
            debug!("Using cached rates for {base}");
            return Ok(cached);
        }

        let url = format!("{}/v1/currencies/{}.json", self.base_url, base);
        debug!("Requesting rates from {url}");

        let client = reqwest::Client::builder()
            .user_agent("fxc/0.1")
            .build()
            .map_err(|e| RateError::Request(e.to_string()))?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RateError::Http(response.status().as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RateError::Request(e.to_string()))?;
        let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, response = %text, "Failed to parse rate response");
            RateError::Parse(e.to_string())
        })?;

        let raw = body
            .get(base)
            .cloned()
            .ok_or_else(|| RateError::MissingBase(base.to_string()))?;
        let rates: HashMap<String, f64> =
            serde_json::from_value(raw).map_err(|e| RateError::Parse(e.to_string()))?;

        let mapping = RateMapping::from_rates(rates);
        self.store.put_json(&key, &mapping, self.ttl);
        Ok(mapping)
    }
}
