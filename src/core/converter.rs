//! Conversion controller: interactive state and the operations on it
//!
//! All state lives in [`Converter`] and every mutation goes through a named
//! operation, so the whole unit is testable without any UI attached. Rate
//! fetches are split into `begin_fetch` (issue a ticket) and `apply_rates`
//! (resolve it); a ticket older than the latest issued one is discarded, so
//! rapid source-currency switches cannot let a slow stale response clobber
//! newer rates.

use crate::core::history::{HistoryEntry, HistoryLog};
use crate::core::rates::{RateError, RateMapping};
use crate::store::Store;
use std::mem;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error("enter a valid positive amount")]
    InvalidAmount,
    #[error("exchange rates are not available")]
    RatesUnavailable,
    #[error("no rate known for currency {0:?}")]
    UnknownCurrency(String),
}

#[derive(Debug, Default)]
pub enum RatesState {
    #[default]
    Idle,
    Loading,
    Ready(RateMapping),
    Failed,
}

/// Handle for one in-flight rate fetch. Produced by `begin_fetch`, consumed
/// by `apply_rates`; only the most recently issued ticket can still apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub base: String,
    seq: u64,
}

/// Rounds to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct Converter {
    store: Arc<dyn Store>,
    amount: f64,
    source: String,
    target: String,
    converted: f64,
    rates: RatesState,
    history: HistoryLog,
    last_seq: u64,
}

impl Converter {
    /// Creates a controller for the given currency pair, mirroring the
    /// persisted history into memory.
    pub fn new(source: &str, target: &str, store: Arc<dyn Store>) -> Self {
        let history = HistoryLog::load(store.as_ref());
        Self {
            store,
            amount: 0.0,
            source: source.to_lowercase(),
            target: target.to_lowercase(),
            converted: 0.0,
            rates: RatesState::Idle,
            history,
            last_seq: 0,
        }
    }

    /// Starts a rate fetch for the current source currency. Any earlier
    /// ticket becomes stale immediately.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_seq += 1;
        self.rates = RatesState::Loading;
        debug!(base = %self.source, seq = self.last_seq, "Rates fetch issued");
        FetchTicket {
            base: self.source.clone(),
            seq: self.last_seq,
        }
    }

    /// Resolves a fetch. Returns false when the ticket was stale and the
    /// result was discarded.
    pub fn apply_rates(
        &mut self,
        ticket: FetchTicket,
        result: Result<RateMapping, RateError>,
    ) -> bool {
        if ticket.seq != self.last_seq {
            debug!(
                base = %ticket.base,
                seq = ticket.seq,
                latest = self.last_seq,
                "Discarding stale rates response"
            );
            return false;
        }
        match result {
            Ok(mapping) => {
                debug!(base = %ticket.base, currencies = mapping.len(), "Rates ready");
                self.rates = RatesState::Ready(mapping);
            }
            Err(e) => {
                warn!(base = %ticket.base, error = %e, "Rates fetch failed");
                self.rates = RatesState::Failed;
            }
        }
        true
    }

    /// Changes the source currency; rates must be re-fetched.
    pub fn set_source(&mut self, code: &str) -> FetchTicket {
        self.source = code.to_lowercase();
        self.begin_fetch()
    }

    pub fn set_target(&mut self, code: &str) {
        self.target = code.to_lowercase();
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    /// Exchanges source with target and the amount with the converted
    /// amount. No history entry is recorded; the source change means the
    /// returned ticket must be resolved before the next conversion.
    pub fn swap(&mut self) -> FetchTicket {
        mem::swap(&mut self.source, &mut self.target);
        mem::swap(&mut self.amount, &mut self.converted);
        self.begin_fetch()
    }

    /// Converts the current amount, records a history entry stamped with
    /// `timestamp`, and persists the truncated log. On any precondition
    /// failure nothing changes and nothing is persisted.
    pub fn convert(&mut self, timestamp: String) -> Result<HistoryEntry, ConvertError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ConvertError::InvalidAmount);
        }
        let RatesState::Ready(mapping) = &self.rates else {
            return Err(ConvertError::RatesUnavailable);
        };
        let rate = mapping
            .rate(&self.target)
            .ok_or_else(|| ConvertError::UnknownCurrency(self.target.clone()))?;

        let result = round2(self.amount * rate);
        self.converted = result;

        let entry = HistoryEntry {
            timestamp,
            source: self.source.clone(),
            target: self.target.clone(),
            amount: self.amount,
            result: format!("{result:.2}"),
        };
        self.history.record(entry.clone());
        self.history.persist(self.store.as_ref());
        Ok(entry)
    }

    /// Codes selectable for either side of the conversion; empty until
    /// rates are ready.
    pub fn currencies(&self) -> Vec<&str> {
        match &self.rates {
            RatesState::Ready(mapping) => mapping.currencies(),
            _ => Vec::new(),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn converted(&self) -> f64 {
        self.converted
    }

    pub fn rates_state(&self) -> &RatesState {
        &self.rates
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::{HISTORY_KEY, HISTORY_LIMIT};
    use crate::store::StoreExt;
    use crate::store::memory::MemoryStore;

    fn usd_inr_mapping() -> RateMapping {
        RateMapping::from_rates([("usd".to_string(), 1.0), ("inr".to_string(), 83.0)])
    }

    fn ready_converter(store: Arc<MemoryStore>) -> Converter {
        let mut converter = Converter::new("usd", "inr", store);
        let ticket = converter.begin_fetch();
        converter.apply_rates(ticket, Ok(usd_inr_mapping()));
        converter
    }

    #[test]
    fn test_convert_ten_usd_to_inr() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(Arc::clone(&store));
        converter.set_amount(10.0);

        let entry = converter.convert("2025-01-01 10:00:00".to_string()).unwrap();

        assert_eq!(converter.converted(), 830.0);
        assert_eq!(entry.source, "usd");
        assert_eq!(entry.target, "inr");
        assert_eq!(entry.amount, 10.0);
        assert_eq!(entry.result, "830.00");
        assert_eq!(converter.history().entries()[0], entry);

        // The truncated log was persisted.
        let persisted: serde_json::Value = store.get_json(HISTORY_KEY).unwrap();
        assert_eq!(persisted[0]["result"], "830.00");
    }

    #[test]
    fn test_result_is_rounded_to_two_decimals() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "eur", store);
        let ticket = converter.begin_fetch();
        converter.apply_rates(
            ticket,
            Ok(RateMapping::from_rates([("eur".to_string(), 0.9237)])),
        );
        converter.set_amount(10.0);

        let entry = converter.convert("ts".to_string()).unwrap();
        assert_eq!(converter.converted(), 9.24);
        assert_eq!(entry.result, "9.24");
    }

    #[test]
    fn test_invalid_amounts_change_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(Arc::clone(&store));

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            converter.set_amount(bad);
            assert_eq!(
                converter.convert("ts".to_string()),
                Err(ConvertError::InvalidAmount)
            );
        }

        assert_eq!(converter.converted(), 0.0);
        assert!(converter.history().is_empty());
        assert!(store.get_json::<serde_json::Value>(HISTORY_KEY).is_none());
    }

    #[test]
    fn test_convert_requires_ready_rates() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "inr", store);
        converter.set_amount(10.0);

        // Idle
        assert_eq!(
            converter.convert("ts".to_string()),
            Err(ConvertError::RatesUnavailable)
        );

        // Loading
        let _ticket = converter.begin_fetch();
        assert_eq!(
            converter.convert("ts".to_string()),
            Err(ConvertError::RatesUnavailable)
        );
    }

    #[test]
    fn test_failed_fetch_blocks_until_source_change_retries() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "inr", Arc::clone(&store) as Arc<dyn Store>);
        converter.set_amount(10.0);

        let ticket = converter.begin_fetch();
        converter.apply_rates(ticket, Err(RateError::Http(500)));
        assert!(matches!(converter.rates_state(), RatesState::Failed));
        assert_eq!(
            converter.convert("ts".to_string()),
            Err(ConvertError::RatesUnavailable)
        );
        assert!(converter.history().is_empty());

        // Changing the source currency issues a fresh fetch; a successful
        // resolution unblocks conversion.
        let ticket = converter.set_source("usd");
        converter.apply_rates(ticket, Ok(usd_inr_mapping()));
        assert!(converter.convert("ts".to_string()).is_ok());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "inr", store);

        let first = converter.begin_fetch();
        let second = converter.set_source("eur");

        // The slower first response resolves after the second was issued.
        let eur_mapping = RateMapping::from_rates([("usd".to_string(), 1.08)]);
        assert!(converter.apply_rates(second, Ok(eur_mapping.clone())));
        assert!(!converter.apply_rates(first, Ok(usd_inr_mapping())));

        match converter.rates_state() {
            RatesState::Ready(mapping) => assert_eq!(*mapping, eur_mapping),
            state => panic!("expected Ready, got {state:?}"),
        }
    }

    #[test]
    fn test_stale_failure_does_not_clobber_ready_state() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "inr", store);

        let first = converter.begin_fetch();
        let second = converter.set_source("usd");

        assert!(converter.apply_rates(second, Ok(usd_inr_mapping())));
        assert!(!converter.apply_rates(first, Err(RateError::Http(500))));
        assert!(matches!(converter.rates_state(), RatesState::Ready(_)));
    }

    #[test]
    fn test_swap_exchanges_pair_and_amounts() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(store);
        converter.set_amount(10.0);
        converter.convert("ts".to_string()).unwrap();

        converter.swap();
        assert_eq!(converter.source(), "inr");
        assert_eq!(converter.target(), "usd");
        assert_eq!(converter.amount(), 830.0);
        assert_eq!(converter.converted(), 10.0);

        // Rates for the new source are not loaded yet.
        assert!(matches!(converter.rates_state(), RatesState::Loading));
        assert_eq!(
            converter.convert("ts".to_string()),
            Err(ConvertError::RatesUnavailable)
        );
    }

    #[test]
    fn test_double_swap_restores_state() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(store);
        converter.set_amount(25.0);
        converter.convert("ts".to_string()).unwrap();

        let (source, target) = (converter.source().to_string(), converter.target().to_string());
        let (amount, converted) = (converter.amount(), converter.converted());

        converter.swap();
        converter.swap();

        assert_eq!(converter.source(), source);
        assert_eq!(converter.target(), target);
        assert_eq!(converter.amount(), amount);
        assert_eq!(converter.converted(), converted);
    }

    #[test]
    fn test_history_is_capped_after_six_conversions() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(Arc::clone(&store));

        for n in 1..=6 {
            converter.set_amount(n as f64);
            converter.convert(format!("ts-{n}")).unwrap();
        }

        let history = converter.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        // Newest first; the first conversion fell off.
        assert_eq!(history.entries()[0].amount, 6.0);
        assert_eq!(history.entries()[4].amount, 2.0);
        assert!(history.entries().iter().all(|e| e.amount != 1.0));

        // The store reflects the same truncated log.
        let persisted = HistoryLog::load(store.as_ref());
        assert_eq!(&persisted, history);
    }

    #[test]
    fn test_same_source_and_target_is_permitted() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(store);
        converter.set_target("usd");
        converter.set_amount(5.0);

        let entry = converter.convert("ts".to_string()).unwrap();
        assert_eq!(entry.result, "5.00");
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = ready_converter(store);
        converter.set_target("xyz");
        converter.set_amount(5.0);

        assert_eq!(
            converter.convert("ts".to_string()),
            Err(ConvertError::UnknownCurrency("xyz".to_string()))
        );
        assert!(converter.history().is_empty());
    }

    #[test]
    fn test_currencies_come_from_the_ready_mapping() {
        let store = Arc::new(MemoryStore::new());
        let mut converter = Converter::new("usd", "inr", store);
        assert!(converter.currencies().is_empty());

        let ticket = converter.begin_fetch();
        converter.apply_rates(ticket, Ok(usd_inr_mapping()));
        assert_eq!(converter.currencies(), vec!["inr", "usd"]);
    }

    #[test]
    fn test_history_survives_controller_restart() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut converter = ready_converter(Arc::clone(&store));
            converter.set_amount(10.0);
            converter.convert("ts".to_string()).unwrap();
        }

        let converter = Converter::new("usd", "inr", store);
        assert_eq!(converter.history().len(), 1);
        assert_eq!(converter.history().entries()[0].result, "830.00");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(830.0), 830.0);
        assert_eq!(round2(9.237), 9.24);
        assert_eq!(round2(9.234), 9.23);
        assert_eq!(round2(0.005), 0.01);
    }
}
