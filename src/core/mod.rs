//! Core business logic abstractions

pub mod config;
pub mod converter;
pub mod history;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use converter::{ConvertError, Converter, FetchTicket, RatesState};
pub use history::{HistoryEntry, HistoryLog};
pub use rates::{RateError, RateMapping, RateProvider};
