//! Core conversion pipeline: currency metadata, rates, history and session state

pub mod config;
pub mod convert;
pub mod currency;
pub mod history;
pub mod log;
pub mod session;
pub mod theme;

// Re-export main types for cleaner imports
pub use currency::{CurrencyMeta, LocalCurrencyResolver, RateSource, RateTable};
pub use history::{History, HistoryPoint, HistorySummary};
pub use session::{ConversionView, MetadataState, RatesState, Session};
