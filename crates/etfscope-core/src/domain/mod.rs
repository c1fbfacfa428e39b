//! # Domain Models
//!
//! Canonical types for ETF reference data and per-request market data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EtfRecord`] | One row of exchange reference data |
//! | [`EtfCode`] | Validated exchange code |
//! | [`MarketData`] | Total assets, total shares, market price |
//! | [`HistoricalReturns`] | Percentage returns per [`ReturnPeriod`] |
//! | [`UtcDateTime`] | UTC timestamp for envelope metadata |
//!
//! Reference records are immutable once loaded. Market data and returns are
//! fetched per request and never persisted.

mod code;
mod models;
mod timestamp;

pub use code::EtfCode;
pub use models::{EtfRecord, HistoricalReturns, MarketData, ReturnPeriod};
pub use timestamp::UtcDateTime;
