//! # etfscope core
//!
//! Lookup, metric calculation and source adapters for the `etfscope` ETF
//! dashboard.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | KRX CSV reference data, REST market data/returns, fixtures |
//! | [`aggregate`] | Lookup → fetch → compute flow for up to three names |
//! | [`config`] | Source configuration from environment and flags |
//! | [`data_source`] | Source traits, [`SourceError`], [`Fetched`] |
//! | [`domain`] | Records, codes, market data, returns, timestamps |
//! | [`envelope`] | JSON response envelope with metadata |
//! | [`error`] | Validation, metric and top-level errors |
//! | [`http_client`] | HTTP transport seam with a reqwest implementation |
//! | [`lookup`] | Name-fragment search over reference records |
//! | [`metrics`] | NAV, premium/discount, tracking error |
//! | [`source`] | Source identifiers |
//!
//! ## Flow
//!
//! ```text
//! "KODEX, TIGER 200" ──▶ LookupRequest ──▶ ReferenceSource::load
//!                                               │
//!                          ┌────────────────────┘
//!                          ▼
//!                    find_record ──▶ MarketDataSource / ReturnsSource
//!                                               │
//!                                               ▼
//!                                  DerivedMetrics ──▶ EtfOutcome
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use etfscope_core::{EtfOutcome, SourceConfig};
//!
//! # async fn run() -> Result<(), etfscope_core::CoreError> {
//! let aggregator = SourceConfig::new().with_mock_mode(true).build()?;
//! let output = aggregator.lookup("KODEX 200, TIGER").await?;
//!
//! for outcome in &output.outcomes {
//!     if let EtfOutcome::Displayed(report) = outcome {
//!         println!("{} nav={:?}", report.record.name, report.metrics.nav);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod aggregate;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod lookup;
pub mod metrics;
pub mod source;

pub use adapters::{
    FixtureEtfSource, FixtureReferenceSource, KrxReferenceSource, ReferenceLocation, RestEtfSource,
};

pub use aggregate::{
    Aggregator, DerivedMetrics, EtfOutcome, EtfReport, LookupOutput, LookupRequest, MetricKind,
    MetricNote, MAX_NAMES_PER_REQUEST,
};

pub use config::SourceConfig;

pub use data_source::{
    Fetched, MarketDataSource, ReferenceSource, ReturnsSource, SourceError, SourceErrorKind,
    SourceFuture,
};

pub use domain::{EtfCode, EtfRecord, HistoricalReturns, MarketData, ReturnPeriod, UtcDateTime};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

pub use error::{CoreError, MetricError, ValidationError};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use lookup::find_record;

pub use source::SourceId;
