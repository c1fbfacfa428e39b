//! Lookup → fetch → compute flow for up to three ETF names per request.
//!
//! Each name ends in one of two states:
//!
//! - [`EtfOutcome::NotFound`] when no reference record matches, or
//! - [`EtfOutcome::Displayed`] with whatever market data, returns and
//!   metrics could be produced.
//!
//! Names are processed one after another. A failure while handling one name
//! never affects the others, and nothing past the lookup step aborts the
//! flow: collaborator failures become [`Fetched::Unavailable`] and skipped
//! metrics become [`MetricNote`]s.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data_source::{Fetched, MarketDataSource, ReferenceSource, ReturnsSource};
use crate::lookup::find_record;
use crate::metrics;
use crate::{CoreError, EtfRecord, HistoricalReturns, MarketData, SourceId, ValidationError};

/// Extra names beyond this count are dropped without error.
pub const MAX_NAMES_PER_REQUEST: usize = 3;

/// Parsed user input: the ETF name fragments to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    names: Vec<String>,
    dropped: usize,
}

impl LookupRequest {
    /// Split on commas, trim, discard empty entries, keep the first three.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut names: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();

        if names.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let dropped = names.len().saturating_sub(MAX_NAMES_PER_REQUEST);
        names.truncate(MAX_NAMES_PER_REQUEST);

        Ok(Self { names, dropped })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// How many names were cut by the per-request cap.
    pub const fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Metrics the flow can derive for a displayed ETF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Nav,
    PremiumDiscount,
    TrackingError,
}

impl MetricKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nav => "nav",
            Self::PremiumDiscount => "premium_discount",
            Self::TrackingError => "tracking_error",
        }
    }
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a metric was not computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricNote {
    pub metric: MetricKind,
    pub reason: String,
}

impl MetricNote {
    fn new(metric: MetricKind, reason: impl Into<String>) -> Self {
        Self {
            metric,
            reason: reason.into(),
        }
    }
}

/// Computed metrics; `None` means skipped (see the report's notes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_discount_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_error: Option<f64>,
}

impl DerivedMetrics {
    /// Apply the compute-only-when-present rules and record every skip.
    ///
    /// - NAV needs non-zero total assets and total shares.
    /// - Premium/discount needs a NAV and a non-zero market price.
    /// - Tracking error needs returns with at least one benchmark period.
    pub fn compute(
        market: &Fetched<MarketData>,
        returns: &Fetched<HistoricalReturns>,
    ) -> (Self, Vec<MetricNote>) {
        let mut derived = Self::default();
        let mut notes = Vec::new();

        match market.available() {
            None => {
                notes.push(MetricNote::new(MetricKind::Nav, "market data unavailable"));
                notes.push(MetricNote::new(
                    MetricKind::PremiumDiscount,
                    "market data unavailable",
                ));
            }
            Some(data) => {
                derived.nav = nav_if_present(data, &mut notes);
                derived.premium_discount_pct = match derived.nav {
                    Some(nav) => premium_if_present(data, nav, &mut notes),
                    None => {
                        notes.push(MetricNote::new(
                            MetricKind::PremiumDiscount,
                            "requires a computed NAV",
                        ));
                        None
                    }
                };
            }
        }

        derived.tracking_error = tracking_error_if_present(returns, &mut notes);
        (derived, notes)
    }
}

fn nav_if_present(data: &MarketData, notes: &mut Vec<MetricNote>) -> Option<f64> {
    if data.total_assets == 0.0 {
        notes.push(MetricNote::new(MetricKind::Nav, "total assets missing or zero"));
        return None;
    }
    if data.total_shares == 0 {
        notes.push(MetricNote::new(MetricKind::Nav, "total shares missing or zero"));
        return None;
    }

    metrics::nav(data.total_assets, data.total_shares)
        .map_err(|error| notes.push(MetricNote::new(MetricKind::Nav, error.to_string())))
        .ok()
}

fn premium_if_present(data: &MarketData, nav: f64, notes: &mut Vec<MetricNote>) -> Option<f64> {
    if data.market_price == 0.0 {
        notes.push(MetricNote::new(
            MetricKind::PremiumDiscount,
            "market price missing or zero",
        ));
        return None;
    }

    metrics::premium_discount(data.market_price, nav)
        .map_err(|error| {
            notes.push(MetricNote::new(
                MetricKind::PremiumDiscount,
                error.to_string(),
            ))
        })
        .ok()
}

fn tracking_error_if_present(
    returns: &Fetched<HistoricalReturns>,
    notes: &mut Vec<MetricNote>,
) -> Option<f64> {
    let Some(returns) = returns.available() else {
        notes.push(MetricNote::new(
            MetricKind::TrackingError,
            "historical returns unavailable",
        ));
        return None;
    };

    let (etf, benchmark) = returns.aligned_with_benchmark();
    if etf.is_empty() {
        notes.push(MetricNote::new(
            MetricKind::TrackingError,
            "no benchmark returns for the reported periods",
        ));
        return None;
    }

    metrics::tracking_error(&etf, &benchmark)
        .map_err(|error| {
            notes.push(MetricNote::new(MetricKind::TrackingError, error.to_string()))
        })
        .ok()
}

/// Display record for one matched ETF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtfReport {
    /// The fragment the user typed.
    pub query: String,
    pub record: EtfRecord,
    pub market: Fetched<MarketData>,
    pub returns: Fetched<HistoricalReturns>,
    pub metrics: DerivedMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<MetricNote>,
}

impl EtfReport {
    /// Market values for display; zero when the fetch failed.
    pub fn market_values(&self) -> MarketData {
        self.market.available().copied().unwrap_or_default()
    }

    pub fn historical_returns(&self) -> Option<&HistoricalReturns> {
        self.returns.available()
    }
}

/// Terminal state for one requested name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EtfOutcome {
    Displayed(EtfReport),
    NotFound { name: String },
}

impl EtfOutcome {
    pub fn report(&self) -> Option<&EtfReport> {
        match self {
            Self::Displayed(report) => Some(report),
            Self::NotFound { .. } => None,
        }
    }
}

/// Result of a full lookup pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupOutput {
    pub outcomes: Vec<EtfOutcome>,
    /// Names cut by [`MAX_NAMES_PER_REQUEST`].
    pub dropped_names: usize,
}

impl LookupOutput {
    pub fn not_found(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            EtfOutcome::NotFound { name } => Some(name.as_str()),
            EtfOutcome::Displayed(_) => None,
        })
    }
}

/// Wires the three collaborators into the lookup flow.
#[derive(Clone)]
pub struct Aggregator {
    reference: Arc<dyn ReferenceSource>,
    market: Arc<dyn MarketDataSource>,
    returns: Arc<dyn ReturnsSource>,
}

impl Aggregator {
    pub fn new(
        reference: Arc<dyn ReferenceSource>,
        market: Arc<dyn MarketDataSource>,
        returns: Arc<dyn ReturnsSource>,
    ) -> Self {
        Self {
            reference,
            market,
            returns,
        }
    }

    /// Sources consulted by a lookup, reference first, without repeats.
    pub fn source_chain(&self) -> Vec<SourceId> {
        let mut chain = vec![self.reference.id()];
        for id in [self.market.id(), self.returns.id()] {
            if !chain.contains(&id) {
                chain.push(id);
            }
        }
        chain
    }

    /// Parse raw input, load reference data once, and aggregate.
    ///
    /// Only invalid input or a reference-load failure is an error.
    pub async fn lookup(&self, input: &str) -> Result<LookupOutput, CoreError> {
        let request = LookupRequest::parse(input)?;
        if request.dropped() > 0 {
            debug!(
                dropped = request.dropped(),
                max = MAX_NAMES_PER_REQUEST,
                "ignoring names beyond the per-request cap"
            );
        }

        let records = self.reference.load().await?;
        let outcomes = self.aggregate(&records, &request).await;

        Ok(LookupOutput {
            outcomes,
            dropped_names: request.dropped(),
        })
    }

    /// Process every requested name against already-loaded records.
    pub async fn aggregate(
        &self,
        records: &[EtfRecord],
        request: &LookupRequest,
    ) -> Vec<EtfOutcome> {
        let mut outcomes = Vec::with_capacity(request.names().len());
        for name in request.names() {
            outcomes.push(self.process(records, name).await);
        }
        outcomes
    }

    #[tracing::instrument(level = "debug", skip(self, records))]
    async fn process(&self, records: &[EtfRecord], name: &str) -> EtfOutcome {
        let Some(record) = find_record(records, name) else {
            warn!(name, "no ETF matches the requested name");
            return EtfOutcome::NotFound {
                name: name.to_owned(),
            };
        };
        info!(name, code = %record.code, matched = %record.name, "matched ETF");

        let market = Fetched::from_result(self.market.market_data(&record.code).await);
        if let Some(reason) = market.reason() {
            warn!(code = %record.code, reason, "market data unavailable");
        }

        let returns = Fetched::from_result(self.returns.historical_returns(&record.code).await);
        if let Some(reason) = returns.reason() {
            warn!(code = %record.code, reason, "historical returns unavailable");
        }

        let (metrics, notes) = DerivedMetrics::compute(&market, &returns);
        for note in &notes {
            debug!(
                code = %record.code,
                metric = %note.metric,
                reason = %note.reason,
                "metric skipped"
            );
        }

        EtfOutcome::Displayed(EtfReport {
            query: name.to_owned(),
            record: record.clone(),
            market,
            returns,
            metrics,
            notes,
        })
    }
}
