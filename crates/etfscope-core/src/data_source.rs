//! Source traits and the error/result types shared by every adapter.
//!
//! The aggregation flow talks to three collaborators:
//!
//! | Trait | Produces | Adapters |
//! |-------|----------|----------|
//! | [`ReferenceSource`] | `Vec<EtfRecord>` | CSV over HTTP or file, fixture |
//! | [`MarketDataSource`] | [`MarketData`] | REST API, fixture |
//! | [`ReturnsSource`] | [`HistoricalReturns`] | REST API, fixture |
//!
//! Market data and returns failures never abort a lookup. The flow wraps
//! each call in [`Fetched`] so callers can tell "the API said zero" from
//! "the API was unavailable".

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::{EtfCode, EtfRecord, HistoricalReturns, MarketData, SourceId};

/// Boxed future returned by source trait methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or non-success HTTP status.
    Unavailable,
    /// Upstream answered but the payload could not be decoded.
    Parse,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    status: Option<u16>,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            status: None,
        }
    }

    /// Upstream answered with a non-success status.
    pub fn status(source: SourceId, status: u16) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: format!("{source} returned status {status}"),
            status: Some(status),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
            status: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn http_status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Parse => "source.parse",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Outcome of one collaborator call inside the aggregation flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Fetched<T> {
    Available { data: T },
    Unavailable { code: String, reason: String },
}

impl<T> Fetched<T> {
    pub fn from_result(result: Result<T, SourceError>) -> Self {
        match result {
            Ok(data) => Self::Available { data },
            Err(error) => Self::Unavailable {
                code: error.code().to_owned(),
                reason: error.message().to_owned(),
            },
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available { data } => Some(data),
            Self::Unavailable { .. } => None,
        }
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available { .. } => None,
            Self::Unavailable { reason, .. } => Some(reason),
        }
    }
}

/// Supplies the full reference dataset for one invocation.
pub trait ReferenceSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Loads every record, in feed order.
    fn load(&self) -> SourceFuture<'_, Vec<EtfRecord>>;
}

/// Supplies total assets, total shares and market price for one ETF.
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn market_data<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, MarketData>;
}

/// Supplies 1/5/10-year percentage returns for one ETF.
pub trait ReturnsSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn historical_returns<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, HistoricalReturns>;
}
