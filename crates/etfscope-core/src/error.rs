use thiserror::Error;

use crate::data_source::SourceError;

/// Validation and contract errors exposed by `etfscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("lookup query must contain at least one ETF name")]
    EmptyQuery,

    #[error("ETF code cannot be empty")]
    EmptyCode,
    #[error("ETF code length {len} exceeds max {max}")]
    CodeTooLong { len: usize, max: usize },
    #[error("ETF code contains invalid character '{ch}' at index {index}")]
    CodeInvalidChar { ch: char, index: usize },

    #[error("reference location must be an http(s) URL or an existing file: '{value}'")]
    InvalidReferenceLocation { value: String },
    #[error("no reference data configured; set ETFSCOPE_REFERENCE or pass --reference")]
    MissingReference,
    #[error("invalid source '{value}', expected one of krx, file, api, fixture")]
    InvalidSource { value: String },
    #[error("API base URL must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("timeout must be a positive number of milliseconds: '{value}'")]
    InvalidTimeout { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Failures raised by the metric calculator.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MetricError {
    #[error("division by zero: {divisor} is zero")]
    DivisionByZero { divisor: &'static str },

    #[error("return series length mismatch: etf has {etf}, benchmark has {benchmark}")]
    LengthMismatch { etf: usize, benchmark: usize },

    #[error("return series must contain at least one element")]
    EmptySeries,

    #[error("input '{field}' must be finite")]
    NonFinite { field: &'static str },
}

impl MetricError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DivisionByZero { .. } => "metric.division_by_zero",
            Self::LengthMismatch { .. } => "metric.length_mismatch",
            Self::EmptySeries => "metric.empty_series",
            Self::NonFinite { .. } => "metric.non_finite",
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
