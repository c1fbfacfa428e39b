use serde::{Deserialize, Serialize};

use crate::{SourceId, UtcDateTime, ValidationError};

/// Schema version stamped on every envelope.
pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Machine-readable wrapper around every `etfscope` JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    /// Sources consulted, reference source first.
    pub source_chain: Vec<SourceId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        source_chain: Vec<SourceId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: SCHEMA_VERSION.to_owned(),
            generated_at: UtcDateTime::now(),
            source_chain,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        if self.source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(())
    }
}

/// Structured error entry, e.g. a name with no matching ETF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
        };
        error.validate()?;
        Ok(error)
    }

    /// Error entry for a name the reference data does not contain.
    pub fn not_found(name: &str) -> Self {
        Self {
            code: String::from("lookup.not_found"),
            message: format!("no ETF matches '{name}'"),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}
