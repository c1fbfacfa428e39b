use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical source identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// KRX reference dataset downloaded over HTTP.
    Krx,
    /// Reference dataset read from a local file.
    File,
    /// REST API serving market data and historical returns.
    Api,
    /// Deterministic in-memory data used by `--mock` runs and tests.
    Fixture,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Krx => "krx",
            Self::File => "file",
            Self::Api => "api",
            Self::Fixture => "fixture",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "krx" => Ok(Self::Krx),
            "file" => Ok(Self::File),
            "api" => Ok(Self::Api),
            "fixture" => Ok(Self::Fixture),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
