use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// KRX short codes are 6 characters; ISINs are 12.
const MAX_CODE_LEN: usize = 12;

/// Exchange identifier of an ETF, e.g. `069500` or `KR7069500007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EtfCode(String);

impl EtfCode {
    /// Parse and normalize a code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_CODE_LEN {
            return Err(ValidationError::CodeTooLong {
                len,
                max: MAX_CODE_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')) {
                return Err(ValidationError::CodeInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EtfCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EtfCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for EtfCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EtfCode> for String {
    fn from(value: EtfCode) -> Self {
        value.0
    }
}
