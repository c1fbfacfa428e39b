use etfscope_core::{CoreError, SourceError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] etfscope_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("failed to load reference data: {0}")]
    Reference(SourceError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Reference(_) => 7,
            Self::Io(_) => 10,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Source(error) => Self::Reference(error),
            CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}
