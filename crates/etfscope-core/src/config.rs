//! Source configuration read from the environment and overridden by flags.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `ETFSCOPE_REFERENCE` | KRX CSV URL or local path | none |
//! | `ETFSCOPE_API_BASE_URL` | Market data / returns API | `https://api.example.com` |
//! | `ETFSCOPE_API_KEY` | Bearer token for the API | none |
//! | `ETFSCOPE_TIMEOUT_MS` | Per-request timeout | `3000` |
//!
//! API keys are never logged.

use std::env;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{
    FixtureEtfSource, FixtureReferenceSource, KrxReferenceSource, ReferenceLocation, RestEtfSource,
};
use crate::aggregate::Aggregator;
use crate::http_client::{HttpAuth, HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{SourceId, ValidationError};

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com";

pub const ENV_REFERENCE: &str = "ETFSCOPE_REFERENCE";
pub const ENV_API_BASE_URL: &str = "ETFSCOPE_API_BASE_URL";
pub const ENV_API_KEY: &str = "ETFSCOPE_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "ETFSCOPE_TIMEOUT_MS";

/// Everything needed to build an [`Aggregator`].
#[derive(Clone, PartialEq, Eq)]
pub struct SourceConfig {
    reference: Option<ReferenceLocation>,
    api_base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
    use_mock: bool,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("reference", &self.reference)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("use_mock", &self.use_mock)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            reference: None,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_mock: false,
        }
    }
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `ETFSCOPE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(reference) = read(ENV_REFERENCE) {
            config = config.with_reference(ReferenceLocation::parse(&reference)?);
        }
        if let Some(base_url) = read(ENV_API_BASE_URL) {
            config = config.with_api_base_url(base_url)?;
        }
        if let Some(key) = read(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(timeout) = read(ENV_TIMEOUT_MS) {
            config = config.with_timeout_ms(parse_timeout_ms(&timeout)?)?;
        }

        Ok(config)
    }

    pub fn with_reference(mut self, reference: ReferenceLocation) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_api_base_url(
        mut self,
        base_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let base_url = base_url.into();
        let lower = base_url.trim().to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl { value: base_url });
        }

        self.api_base_url = base_url.trim().to_owned();
        Ok(self)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ValidationError> {
        if timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout {
                value: timeout_ms.to_string(),
            });
        }

        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    /// Serve everything from the built-in fixtures; no network access.
    pub fn with_mock_mode(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }

    pub fn reference(&self) -> Option<&ReferenceLocation> {
        self.reference.as_ref()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub const fn is_mock(&self) -> bool {
        self.use_mock
    }

    /// Sources a lookup would consult with this configuration.
    pub fn source_chain(&self) -> Vec<SourceId> {
        if self.use_mock {
            return vec![SourceId::Fixture];
        }

        let mut chain = Vec::with_capacity(2);
        if let Some(reference) = &self.reference {
            chain.push(reference.source_id());
        }
        chain.push(SourceId::Api);
        chain
    }

    fn auth(&self) -> HttpAuth {
        self.api_key
            .clone()
            .map_or(HttpAuth::None, HttpAuth::BearerToken)
    }

    /// Builds the aggregation flow over reqwest-backed adapters, or fixtures
    /// in mock mode.
    pub fn build(&self) -> Result<Aggregator, ValidationError> {
        self.build_with_client(Arc::new(ReqwestHttpClient::new()))
    }

    /// Like [`SourceConfig::build`] with a caller-supplied transport.
    pub fn build_with_client(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Aggregator, ValidationError> {
        if self.use_mock {
            debug!("using fixture sources");
            let data = Arc::new(FixtureEtfSource::krx_sample());
            return Ok(Aggregator::new(
                Arc::new(FixtureReferenceSource::krx_sample()),
                data.clone(),
                data,
            ));
        }

        let reference = self
            .reference
            .clone()
            .ok_or(ValidationError::MissingReference)?;
        debug!(
            reference = %reference,
            api_base_url = %self.api_base_url,
            authenticated = self.has_api_key(),
            timeout_ms = self.timeout_ms,
            "using live sources"
        );

        let reference = KrxReferenceSource::new(reference, http_client.clone())
            .with_timeout_ms(self.timeout_ms);
        let data = Arc::new(
            RestEtfSource::new(self.api_base_url.clone(), http_client)
                .with_auth(self.auth())
                .with_timeout_ms(self.timeout_ms),
        );

        Ok(Aggregator::new(Arc::new(reference), data.clone(), data))
    }
}

fn parse_timeout_ms(raw: &str) -> Result<u64, ValidationError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ValidationError::InvalidTimeout {
            value: raw.to_owned(),
        })
}
