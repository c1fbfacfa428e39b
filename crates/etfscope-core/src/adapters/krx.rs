use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data_source::{ReferenceSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{EtfCode, EtfRecord, SourceId, ValidationError};

/// Where the reference dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLocation {
    Url(String),
    File(PathBuf),
}

impl ReferenceLocation {
    /// `http://` and `https://` inputs are URLs; anything else is a path.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidReferenceLocation {
                value: input.to_owned(),
            });
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(trimmed.to_owned()))
        } else {
            Ok(Self::File(PathBuf::from(trimmed)))
        }
    }

    pub const fn source_id(&self) -> SourceId {
        match self {
            Self::Url(_) => SourceId::Krx,
            Self::File(_) => SourceId::File,
        }
    }
}

impl Display for ReferenceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// KRX ETF listing in CSV form, downloaded or read from disk.
///
/// Korean KRX headers and their English aliases are both accepted:
///
/// | KRX header | Alias | Required |
/// |------------|-------|----------|
/// | `ETF명` | `name` | yes |
/// | `ETF 코드` | `code` | yes |
/// | `유형` | `fund_type` | no |
/// | `펀드보수` | `fee_rate` | no |
/// | `자산운용사` | `manager` | no |
/// | `PDF 링크` | `document_link` | no |
#[derive(Clone)]
pub struct KrxReferenceSource {
    location: ReferenceLocation,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl KrxReferenceSource {
    pub fn new(location: ReferenceLocation, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            location,
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_text(&self) -> Result<String, SourceError> {
        match &self.location {
            ReferenceLocation::Url(url) => {
                let request = HttpRequest::get(url)
                    .with_header("accept", "text/csv")
                    .with_timeout_ms(self.timeout_ms);
                let response = self.http_client.execute(request).await.map_err(|e| {
                    SourceError::unavailable(format!("krx transport error: {}", e.message()))
                })?;

                if !response.is_success() {
                    return Err(SourceError::status(SourceId::Krx, response.status));
                }
                Ok(response.body)
            }
            ReferenceLocation::File(path) => std::fs::read_to_string(path).map_err(|e| {
                SourceError::unavailable(format!(
                    "cannot read reference file {}: {e}",
                    path.display()
                ))
            }),
        }
    }
}

impl ReferenceSource for KrxReferenceSource {
    fn id(&self) -> SourceId {
        self.location.source_id()
    }

    fn load(&self) -> SourceFuture<'_, Vec<EtfRecord>> {
        Box::pin(async move {
            let text = self.fetch_text().await?;
            let records = parse_reference_csv(&text)?;
            info!(
                source = %self.location,
                records = records.len(),
                "loaded ETF reference data"
            );
            Ok(records)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    #[serde(rename = "ETF명", alias = "name", default)]
    name: Option<String>,
    #[serde(rename = "ETF 코드", alias = "code", default)]
    code: Option<String>,
    #[serde(rename = "유형", alias = "fund_type", default)]
    fund_type: Option<String>,
    #[serde(rename = "펀드보수", alias = "fee_rate", default)]
    fee_rate: Option<String>,
    #[serde(rename = "자산운용사", alias = "manager", default)]
    manager: Option<String>,
    #[serde(rename = "PDF 링크", alias = "document_link", default)]
    document_link: Option<String>,
}

/// Parse a reference CSV into records, keeping feed order.
///
/// Rows without a usable code are skipped. Blank names are kept; lookup
/// ignores them.
pub fn parse_reference_csv(text: &str) -> Result<Vec<EtfRecord>, SourceError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SourceError::parse(format!("reference csv header: {e}")))?;
    if !has_column(headers, "ETF명", "name") || !has_column(headers, "ETF 코드", "code") {
        return Err(SourceError::parse(
            "reference csv must contain name and code columns",
        ));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<ReferenceRow>().enumerate() {
        let row = row.map_err(|e| SourceError::parse(format!("reference csv row {index}: {e}")))?;

        let code = match row.code.as_deref().map(EtfCode::parse) {
            Some(Ok(code)) => code,
            Some(Err(error)) => {
                warn!(row = index, %error, "skipping reference row with invalid code");
                continue;
            }
            None => {
                debug!(row = index, "skipping reference row without code");
                continue;
            }
        };

        records.push(EtfRecord {
            name: row.name.unwrap_or_default(),
            code,
            fund_type: non_blank(row.fund_type),
            fee_rate: row.fee_rate.as_deref().and_then(parse_fee_rate),
            manager: non_blank(row.manager),
            document_link: non_blank(row.document_link),
        });
    }

    Ok(records)
}

fn has_column(headers: &csv::StringRecord, krx: &str, alias: &str) -> bool {
    headers.iter().any(|header| header == krx || header == alias)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Accepts `0.05`, `0.05%` and `1,000.5`; blank or malformed values are none.
fn parse_fee_rate(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.trim().parse::<f64>().ok().filter(|fee| fee.is_finite())
}
