use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::EtfCode;

/// One row of exchange reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfRecord {
    pub name: String,
    pub code: EtfCode,
    pub fund_type: Option<String>,
    /// Annual fee as a percentage (`0.05` means 0.05%).
    pub fee_rate: Option<f64>,
    pub manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
}

impl EtfRecord {
    pub fn new(name: impl Into<String>, code: EtfCode) -> Self {
        Self {
            name: name.into(),
            code,
            fund_type: None,
            fee_rate: None,
            manager: None,
            document_link: None,
        }
    }

    pub fn with_fund_type(mut self, fund_type: impl Into<String>) -> Self {
        self.fund_type = Some(fund_type.into());
        self
    }

    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = Some(fee_rate);
        self
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }

    pub fn with_document_link(mut self, link: impl Into<String>) -> Self {
        self.document_link = Some(link.into());
        self
    }
}

/// Market snapshot for one ETF.
///
/// Fields absent from an upstream payload deserialize to zero, which the
/// aggregation flow treats as "not present" when deciding which metrics to
/// compute. A share count that is not a whole, non-negative number is also
/// read as zero rather than failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub total_assets: f64,
    #[serde(default, deserialize_with = "lenient_share_count")]
    pub total_shares: u64,
    #[serde(default)]
    pub market_price: f64,
}

impl MarketData {
    pub const fn new(total_assets: f64, total_shares: u64, market_price: f64) -> Self {
        Self {
            total_assets,
            total_shares,
            market_price,
        }
    }
}

fn lenient_share_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(share_count).unwrap_or(0))
}

/// `150000`, `150000.0` and `"150,000"` all count 150000 shares.
fn share_count(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }

    let count = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    let whole = count.is_finite() && count >= 0.0 && count.fract() == 0.0;
    (whole && count <= u64::MAX as f64).then(|| count as u64)
}

/// Fixed set of return horizons charted for every ETF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReturnPeriod {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl ReturnPeriod {
    pub const ALL: [Self; 3] = [Self::OneYear, Self::FiveYears, Self::TenYears];

    /// Key used by the returns API payload.
    pub const fn key(self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OneYear => "1-year",
            Self::FiveYears => "5-year",
            Self::TenYears => "10-year",
        }
    }
}

impl Display for ReturnPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage returns per period, with an optional benchmark series and the
/// untouched upstream payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoricalReturns {
    pub returns: BTreeMap<ReturnPeriod, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub benchmark: BTreeMap<ReturnPeriod, f64>,
    #[serde(skip)]
    pub raw: Value,
}

impl HistoricalReturns {
    /// Build from a returns payload such as `{"1y": 3.2, "5y": 18.0}`.
    ///
    /// Keys outside the fixed period set are kept in `raw` only. Values may be
    /// JSON numbers or numeric strings; anything else is treated as missing.
    pub fn from_payload(raw: Value) -> Self {
        let returns = extract_periods(&raw);
        let benchmark = raw
            .get("benchmark")
            .map(extract_periods)
            .unwrap_or_default();

        Self {
            returns,
            benchmark,
            raw,
        }
    }

    pub fn get(&self, period: ReturnPeriod) -> Option<f64> {
        self.returns.get(&period).copied()
    }

    /// Values for the three chart bars; missing periods chart as zero.
    pub fn chart_series(&self) -> [(ReturnPeriod, f64); 3] {
        ReturnPeriod::ALL.map(|period| (period, self.get(period).unwrap_or(0.0)))
    }

    /// ETF and benchmark returns over the periods both series report, in
    /// horizon order.
    pub fn aligned_with_benchmark(&self) -> (Vec<f64>, Vec<f64>) {
        ReturnPeriod::ALL
            .iter()
            .filter_map(|period| Some((self.returns.get(period)?, self.benchmark.get(period)?)))
            .map(|(etf, benchmark)| (*etf, *benchmark))
            .unzip()
    }
}

fn extract_periods(value: &Value) -> BTreeMap<ReturnPeriod, f64> {
    ReturnPeriod::ALL
        .iter()
        .filter_map(|period| {
            let number = match value.get(period.key())? {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().trim_end_matches('%').parse::<f64>().ok(),
                _ => None,
            }?;
            number.is_finite().then_some((*period, number))
        })
        .collect()
}
