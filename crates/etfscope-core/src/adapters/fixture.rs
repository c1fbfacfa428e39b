//! Deterministic in-memory sources for `--mock` runs and tests.

use std::collections::BTreeMap;

use serde_json::json;

use crate::data_source::{
    MarketDataSource, ReferenceSource, ReturnsSource, SourceError, SourceFuture,
};
use crate::{EtfCode, EtfRecord, HistoricalReturns, MarketData, SourceId};

/// Fixed reference catalog.
#[derive(Debug, Clone)]
pub struct FixtureReferenceSource {
    records: Vec<EtfRecord>,
}

impl FixtureReferenceSource {
    pub fn new(records: Vec<EtfRecord>) -> Self {
        Self { records }
    }

    /// A handful of well-known KRX listings.
    pub fn krx_sample() -> Self {
        let rows: [(&str, &str, &str, f64, &str); 5] = [
            ("KODEX 200", "069500", "국내주식", 0.15, "삼성자산운용"),
            ("TIGER 200", "102110", "국내주식", 0.05, "미래에셋자산운용"),
            ("KODEX 레버리지", "122630", "국내주식 레버리지", 0.64, "삼성자산운용"),
            ("TIGER 미국S&P500", "360750", "해외주식", 0.07, "미래에셋자산운용"),
            ("KODEX 200선물인버스2X", "252670", "국내주식 인버스", 0.64, "삼성자산운용"),
        ];

        let records = rows
            .into_iter()
            .filter_map(|(name, code, fund_type, fee, manager)| {
                let code = EtfCode::parse(code).ok()?;
                Some(
                    EtfRecord::new(name, code.clone())
                        .with_fund_type(fund_type)
                        .with_fee_rate(fee)
                        .with_manager(manager)
                        .with_document_link(format!(
                            "https://fixture.etfscope.invalid/pdf/{code}.pdf"
                        )),
                )
            })
            .collect();

        Self { records }
    }
}

impl ReferenceSource for FixtureReferenceSource {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn load(&self) -> SourceFuture<'_, Vec<EtfRecord>> {
        let records = self.records.clone();
        Box::pin(async move { Ok(records) })
    }
}

/// Fixed market data and returns keyed by code. Unknown codes behave like a
/// 404 from the real API.
#[derive(Debug, Clone, Default)]
pub struct FixtureEtfSource {
    market: BTreeMap<EtfCode, MarketData>,
    returns: BTreeMap<EtfCode, HistoricalReturns>,
}

impl FixtureEtfSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market_data(mut self, code: EtfCode, data: MarketData) -> Self {
        self.market.insert(code, data);
        self
    }

    pub fn with_returns(mut self, code: EtfCode, returns: HistoricalReturns) -> Self {
        self.returns.insert(code, returns);
        self
    }

    /// Data matching [`FixtureReferenceSource::krx_sample`]. `252670` has
    /// market data but no returns so both degraded paths are reachable.
    pub fn krx_sample() -> Self {
        let market = [
            ("069500", 7_512_000_000_000.0, 208_000_000, 36_180.0),
            ("102110", 6_190_000_000_000.0, 171_500_000, 36_050.0),
            ("122630", 2_380_000_000_000.0, 132_000_000, 18_020.0),
            ("360750", 4_025_000_000_000.0, 214_300_000, 18_805.0),
            ("252670", 1_104_000_000_000.0, 513_000_000, 2_150.0),
        ];
        let returns = [
            (
                "069500",
                json!({
                    "1y": 8.41,
                    "5y": 31.7,
                    "10y": 72.3,
                    "benchmark": { "1y": 8.62, "5y": 32.4, "10y": 74.1 }
                }),
            ),
            (
                "102110",
                json!({
                    "1y": 8.55,
                    "5y": 32.1,
                    "10y": 73.0,
                    "benchmark": { "1y": 8.62, "5y": 32.4, "10y": 74.1 }
                }),
            ),
            ("122630", json!({ "1y": 14.2, "5y": 41.9, "10y": 88.6 })),
            ("360750", json!({ "1y": 27.3, "5y": 98.4 })),
        ];

        let mut source = Self::new();
        for (code, assets, shares, price) in market {
            if let Ok(code) = EtfCode::parse(code) {
                source = source.with_market_data(code, MarketData::new(assets, shares, price));
            }
        }
        for (code, payload) in returns {
            if let Ok(code) = EtfCode::parse(code) {
                source = source.with_returns(code, HistoricalReturns::from_payload(payload));
            }
        }
        source
    }
}

impl MarketDataSource for FixtureEtfSource {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn market_data<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, MarketData> {
        let result = self
            .market
            .get(code)
            .copied()
            .ok_or_else(|| SourceError::status(SourceId::Fixture, 404));
        Box::pin(async move { result })
    }
}

impl ReturnsSource for FixtureEtfSource {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn historical_returns<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, HistoricalReturns> {
        let result = self
            .returns
            .get(code)
            .cloned()
            .ok_or_else(|| SourceError::status(SourceId::Fixture, 404));
        Box::pin(async move { result })
    }
}
