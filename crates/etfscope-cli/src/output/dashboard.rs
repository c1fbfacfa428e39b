//! Terminal rendering of lookup results.

use etfscope_core::{EtfOutcome, EtfReport, Fetched, HistoricalReturns, LookupOutput};

use super::chart::render_bars;

/// Text lines for every outcome, in request order.
pub fn render_lookup(output: &LookupOutput, raw: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for outcome in &output.outcomes {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        match outcome {
            EtfOutcome::Displayed(report) => render_report(report, raw, &mut lines),
            EtfOutcome::NotFound { name } => {
                lines.push(format!("[not found] no ETF matches '{name}'"));
            }
        }
    }
    lines
}

fn render_report(report: &EtfReport, raw: bool, lines: &mut Vec<String>) {
    let record = &report.record;
    lines.push(format!("== {} ({}) ==", record.name, record.code));
    lines.push(field("query", &report.query));
    lines.push(field("type", record.fund_type.as_deref().unwrap_or("-")));
    lines.push(field(
        "fee",
        &record
            .fee_rate
            .map_or_else(|| String::from("-"), |fee| format!("{fee}%")),
    ));
    lines.push(field("manager", record.manager.as_deref().unwrap_or("-")));
    if let Some(link) = &record.document_link {
        lines.push(field("document", link));
    }

    let market = report.market_values();
    if let Some(reason) = report.market.reason() {
        lines.push(field("market data", &format!("unavailable ({reason})")));
    }
    lines.push(field("total assets", &group_thousands(market.total_assets, 0)));
    lines.push(field("total shares", &group_thousands(market.total_shares as f64, 0)));
    lines.push(field("market price", &group_thousands(market.market_price, 2)));

    let metrics = &report.metrics;
    if let Some(nav) = metrics.nav {
        lines.push(field("NAV", &group_thousands(nav, 2)));
    }
    if let Some(premium) = metrics.premium_discount_pct {
        lines.push(field("premium/disc", &format!("{premium:+.2}%")));
    }
    if let Some(tracking) = metrics.tracking_error {
        lines.push(field("tracking err", &format!("{tracking:.4}")));
    }

    lines.push(String::from("  returns:"));
    match &report.returns {
        Fetched::Available { data } => {
            lines.extend(render_bars(data).into_iter().map(|bar| format!("    {bar}")));
        }
        Fetched::Unavailable { reason, .. } => {
            lines.push(format!("    unavailable ({reason})"));
        }
    }

    if !report.notes.is_empty() {
        lines.push(String::from("  skipped:"));
        for note in &report.notes {
            lines.push(format!("    - {}: {}", note.metric, note.reason));
        }
    }

    if raw {
        lines.push(String::from("  raw returns:"));
        lines.extend(
            raw_returns_lines(&report.returns)
                .into_iter()
                .map(|line| format!("    {line}")),
        );
    }
}

fn raw_returns_lines(returns: &Fetched<HistoricalReturns>) -> Vec<String> {
    match returns {
        Fetched::Available { data } => serde_json::to_string_pretty(&data.raw)
            .map(|text| text.lines().map(str::to_owned).collect())
            .unwrap_or_else(|_| vec![data.raw.to_string()]),
        Fetched::Unavailable { reason, .. } => vec![format!("unavailable ({reason})")],
    }
}

fn field(label: &str, value: &str) -> String {
    format!("  {label:<12}: {value}")
}

/// `1234567.891` with 2 decimals renders as `1,234,567.89`.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use etfscope_core::{
        DerivedMetrics, EtfCode, EtfRecord, MarketData, MetricKind, MetricNote,
    };
    use serde_json::json;

    use super::*;

    fn report(market: Fetched<MarketData>, returns: Fetched<HistoricalReturns>) -> EtfReport {
        EtfReport {
            query: String::from("Alpha"),
            record: EtfRecord::new("Alpha ETF", EtfCode::parse("000001").expect("valid code"))
                .with_fee_rate(0.05),
            market,
            returns,
            metrics: DerivedMetrics::default(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(-1_000.0, 0), "-1,000");
        assert_eq!(group_thousands(0.0, 2), "0.00");
    }

    #[test]
    fn not_found_and_displayed_are_separated() {
        let output = LookupOutput {
            outcomes: vec![
                EtfOutcome::Displayed(report(
                    Fetched::Available {
                        data: MarketData::new(1_000_000.0, 100, 10_100.0),
                    },
                    Fetched::Available {
                        data: HistoricalReturns::from_payload(json!({ "1y": 5.0 })),
                    },
                )),
                EtfOutcome::NotFound {
                    name: String::from("Gamma"),
                },
            ],
            dropped_names: 0,
        };

        let lines = render_lookup(&output, false);

        assert_eq!(lines[0], "== Alpha ETF (000001) ==");
        assert!(lines.contains(&String::from("  fee         : 0.05%")));
        assert!(lines.contains(&String::from("  total assets: 1,000,000")));
        assert_eq!(lines.last().map(String::as_str), Some("[not found] no ETF matches 'Gamma'"));
        assert!(lines.iter().any(String::is_empty));
    }

    #[test]
    fn unavailable_market_shows_zeros_and_reason() {
        let mut displayed = report(
            Fetched::Unavailable {
                code: String::from("source.unavailable"),
                reason: String::from("api returned status 503"),
            },
            Fetched::Unavailable {
                code: String::from("source.unavailable"),
                reason: String::from("api returned status 503"),
            },
        );
        displayed.notes.push(MetricNote {
            metric: MetricKind::Nav,
            reason: String::from("market data unavailable"),
        });
        let output = LookupOutput {
            outcomes: vec![EtfOutcome::Displayed(displayed)],
            dropped_names: 0,
        };

        let lines = render_lookup(&output, true);

        assert!(lines.contains(&String::from(
            "  market data : unavailable (api returned status 503)"
        )));
        assert!(lines.contains(&String::from("  total shares: 0")));
        assert!(lines.contains(&String::from("    - nav: market data unavailable")));
        assert!(!lines.iter().any(|line| line.contains("NAV")));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("    unavailable (api returned status 503)")
        );
    }

    #[test]
    fn unavailable_returns_draw_no_bars() {
        let output = LookupOutput {
            outcomes: vec![EtfOutcome::Displayed(report(
                Fetched::Available {
                    data: MarketData::new(1_000_000.0, 100, 10_100.0),
                },
                Fetched::Unavailable {
                    code: String::from("source.unavailable"),
                    reason: String::from("api returned status 404"),
                },
            ))],
            dropped_names: 0,
        };

        let lines = render_lookup(&output, false);

        let returns_at = lines
            .iter()
            .position(|line| line == "  returns:")
            .expect("returns section present");
        assert_eq!(lines[returns_at + 1], "    unavailable (api returned status 404)");
        assert!(!lines.iter().any(|line| line.contains(" | ")));
        assert!(!lines.iter().any(|line| line.ends_with('%') && line.contains("year")));
    }

    #[test]
    fn missing_periods_read_as_not_available() {
        // Given: returns that only report the 5-year horizon
        let output = LookupOutput {
            outcomes: vec![EtfOutcome::Displayed(report(
                Fetched::Available {
                    data: MarketData::new(1_000_000.0, 100, 10_100.0),
                },
                Fetched::Available {
                    data: HistoricalReturns::from_payload(json!({ "5y": 7.0 })),
                },
            ))],
            dropped_names: 0,
        };

        // When
        let lines = render_lookup(&output, false);

        // Then: only the reported period shows a percentage
        let period_line = |label: &str| {
            lines
                .iter()
                .find(|line| line.trim_start().starts_with(label))
                .cloned()
                .unwrap_or_default()
        };
        assert!(period_line("1-year").ends_with("n/a"));
        assert!(period_line("5-year").ends_with("+7.00%"));
        assert!(period_line("10-year").ends_with("n/a"));
        assert!(!lines.iter().any(|line| line.ends_with("+0.00%")));
    }

    #[test]
    fn raw_view_prints_the_payload() {
        let output = LookupOutput {
            outcomes: vec![EtfOutcome::Displayed(report(
                Fetched::Available {
                    data: MarketData::default(),
                },
                Fetched::Available {
                    data: HistoricalReturns::from_payload(json!({ "1y": 5.0, "ytd": 1.0 })),
                },
            ))],
            dropped_names: 0,
        };

        let lines = render_lookup(&output, true);
        let raw_start = lines
            .iter()
            .position(|line| line == "  raw returns:")
            .expect("raw section present");

        assert!(lines[raw_start..].iter().any(|line| line.contains("\"ytd\": 1.0")));
    }
}
