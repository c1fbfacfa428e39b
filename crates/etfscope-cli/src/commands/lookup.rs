use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use etfscope_core::{EnvelopeError, EtfOutcome, SourceConfig, MAX_NAMES_PER_REQUEST};

use crate::cli::LookupArgs;
use crate::error::CliError;
use crate::output::dashboard::render_lookup;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct LookupResponseData<'a> {
    etfs: &'a [EtfOutcome],
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_returns: Option<BTreeMap<String, Value>>,
}

pub async fn run(args: &LookupArgs, config: &SourceConfig) -> Result<CommandResult, CliError> {
    let aggregator = config.build()?;
    let started = Instant::now();
    let output = aggregator.lookup(&args.query()).await?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut warnings = Vec::new();
    if output.dropped_names > 0 {
        warnings.push(format!(
            "only the first {MAX_NAMES_PER_REQUEST} names were processed; {} ignored",
            output.dropped_names
        ));
    }
    for report in output.outcomes.iter().filter_map(EtfOutcome::report) {
        if let Some(reason) = report.market.reason() {
            warnings.push(format!("market data for {} unavailable: {reason}", report.record.code));
        }
        if let Some(reason) = report.returns.reason() {
            warnings.push(format!("returns for {} unavailable: {reason}", report.record.code));
        }
    }

    let errors = output.not_found().map(EnvelopeError::not_found).collect();

    let raw_returns = args.raw.then(|| {
        output
            .outcomes
            .iter()
            .filter_map(EtfOutcome::report)
            .filter_map(|report| {
                let returns = report.historical_returns()?;
                Some((report.record.code.to_string(), returns.raw.clone()))
            })
            .collect()
    });

    let data = serde_json::to_value(LookupResponseData {
        etfs: &output.outcomes,
        raw_returns,
    })?;

    Ok(CommandResult::ok(data, aggregator.source_chain())
        .with_table(render_lookup(&output, args.raw))
        .with_warnings(warnings)
        .with_errors(errors)
        .with_latency(latency_ms))
}
