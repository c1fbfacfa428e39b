use serde_json::json;

use etfscope_core::{metrics, EnvelopeError, MetricError, SourceId};

use crate::cli::{CalcArgs, CalcCommand};
use crate::error::CliError;

use super::CommandResult;

/// Metric failures are reported in the envelope, not as a process error.
pub fn run(args: &CalcArgs, source_chain: Vec<SourceId>) -> Result<CommandResult, CliError> {
    let (metric, result) = match &args.command {
        CalcCommand::Nav {
            total_assets,
            total_shares,
        } => ("nav", metrics::nav(*total_assets, *total_shares)),
        CalcCommand::Premium { market_price, nav } => (
            "premium_discount_pct",
            metrics::premium_discount(*market_price, *nav),
        ),
        CalcCommand::TrackingError { etf, benchmark } => {
            ("tracking_error", metrics::tracking_error(etf, benchmark))
        }
    };

    match result {
        Ok(value) => Ok(CommandResult::ok(json!({ metric: value }), source_chain)
            .with_table(vec![format!("{metric}: {value:.4}")])),
        Err(error) => Ok(CommandResult::ok(json!({ metric: null }), source_chain)
            .with_table(vec![format!("{metric}: not computed")])
            .with_errors(vec![metric_error(&error)?])),
    }
}

fn metric_error(error: &MetricError) -> Result<EnvelopeError, CliError> {
    Ok(EnvelopeError::new(error.code(), error.to_string())?)
}
