mod calc;
mod lookup;
mod sources;

use etfscope_core::{Envelope, EnvelopeError, ReferenceLocation, SourceConfig, SourceId};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::CommandOutput;

pub struct CommandResult {
    pub data: Value,
    pub table: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<SourceId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceId>) -> Self {
        Self {
            data,
            table: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_table(mut self, table: Vec<String>) -> Self {
        self.table = table;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let config = source_config(cli)?;

    let command_result = match &cli.command {
        Command::Lookup(args) => lookup::run(args, &config).await?,
        Command::Calc(args) => calc::run(args, config.source_chain())?,
        Command::Sources => sources::run(&config)?,
    };

    let CommandResult {
        data,
        table,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta()?;
    let envelope = Envelope::with_errors(meta, data, errors)?;
    Ok(CommandOutput { envelope, table })
}

/// Environment first, then command-line overrides.
pub fn source_config(cli: &Cli) -> Result<SourceConfig, CliError> {
    let mut config = SourceConfig::from_env()?.with_mock_mode(cli.mock);

    if let Some(reference) = &cli.reference {
        config = config.with_reference(ReferenceLocation::parse(reference)?);
    }
    if let Some(base_url) = &cli.api_base_url {
        config = config.with_api_base_url(base_url.as_str())?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn reference_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[tokio::test]
    async fn unmatched_names_from_a_file_reference_are_envelope_errors() {
        let file = reference_file("name,code\nAlpha ETF,000001\n");
        let path = file.path().to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "etfscope",
            "--reference",
            path.as_str(),
            "lookup",
            "Gamma, Delta",
        ]);

        let output = run(&cli).await.expect("lookup completes");

        let codes: Vec<&str> = output
            .envelope
            .errors
            .iter()
            .map(|error| error.code.as_str())
            .collect();
        assert_eq!(codes, vec!["lookup.not_found", "lookup.not_found"]);
        assert_eq!(output.envelope.meta.source_chain, vec![SourceId::File, SourceId::Api]);
    }

    #[tokio::test]
    async fn missing_reference_file_exits_with_reference_code() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.csv").to_string_lossy().into_owned();
        let cli = Cli::parse_from(["etfscope", "--reference", path.as_str(), "lookup", "Alpha"]);

        let error = run(&cli).await.expect_err("must fail");
        assert_eq!(error.exit_code(), 7);
    }

    #[tokio::test]
    async fn mock_lookup_caps_names_and_warns() {
        let cli = Cli::parse_from([
            "etfscope",
            "--mock",
            "lookup",
            "KODEX 200, TIGER 200, 레버리지, S&P500",
        ]);

        let output = run(&cli).await.expect("lookup completes");

        assert_eq!(output.envelope.data["etfs"].as_array().map(Vec::len), Some(3));
        assert!(output
            .envelope
            .meta
            .warnings
            .iter()
            .any(|warning| warning.starts_with("only the first 3 names")));
        assert!(output.envelope.errors.is_empty());
    }

    #[tokio::test]
    async fn blank_lookup_is_a_validation_error() {
        let cli = Cli::parse_from(["etfscope", "--mock", "lookup", " , "]);

        let error = run(&cli).await.expect_err("must fail");
        assert_eq!(error.exit_code(), 2);
    }
}
