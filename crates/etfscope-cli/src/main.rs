mod cli;
mod commands;
mod error;
mod metadata;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

/// Log filter variable; falls back to `warn`.
const LOG_ENV: &str = "ETFSCOPE_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let output = commands::run(cli).await?;
    output::render(&output, cli.format, cli.pretty)?;

    let envelope = &output.envelope;
    if cli.strict && (!envelope.meta.warnings.is_empty() || envelope.has_errors()) {
        return Err(CliError::StrictModeViolation {
            warning_count: envelope.meta.warnings.len(),
            error_count: envelope.errors.len(),
        });
    }

    if envelope.has_errors() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
