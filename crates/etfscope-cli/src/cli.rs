//! CLI argument definitions for etfscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lookup` | Look up 1-3 ETFs by name fragment and show metrics |
//! | `calc nav` | NAV from total assets and total shares |
//! | `calc premium` | Premium/discount from market price and NAV |
//! | `calc tracking-error` | Tracking error from two return series |
//! | `sources` | Show the configured reference and data sources |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--mock` | `false` | Use built-in fixture data |
//! | `--reference` | `$ETFSCOPE_REFERENCE` | KRX CSV URL or path |
//! | `--api-base-url` | `$ETFSCOPE_API_BASE_URL` | Market data API |
//! | `--timeout-ms` | `$ETFSCOPE_TIMEOUT_MS` or 3000 | Request timeout |
//! | `-v, --verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! etfscope --mock lookup "KODEX 200, TIGER"
//! etfscope --reference ./etf_list.csv lookup "레버리지" --raw
//! etfscope --format json --pretty calc nav --total-assets 1000000 --total-shares 100
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Korean ETF dashboard: look up ETFs by name and derive NAV,
/// premium/discount and tracking error.
#[derive(Debug, Parser)]
#[command(name = "etfscope", author, version, about = "ETF lookup and metrics CLI")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve reference data, market data and returns from built-in fixtures.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// KRX reference CSV, as an http(s) URL or a local path.
    #[arg(long, global = true)]
    pub reference: Option<String>,

    /// Base URL of the market data / returns API.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log at debug level (overrides ETFSCOPE_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable dashboard.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up ETFs by name fragment and show their metrics.
    ///
    /// Names are comma separated; at most three are processed.
    ///
    ///   etfscope lookup "KODEX 200, TIGER 200"
    Lookup(LookupArgs),

    /// Run a single metric calculation.
    Calc(CalcArgs),

    /// Show the configured sources.
    Sources,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Comma-separated ETF name fragments.
    #[arg(required = true, num_args = 1.., value_name = "NAMES")]
    pub names: Vec<String>,

    /// Also show the raw returns payload for each ETF.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

impl LookupArgs {
    /// Positional words are joined back into the comma-separated query, so
    /// `lookup KODEX 200, TIGER` behaves like `lookup "KODEX 200, TIGER"`.
    pub fn query(&self) -> String {
        self.names.join(" ")
    }
}

#[derive(Debug, Args)]
pub struct CalcArgs {
    #[command(subcommand)]
    pub command: CalcCommand,
}

#[derive(Debug, Subcommand)]
pub enum CalcCommand {
    /// NAV = total assets / total shares.
    Nav {
        #[arg(long)]
        total_assets: f64,
        #[arg(long)]
        total_shares: u64,
    },

    /// Premium/discount % = (market price - NAV) / NAV * 100.
    Premium {
        #[arg(long)]
        market_price: f64,
        #[arg(long)]
        nav: f64,
    },

    /// Population std-dev of per-period return differences.
    TrackingError {
        /// ETF returns, comma separated (e.g. 5.0,20.1,41.3).
        #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        etf: Vec<f64>,
        /// Benchmark returns, same order and length as --etf.
        #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        benchmark: Vec<f64>,
    },
}
