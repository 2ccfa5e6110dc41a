mod commands;
mod ui;

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sli_config::SliSource;
use sli_core::MAX_WINDOW_DAYS;
use sli_publisher::ReportFormat;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sli-publisher")]
#[command(about = "Computes windowed SLI ratios from a metrics backend and publishes them as derived metrics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, env = "SLI_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every configured SLI and publish the ratios
    Run(RunArgs),

    /// Check SLI definitions without querying a backend
    Validate(ValidateArgs),

    /// List the standard statistics accepted in SLI definitions
    List,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Json,
    Markdown,
    Prometheus,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => ReportFormat::Json,
            ReportFormatArg::Markdown => ReportFormat::Markdown,
            ReportFormatArg::Prometheus => ReportFormat::Prometheus,
        }
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SliSourceArgs {
    /// SLI definitions as JSON (name -> {numerator, denominator, window_days?})
    #[arg(long, env = "SLIS", hide_env_values = true)]
    slis: Option<String>,

    /// Read SLI definitions from a JSON, YAML, or TOML file
    #[arg(long)]
    slis_file: Option<PathBuf>,
}

impl SliSourceArgs {
    pub fn source(&self) -> SliSource {
        match &self.slis_file {
            Some(path) => SliSource::File(path.clone()),
            None => SliSource::Inline(self.slis.clone().unwrap_or_default()),
        }
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct BackendArgs {
    /// Base URL of the metrics gateway
    #[arg(long, env = "SLI_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Serve queries from a JSON fixture instead of a live backend
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Namespace the derived SLI metrics are written to
    #[arg(long, env = "SLI_NAMESPACE", value_parser = NonEmptyStringValueParser::new())]
    pub namespace: String,

    /// Prefix prepended to each derived metric name
    #[arg(long, env = "SLI_PREFIX", value_parser = NonEmptyStringValueParser::new())]
    pub prefix: String,

    /// Window in days for SLIs that do not set window_days
    #[arg(long, env = "WINDOW_DAYS", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS)))]
    pub window_days: u32,

    #[command(flatten)]
    pub slis: SliSourceArgs,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Bearer token sent to the metrics gateway
    #[arg(long, env = "SLI_BACKEND_TOKEN", hide_env_values = true)]
    pub backend_token: Option<String>,

    /// Timeout for each backend request
    #[arg(long, env = "SLI_BACKEND_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Compute and log ratios without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Fail a metric query when the backend splits the window into several datapoints
    #[arg(long)]
    pub strict_datapoints: bool,

    /// Write a report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Format of the report file
    #[arg(long, value_enum, default_value_t = ReportFormatArg::Json)]
    pub report_format: ReportFormatArg,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Window in days for SLIs that do not set window_days
    #[arg(long, env = "WINDOW_DAYS", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS)))]
    pub window_days: u32,

    #[command(flatten)]
    pub slis: SliSourceArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG overrides the flags
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Pretty => builder
            .with_ansi(std::io::stderr().is_terminal())
            .init(),
        LogFormat::Json => builder.json().init(),
    }

    match cli.command {
        Commands::Run(args) => {
            commands::run::execute(args).await?;
        }

        Commands::Validate(args) => {
            commands::validate::execute(args).await?;
        }

        Commands::List => {
            commands::list::execute().await?;
        }
    }

    Ok(())
}
