//! CLI entry point for the trending token aggregator.
//!
//! Provides subcommands for running the full fetch/aggregate/report pipeline,
//! re-rendering a saved summary CSV, and dumping raw snapshots.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trending_aggregator::analyzers::aggregate::aggregate_snapshots;
use trending_aggregator::analyzers::filter::filter_and_sort;
use trending_aggregator::analyzers::types::{
    MIN_AVG_VOLUME, MIN_CONSISTENCY, MIN_MEDIAN_MARKET_CAP, Thresholds,
};
use trending_aggregator::collector::collect_snapshots;
use trending_aggregator::infra::gmgn::{DEFAULT_BASE_URL, DEFAULT_CHAIN, GmgnClient};
use trending_aggregator::output::{print_pretty, read_summaries, write_snapshots};
use trending_aggregator::report::{DEFAULT_CSV_PATH, DEFAULT_PLOT_PATH, ReportTargets, publish};
use trending_aggregator::snapshot::{Timeframe, TokenSnapshot};

#[derive(Parser)]
#[command(name = "trending_aggregator")]
#[command(about = "Aggregate trending tokens across timeframes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FetchArgs {
    /// Timeframes to query, in order
    #[arg(short, long, value_delimiter = ',', default_value = "1m,5m,1h,6h,24h")]
    timeframes: Vec<Timeframe>,

    /// Chain to rank tokens on
    #[arg(long, default_value = DEFAULT_CHAIN)]
    chain: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, aggregate, filter and report trending tokens
    Analyze {
        #[command(flatten)]
        fetch: FetchArgs,

        /// CSV file to write the filtered summaries to
        #[arg(short, long, default_value = DEFAULT_CSV_PATH)]
        output: PathBuf,

        /// PNG file to render the scatter plot to
        #[arg(long, default_value = DEFAULT_PLOT_PATH)]
        plot: PathBuf,

        /// Minimum number of distinct timeframes a token must appear in
        #[arg(long, default_value_t = MIN_CONSISTENCY)]
        min_consistency: usize,

        /// Minimum average volume
        #[arg(long, default_value_t = MIN_AVG_VOLUME)]
        min_volume: f64,

        /// Minimum median market cap
        #[arg(long, default_value_t = MIN_MEDIAN_MARKET_CAP)]
        min_market_cap: f64,

        /// Do not open the plot in an image viewer, even when a display is available
        #[arg(long, default_value_t = false)]
        no_show: bool,
    },
    /// Re-render the table and plot from a previously written summary CSV
    Report {
        /// Summary CSV to read
        #[arg(short, long, default_value = DEFAULT_CSV_PATH)]
        input: PathBuf,

        /// PNG file to render the scatter plot to
        #[arg(long, default_value = DEFAULT_PLOT_PATH)]
        plot: PathBuf,

        /// Do not open the plot in an image viewer, even when a display is available
        #[arg(long, default_value_t = false)]
        no_show: bool,
    },
    /// Fetch trending tokens and write the raw per-timeframe rows to CSV
    Snapshots {
        #[command(flatten)]
        fetch: FetchArgs,

        /// CSV file to write the snapshots to
        #[arg(short, long, default_value = "trending_snapshots.csv")]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/trending_aggregator.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trending_aggregator.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            fetch,
            output,
            plot,
            min_consistency,
            min_volume,
            min_market_cap,
            no_show,
        } => {
            let thresholds = Thresholds {
                min_consistency,
                min_avg_volume: min_volume,
                min_median_market_cap: min_market_cap,
            };
            let targets = ReportTargets {
                csv: Some(output),
                plot,
                show: !no_show,
            };
            analyze(&fetch, &thresholds, &targets).await?;
        }
        Commands::Report {
            input,
            plot,
            no_show,
        } => {
            let summaries = read_summaries(&input)?;
            info!(path = %input.display(), rows = summaries.len(), "Summaries loaded");

            let targets = ReportTargets {
                csv: None,
                plot,
                show: !no_show,
            };
            publish(&summaries, &targets)?;
        }
        Commands::Snapshots { fetch, output } => {
            let snapshots = fetch_snapshots(&fetch).await?;
            write_snapshots(&output, &snapshots)?;
            info!(path = %output.display(), rows = snapshots.len(), "Snapshots written");
        }
    }

    Ok(())
}

/// Runs the whole pipeline: fetch, aggregate, filter, report.
#[tracing::instrument(skip_all, fields(chain = %fetch.chain))]
async fn analyze(fetch: &FetchArgs, thresholds: &Thresholds, targets: &ReportTargets) -> Result<()> {
    let snapshots = fetch_snapshots(fetch).await?;

    let summaries = aggregate_snapshots(&snapshots);
    info!(
        snapshots = snapshots.len(),
        tokens = summaries.len(),
        "Snapshots aggregated"
    );

    let filtered = filter_and_sort(summaries, thresholds);
    info!(retained = filtered.len(), ?thresholds, "Summaries filtered");
    print_pretty(&filtered);

    publish(&filtered, targets)
}

/// Builds the upstream client from the environment and collects all snapshots.
async fn fetch_snapshots(fetch: &FetchArgs) -> Result<Vec<TokenSnapshot>> {
    let base_url = std::env::var("GMGN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    info!(%base_url, chain = %fetch.chain, "Using trending source");

    let client = GmgnClient::new(&base_url, &fetch.chain)?;
    collect_snapshots(&client, &fetch.timeframes).await
}
