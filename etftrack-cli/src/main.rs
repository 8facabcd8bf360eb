//! ETF Track CLI — daily ETF analysis reports.
//!
//! Commands:
//! - `run` — fetch prices, compute indicators, decide a signal, write charts and
//!   an HTML report per ETF, optionally push a LINE notification
//! - `list` — print the supported ETF codes
//!
//! Exit code is 0 when every ticker completed, 1 otherwise (including
//! configuration errors, which are reported before any ticker runs).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use etftrack_core::data::YahooProvider;
use etftrack_runner::{
    AppConfig, LineNotifier, NotificationStatus, Notifier, Pipeline, RunSummary, TickerOutcome,
};

#[derive(Parser)]
#[command(name = "etftrack", about = "ETF Track — daily ETF technical analysis reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse ETFs and write reports.
    Run {
        /// ETF codes (e.g. 0050 006208). Defaults to the configured tickers.
        codes: Vec<String>,

        /// Analyse every supported ETF.
        #[arg(long, default_value_t = false, conflicts_with = "codes")]
        all: bool,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Calendar days of history to fetch.
        #[arg(long)]
        days: Option<u32>,

        /// Output directory for reports, charts and exports.
        #[arg(long)]
        reports_dir: Option<PathBuf>,

        /// Push a LINE notification per ETF (needs LINE credentials).
        #[arg(long, default_value_t = false)]
        notify: bool,

        /// Fall back to synthetic sample data when every provider symbol fails.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Process ETFs in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Skip chart rendering.
        #[arg(long, default_value_t = false)]
        no_charts: bool,
    },
    /// List supported ETF codes.
    List {
        /// Path to a TOML config file (for a custom registry).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

struct RunArgs {
    codes: Vec<String>,
    all: bool,
    config: Option<PathBuf>,
    days: Option<u32>,
    reports_dir: Option<PathBuf>,
    notify: bool,
    synthetic: bool,
    parallel: bool,
    no_charts: bool,
}

fn main() -> Result<ExitCode> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            codes,
            all,
            config,
            days,
            reports_dir,
            notify,
            synthetic,
            parallel,
            no_charts,
        } => run_cmd(RunArgs {
            codes,
            all,
            config,
            days,
            reports_dir,
            notify,
            synthetic,
            parallel,
            no_charts,
        }),
        Commands::List { config } => {
            list_cmd(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_cmd(args: RunArgs) -> Result<ExitCode> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(days) = args.days {
        config.history_days = days;
    }
    if let Some(dir) = args.reports_dir {
        config.reports_dir = dir;
    }
    config.notify.enabled |= args.notify;
    config.synthetic_fallback |= args.synthetic;
    if args.no_charts {
        config.charts.enabled = false;
    }
    config.validate()?;

    let registry = config.load_registry()?;
    let codes: Vec<String> = if args.all {
        registry.codes().into_iter().map(String::from).collect()
    } else if !args.codes.is_empty() {
        args.codes
    } else {
        config.tickers.clone()
    };
    AppConfig::check_tickers(&codes, &registry)?;

    let provider = YahooProvider::new().context("failed to set up the Yahoo Finance client")?;

    let notifier = if config.notify.enabled {
        match LineNotifier::from_config(&config.notify) {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "LINE notifier unavailable; notifications will be skipped");
                None
            }
        }
    } else {
        None
    };

    let as_of = chrono::Local::now().date_naive();
    let mut pipeline = Pipeline::new(&config, &registry, &provider, as_of)?;
    if let Some(n) = &notifier {
        pipeline = pipeline.with_notifier(n as &dyn Notifier);
    }

    let summary = pipeline.run(&codes, args.parallel);
    print_summary(&summary);

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_summary(summary: &RunSummary) {
    println!();
    for outcome in &summary.outcomes {
        match outcome {
            TickerOutcome::Completed(r) => {
                let report = r
                    .artifacts
                    .report_html
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let synthetic = if r.origin.is_synthetic() { " [synthetic]" } else { "" };
                println!(
                    "  {:<8} {:>10.2}  {:<36} {report}{synthetic}",
                    r.code,
                    r.close,
                    r.decision.label()
                );
                match &r.notification {
                    NotificationStatus::NotRequested => {}
                    NotificationStatus::Sent { recipients } => {
                        println!("           notified {recipients} recipient(s)");
                    }
                    NotificationStatus::Skipped(reason) => {
                        println!("           notification skipped: {reason}");
                    }
                    NotificationStatus::Failed(e) => println!("           {e}"),
                }
            }
            TickerOutcome::Failed(f) => {
                println!("  {:<8} FAILED at {}: {}", f.code, f.stage, f.error);
            }
        }
    }

    if let Some(index) = &summary.index {
        println!("\nIndex: {}", index.display());
    }
    if let Some(e) = &summary.index_error {
        println!("\nIndex page not written: {e}");
    }

    let failed = summary.failures().count();
    println!(
        "{} of {} ETF(s) completed",
        summary.outcomes.len() - failed,
        summary.outcomes.len()
    );
}

fn list_cmd(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let registry = config.load_registry()?;
    for code in registry.codes() {
        if let Some(info) = registry.get(code) {
            println!("{code:<8} {:<12} {}", info.symbol, info.name);
        }
    }
    Ok(())
}
