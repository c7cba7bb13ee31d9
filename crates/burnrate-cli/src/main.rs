#![forbid(unsafe_code)]

mod cmd;
mod output;

use burnrate_core::config::{EffectiveConfig, resolve_config};
use burnrate_core::error::ErrorCode;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use cmd::CommandContext;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "burnrate: release burndown forecasting",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format (overrides FORMAT and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project snapshot to read (defaults to `[snapshot] path` in
    /// `.burnrate/config.toml`).
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Forecast as of this day instead of the local date.
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Forecast a release",
        long_about = "Remaining work, weighted velocity, excess at the deadline and the predicted completion date.",
        after_help = "EXAMPLES:\n    # Forecast story points as of today\n    burnrate forecast r1\n\n    # Estimated days with the daily projection\n    burnrate forecast r1 --quantity estimated_days --projection"
    )]
    Forecast(cmd::forecast::ForecastArgs),

    #[command(
        about = "Show the normalized daily history",
        after_help = "EXAMPLES:\n    burnrate history r1 --json"
    )]
    History(cmd::history::HistoryArgs),

    #[command(about = "Show the weighted velocity")]
    Velocity(cmd::velocity::VelocityArgs),

    #[command(
        about = "Classify the remaining backlog by risk",
        after_help = "EXAMPLES:\n    # Widen the medium band to 30% of capacity\n    burnrate risk r1 --risk-factor 0.3"
    )]
    Risk(cmd::risk::RiskArgs),

    #[command(about = "Generate shell completion scripts")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BURNRATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "burnrate=debug,info"
        } else {
            "burnrate=info,warn"
        })
    });

    let format = env::var("BURNRATE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Output mode to report a config failure in, before config is known.
fn fallback_mode(cli: &Cli) -> OutputMode {
    cli.format
        .unwrap_or(if cli.json { OutputMode::Json } else { OutputMode::Text })
}

fn load_config(cli: &Cli, project_root: &std::path::Path) -> anyhow::Result<EffectiveConfig> {
    match resolve_config(project_root, cli.json) {
        Ok(config) => Ok(config),
        Err(e) => {
            render_error(
                fallback_mode(cli),
                &CliError::with_details(
                    format!("{e:#}"),
                    ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                    ErrorCode::ConfigParseError.code(),
                ),
            )?;
            Err(e)
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = load_config(&cli, &project_root)?;
    let ctx = CommandContext {
        output: resolve_output_mode(cli.format, &config.resolved_output),
        config: config.project,
        project_root,
        snapshot: cli.snapshot,
        today: cli.today,
    };

    match cli.command {
        Commands::Forecast(ref args) => cmd::forecast::run_forecast(args, &ctx),
        Commands::History(ref args) => cmd::history::run_history(args, &ctx),
        Commands::Velocity(ref args) => cmd::velocity::run_velocity(args, &ctx),
        Commands::Risk(ref args) => cmd::risk::run_risk(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
