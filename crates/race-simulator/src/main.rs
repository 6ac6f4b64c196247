//! Race Analyzer CLI
//!
//! Loads or simulates race results, runs one analysis and prints the
//! leaderboard to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use race_analytics::{AnalysisKind, AnalysisRequest, AnalyticsEngine, RankMetric};
use race_domain::{ResultSet, SeasonWindow};
use race_simulator::{Config, LogFormat, SeasonSimulator, SimulatorConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "race-analyzer")]
#[command(about = "Rank drivers and constructors over a range of seasons")]
struct Args {
    /// Analysis: drivers, constructors, team-adjusted, contribution-adjusted
    #[arg(short, long, default_value = "drivers")]
    analysis: AnalysisKind,

    /// First season to analyse (default: RACE_YEAR_MIN)
    #[arg(long)]
    year_min: Option<i32>,

    /// Last season to analyse (default: RACE_YEAR_MAX)
    #[arg(long)]
    year_max: Option<i32>,

    /// Sort metric, defaults to the analysis' own
    #[arg(short, long)]
    metric: Option<RankMetric>,

    /// Leaderboard length (default: RACE_TOP_N)
    #[arg(short, long)]
    top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Results fixture to load instead of simulating
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the loaded or simulated results to this path
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Simulation seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// First simulated season
    #[arg(long, default_value = "2020")]
    first_season: i32,

    /// Last simulated season
    #[arg(long, default_value = "2024")]
    last_season: i32,

    /// Simulated constructors, two drivers each
    #[arg(long, default_value = "10")]
    teams: u32,

    /// Simulated races per season
    #[arg(long, default_value = "22")]
    races: usize,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config);

    let args = Args::parse();

    let results = match &args.input {
        Some(path) => race_simulator::read_results(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => simulate(&args)?,
    };

    if let Some(path) = &args.dump {
        race_simulator::write_results(&results, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let window = SeasonWindow::new(
        args.year_min.unwrap_or(config.year_min),
        args.year_max.unwrap_or(config.year_max),
    )?;
    let mut request = AnalysisRequest::new(args.analysis, window)
        .with_top_n(args.top.unwrap_or(config.top_n));
    if let Some(metric) = args.metric {
        request = request.with_metric(metric);
    }

    info!(
        analysis = %request.kind,
        window = %window,
        metric = %request.metric(),
        "Running analysis"
    );

    let engine = AnalyticsEngine::new(results);
    let report = engine.generate_report(&request)?;
    let output = match args.format {
        OutputFormat::Markdown => report.to_markdown(),
        OutputFormat::Json => report.to_json()?,
    };
    println!("{output}");

    Ok(())
}

fn simulate(args: &Args) -> Result<ResultSet> {
    let seasons = SeasonWindow::new(args.first_season, args.last_season)?;
    info!(seed = args.seed, seasons = %seasons, "Simulating results");

    let config = SimulatorConfig {
        teams: args.teams,
        races_per_season: args.races,
        ..SimulatorConfig::default()
    };
    Ok(SeasonSimulator::new(args.seed, config)?.simulate(&seasons)?)
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
