//! rebar-optimize - CLI tool to optimize cutting a rebar schedule from stock bars.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rebar_cut_optimizer::config::{
    ReportConfig, DEFAULT_STOCK_LENGTH, DEFAULT_TRIALS, DEFAULT_WASTE_PRECISION,
    MAX_WASTE_PRECISION, STANDARD_DIAMETERS,
};
use rebar_cut_optimizer::{optimize_schedule, parse_schedule, Optimizer, Report};

/// Optimize cutting of rebar pieces from fixed-length stock bars.
///
/// The schedule file has one `diameter,length,quantity` line per required piece length,
/// with diameters in millimeters and lengths in the same unit as the stock length.
#[derive(Parser, Debug)]
#[command(name = "rebar-optimize")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Schedule file path
    schedule: PathBuf,

    /// Length of the stock bars
    #[arg(short, long, default_value_t = DEFAULT_STOCK_LENGTH)]
    stock_length: f64,

    /// Number of randomized passes per diameter
    #[arg(short, long, default_value_t = DEFAULT_TRIALS)]
    trials: usize,

    /// Random seed, for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Material lost at each cut between two pieces
    #[arg(long, default_value_t = 0.0)]
    cut_width: f64,

    /// Steel price per metric ton, used for costs
    #[arg(short, long)]
    price_per_ton: Option<f64>,

    /// Stop searching each diameter after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Decimal places used to group offcut lengths
    #[arg(long, default_value_t = DEFAULT_WASTE_PRECISION,
          value_parser = clap::value_parser!(u32).range(0..=MAX_WASTE_PRECISION as i64))]
    waste_precision: u32,

    /// Print the report and solutions as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Reading: {}", args.schedule.display());

    let text = std::fs::read_to_string(&args.schedule)
        .with_context(|| format!("Failed to read {}", args.schedule.display()))?;
    let schedule = parse_schedule(&text)
        .with_context(|| format!("Failed to parse {}", args.schedule.display()))?;

    for diameter in schedule.keys() {
        if !STANDARD_DIAMETERS.contains(diameter) {
            warn!("Diameter {} mm is not a standard bar size", diameter);
        }
    }

    let mut optimizer = Optimizer::new();
    optimizer
        .set_stock_length(args.stock_length)
        .set_trials(args.trials)
        .set_cut_width(args.cut_width);
    if let Some(seed) = args.seed {
        optimizer.set_random_seed(seed);
    }
    if let Some(seconds) = args.time_limit {
        let time_limit = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("Invalid time limit {seconds}"))?;
        optimizer.set_time_limit(time_limit);
    }

    let solutions = optimize_schedule(&optimizer, &schedule).context("Optimization failed")?;

    for (diameter, solution) in &solutions {
        if solution.stopped_early {
            warn!(
                "Diameter {} mm stopped after {} of {} trials",
                diameter, solution.trials_run, args.trials
            );
        }
    }

    let mut report_config = ReportConfig::default().with_waste_precision(args.waste_precision);
    if let Some(price) = args.price_per_ton {
        report_config = report_config.with_price_per_ton(price);
    }
    let report = Report::build(&solutions, &report_config);

    if args.json {
        let json = serde_json::json!({
            "report": report,
            "solutions": solutions,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{report}");
    }

    info!("Optimized {} diameter(s)", solutions.len());

    Ok(())
}
