use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use rail_fleet::Fleet;
use rail_motion::ServiceClock;
use std::path::PathBuf;
use tracing::{debug, info, Level};

mod inputs;

use inputs::{load_catalog, load_config, load_field, load_routes, parse_named_path, NamedPath};

#[derive(Parser, Debug)]
#[command(
    name = "rail-sim",
    author,
    version,
    about = "Run a rail field headless and print train positions over time",
    long_about = "Loads a field document, its route CSVs and locomotive definitions, builds \
                  every unit's coach tracks and prints the head-coach position of the \
                  selected train at each step of a time window.\n\n\
                  Times are timetable timestamps (<day>T<HH>:<MM>:<SS>) in the field's \
                  timezone; printed times are seconds from midnight UTC of --date."
)]
struct Args {
    /// Field document (JSON)
    #[arg(short, long)]
    field: PathBuf,

    /// Route CSV as <lineid>_<route>=PATH (repeatable)
    #[arg(short, long = "route", value_parser = parse_named_path)]
    routes: Vec<NamedPath>,

    /// Locomotive definition as NAME=PATH (repeatable)
    #[arg(short, long = "locomotive", value_parser = parse_named_path)]
    locomotives: Vec<NamedPath>,

    /// Host settings (JSON); missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service day, YYYY-MM-DD (default: today, UTC)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Train id, or "all"
    #[arg(short, long, default_value = "all")]
    train: String,

    /// Start of the window
    #[arg(long, default_value = "0T00:00:00")]
    from: String,

    /// End of the window (inclusive)
    #[arg(long, default_value = "0T23:59:59")]
    to: String,

    /// Seconds between printed positions
    #[arg(short, long, default_value = "60")]
    step: f64,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if args.step.is_nan() || args.step <= 0.0 {
        bail!("--step must be positive, got {}", args.step);
    }

    let field = load_field(&args.field)?;
    let config = load_config(args.config.as_deref())?;
    let routes = load_routes(&args.routes)?;
    let catalog = load_catalog(&args.locomotives)?;

    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let clock = field.clock(date).context("Invalid field timezone")?;
    info!(
        field = %field.description,
        timezone = %field.timezone,
        utc_shift_min = clock.timezone_minutes(),
        date = %clock.base_date(),
        routes = routes.len(),
        locomotives = catalog.len(),
        "Loading field"
    );

    let mut fleet = Fleet::from_field(&field, &routes, &catalog, &clock, config).context("Failed to build fleet")?;
    for skipped in fleet.skipped() {
        info!(train = %skipped.train_id, "Skipped: {}", skipped.reason);
    }
    if fleet.is_empty() {
        bail!("No unit could be set up");
    }

    let start = seconds(&clock, &args.from)?;
    let span = clock
        .duration_seconds_between(&args.to, &args.from)
        .with_context(|| format!("Invalid time `{}`", args.to))?;
    if span < 0.0 {
        bail!("--to ({}) is before --from ({})", args.to, args.from);
    }

    let steps = (span / args.step).floor() as u64;
    for i in 0..=steps {
        let time_s = start + i as f64 * args.step;
        if let Some(frame) = fleet.update(time_s) {
            let running = frame
                .units
                .iter()
                .filter(|unit| unit.coaches.iter().any(|coach| coach.motion.is_running()))
                .count();
            debug!(time_s, running, "Frame");
        }
        println!("{time_s:.0} {}", fleet.train_position(&args.train, time_s));
    }

    Ok(())
}

fn seconds(clock: &ServiceClock, timestamp: &str) -> Result<f64> {
    clock
        .duration_seconds_from_base(timestamp)
        .with_context(|| format!("Invalid time `{timestamp}`"))
}
