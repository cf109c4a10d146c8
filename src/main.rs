use anyhow::{Context, Result};
use clap::Parser;
use ringavg::config::Config;
use ringavg::util::human::{fmt_average, fmt_value};
use ringavg::util::report;
use ringavg::{input, logging, RingAverage};
use serde_json::json;
use std::io::{self, Read};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ringavg", about = "Sliding-window moving average over a stream of samples", version = "0.1")]
struct Cli {
    /// Samples to push, oldest first. Read from stdin when omitted
    #[arg(allow_negative_numbers = true)]
    values: Vec<String>,

    /// Window size (defaults to general.capacity from the config file)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Resize the window after all samples have been pushed
    #[arg(long)]
    resize: Option<usize>,

    /// Print the running average after every sample
    #[arg(short, long)]
    follow: bool,

    /// Print a JSON snapshot of the buffer and exit
    #[arg(long)]
    json: bool,

    /// Print a human-readable dump of the buffer and exit
    #[arg(long)]
    report: bool,

    /// Run the built-in grow/shrink demonstration and exit
    #[arg(long)]
    demo: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load().context("loading config")?;
    logging::init(&cfg.logging.filter)?;

    if cli.config {
        return run_print_config(&cfg);
    }
    if cli.demo {
        return run_demo(cfg.general.precision);
    }

    let capacity = cli.capacity.unwrap_or(cfg.general.capacity);
    let precision = cfg.general.precision;
    let samples = read_samples(&cli.values)?;
    info!(capacity, samples = samples.len(), "feeding samples");

    let mut avg = RingAverage::new(capacity).context("creating moving average")?;
    for v in samples {
        avg.push(v)?;
        if cli.follow {
            println!("{}\t{}", fmt_value(v, precision), fmt_average(avg.average(), precision));
        }
    }
    if let Some(n) = cli.resize {
        avg.resize(n).context("resizing moving average")?;
    }

    if cli.json {
        return run_json_snapshot(&avg);
    }
    if cli.report {
        print!("{}", report::generate(&avg, precision));
        return Ok(());
    }

    println!("count={} average={}", avg.count(), fmt_average(avg.average(), precision));
    Ok(())
}

fn read_samples(args: &[String]) -> Result<Vec<f64>> {
    if !args.is_empty() {
        return input::parse_samples(&args.join(" "));
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).context("reading samples from stdin")?;
    input::parse_samples(&text)
}

fn run_json_snapshot(avg: &RingAverage) -> Result<()> {
    let snapshot = json!({
        "timestamp":    chrono::Local::now().to_rfc3339(),
        "capacity":     avg.capacity(),
        "count":        avg.count(),
        "write_cursor": avg.write_cursor(),
        "running_sum":  avg.running_sum(),
        "average":      avg.average().ok(),
        "samples":      avg.samples().collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Fill a small window, grow it, then shrink it, dumping state after each step.
fn run_demo(precision: usize) -> Result<()> {
    let mut avg = RingAverage::new(3)?;
    for i in 0..10 {
        avg.push(f64::from(i))?;
    }
    print!("{}", report::generate(&avg, precision));

    println!("Make the buffer bigger.");
    avg.resize(20)?;
    for i in 100..110 {
        avg.push(f64::from(i))?;
    }
    println!("After making the buffer larger.");
    print!("{}", report::generate(&avg, precision));

    println!("Make the buffer smaller.");
    avg.resize(4)?;
    for i in 0..10 {
        avg.push(f64::from(i))?;
    }
    println!("After making the buffer smaller.");
    print!("{}", report::generate(&avg, precision));
    Ok(())
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[general]");
    println!("  capacity  = {}", cfg.general.capacity);
    println!("  precision = {}", cfg.general.precision);
    println!();
    println!("[logging]");
    println!("  filter    = {:?}", cfg.logging.filter);
    Ok(())
}
