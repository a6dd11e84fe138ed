//! resplot - chart container resource usage across replica-count runs.

use anyhow::Result;
use clap::Parser;
use resplot::config::{self, Config, DEFAULT_DURATION_SECS, DEFAULT_LOGS_DIR, DEFAULT_OUTPUT_DIR};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

/// Analyze container resource consumption
#[derive(Parser, Debug)]
#[command(name = "resplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Containers to analyze as a JSON object of '{"NAME": "CONTAINER ID"}'
    containers: String,

    /// Directory where the logs are stored
    #[arg(short, long, default_value = DEFAULT_LOGS_DIR)]
    logs_dir: PathBuf,

    /// Directory where the output images will be saved
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum value for the x-axis, usually the experiment duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DURATION_SECS)]
    x_limit: u32,
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let containers = config::parse_container_mapping(&args.containers)?;
    let config = Config::new(containers, args.logs_dir, args.output_dir, args.x_limit)?;

    let report = resplot::run(&config)?;

    info!(
        "Generated {} images in {} ({} blank panels per figure)",
        report.files.len(),
        config.output_dir.display(),
        report.missing.len()
    );

    Ok(())
}
