//! Comparative container resource-usage charts.
//!
//! Reads one `docker stats` dump per replica count, scales four chart
//! families (memory usage, network I/O, CPU %, memory %) over the requested
//! containers and writes each family as PNG and SVG, both as a composite
//! containers x replicas grid and as one figure per replica count.

pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod plot;
pub mod render;
pub mod stats;
pub mod units;

use anyhow::{Context, Result};
use config::Config;
use render::MissingSeries;
use std::path::PathBuf;
use tracing::info;

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Every image written.
    pub files: Vec<PathBuf>,
    /// (container, replica count) pairs left blank.
    pub missing: Vec<MissingSeries>,
}

/// Load, plan, render and export.
pub fn run(config: &Config) -> Result<RunReport> {
    let datasets = stats::load_datasets(&config.logs_dir)
        .with_context(|| format!("Failed to load logs from {}", config.logs_dir.display()))?;
    info!(
        "Loaded {} datasets from {}",
        datasets.len(),
        config.logs_dir.display()
    );

    let specs = chart::plan_charts(&datasets, &config.container_names(), config.duration_secs)?;

    let replicas: Vec<u32> = datasets.keys().copied().collect();
    export::prepare_output_dirs(&config.output_dir, &replicas)?;

    let bundles = render::render_charts(specs, &datasets, &config.containers, config.duration_secs);

    let mut report = RunReport::default();
    if let Some(first) = bundles.first() {
        report.missing = first.missing.clone();
    }
    for bundle in &bundles {
        let written = export::export_bundle(bundle, &config.output_dir)?;
        info!("Exported {} ({} files)", bundle.spec.title(), written.len());
        report.files.extend(written);
    }

    Ok(report)
}
