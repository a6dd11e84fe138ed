//! Chart families and their axis bounds.

use crate::error::PlanError;
use crate::stats::{Datasets, SnapshotRow};
use crate::units::{closest_power_of_2, format_general, from_bits};

/// Network values are plotted in megabytes.
const NETWORK_SCALE: f64 = 8e6;

/// One of the four fixed metrics, each plotted as its own set of figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFamily {
    MemoryUsage,
    NetworkIo,
    CpuPercentage,
    MemoryPercentage,
}

impl ChartFamily {
    pub const ALL: [ChartFamily; 4] = [
        ChartFamily::MemoryUsage,
        ChartFamily::NetworkIo,
        ChartFamily::CpuPercentage,
        ChartFamily::MemoryPercentage,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartFamily::MemoryUsage => "Memory Usage",
            ChartFamily::NetworkIo => "Network I/O",
            ChartFamily::CpuPercentage => "CPU Usage %",
            ChartFamily::MemoryPercentage => "Memory Usage %",
        }
    }

    /// Legend labels. Empty for single-series families, which draw no legend.
    pub fn series_labels(self) -> &'static [&'static str] {
        match self {
            ChartFamily::NetworkIo => &["input (MB)", "output (MB)"],
            _ => &[],
        }
    }

    pub fn series_count(self) -> usize {
        self.series_labels().len().max(1)
    }

    /// Plotted value of one series for a row, after the family's transform.
    pub fn value(self, row: &SnapshotRow, series: usize) -> f64 {
        match (self, series) {
            (ChartFamily::MemoryUsage, _) => row.mem_usage_bits as f64,
            (ChartFamily::NetworkIo, 0) => row.net_input_bits as f64 / NETWORK_SCALE,
            (ChartFamily::NetworkIo, _) => row.net_output_bits as f64 / NETWORK_SCALE,
            (ChartFamily::CpuPercentage, _) => row.cpu_percentage,
            (ChartFamily::MemoryPercentage, _) => row.mem_percentage,
        }
    }

    /// Largest plotted value of a row across the family's series.
    fn row_max(self, row: &SnapshotRow) -> f64 {
        (0..self.series_count())
            .map(|series| self.value(row, series))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn y_lower(self) -> f64 {
        match self {
            ChartFamily::MemoryUsage => 0.0,
            ChartFamily::NetworkIo => -0.5,
            ChartFamily::CpuPercentage => -1.0,
            ChartFamily::MemoryPercentage => 0.15,
        }
    }

    /// Y-axis tick label.
    pub fn format_tick(self, value: f64) -> String {
        match self {
            ChartFamily::MemoryUsage => from_bits(value.max(0.0) as u64),
            ChartFamily::NetworkIo => format_general(value),
            ChartFamily::CpuPercentage => format!("{}%", value.trunc() as i64),
            ChartFamily::MemoryPercentage => {
                format!("{:.2}%", (value * 100.0).trunc() / 100.0)
            }
        }
    }
}

/// What to plot for one family and the axis bounds shared by all its panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub family: ChartFamily,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl ChartSpec {
    pub fn title(&self) -> &'static str {
        self.family.title()
    }
}

/// Build one spec per family from the maxima over the requested containers.
///
/// Datasets where none of the containers appear are skipped. If no dataset
/// has a row for any of them the run cannot be scaled and fails.
pub fn plan_charts(
    datasets: &Datasets,
    containers: &[&str],
    duration_secs: u32,
) -> Result<Vec<ChartSpec>, PlanError> {
    let rows: Vec<&SnapshotRow> = datasets
        .values()
        .flat_map(|dataset| dataset.rows.iter())
        .filter(|row| containers.contains(&row.container.as_str()))
        .collect();

    if rows.is_empty() {
        return Err(PlanError::NoData(
            containers.iter().map(|c| c.to_string()).collect(),
        ));
    }

    let specs = ChartFamily::ALL
        .into_iter()
        .map(|family| {
            let max = rows
                .iter()
                .map(|row| family.row_max(row))
                .fold(f64::NEG_INFINITY, f64::max);
            // An all-zero family still gets a unit-high axis.
            let y_upper = closest_power_of_2(max).unwrap_or(1.0);
            ChartSpec {
                family,
                x_range: (0.0, duration_secs as f64),
                y_range: (family.y_lower(), y_upper),
            }
        })
        .collect();

    Ok(specs)
}
