//! Layout of figures: which series land on which panel.
//!
//! Figures are plain values here; drawing them onto an image backend is
//! done by [`crate::plot`] when they are exported.

use crate::chart::ChartSpec;
use crate::config::Container;
use crate::stats::{Datasets, SnapshotRow};
use std::collections::BTreeMap;
use tracing::warn;

/// Pixels per composite-figure column.
const COMPOSITE_COLUMN_WIDTH: u32 = 300;
const FIGURE_HEIGHT: u32 = 800;
const REPLICA_FIGURE_WIDTH: u32 = 400;

/// One line on a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry, `None` for single-series families.
    pub label: Option<&'static str>,
    /// `(seconds, value)` pairs in time order.
    pub points: Vec<(f64, f64)>,
}

/// A single plot axis inside a figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    pub column_title: Option<String>,
    pub row_label: Option<String>,
    pub series: Vec<Series>,
}

/// A grid of panels stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    /// Width and height in pixels.
    pub size: (u32, u32),
    pub panels: Vec<Panel>,
}

impl Figure {
    fn new(title: String, rows: usize, cols: usize, size: (u32, u32)) -> Self {
        Self {
            title,
            rows,
            cols,
            size,
            panels: vec![Panel::default(); rows * cols],
        }
    }

    pub fn panel(&self, row: usize, col: usize) -> &Panel {
        &self.panels[row * self.cols + col]
    }

    fn panel_mut(&mut self, row: usize, col: usize) -> &mut Panel {
        &mut self.panels[row * self.cols + col]
    }
}

/// A container that has no rows in one replica-count dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSeries {
    pub container: String,
    pub replicas: u32,
}

/// Everything drawn for one chart family.
#[derive(Debug, Clone)]
pub struct ChartBundle {
    pub spec: ChartSpec,
    /// Containers x replica counts.
    pub composite: Figure,
    /// Containers x 1, keyed by replica count.
    pub per_replica: BTreeMap<u32, Figure>,
    /// Panels left blank because their container was absent.
    pub missing: Vec<MissingSeries>,
}

impl ChartBundle {
    fn new(spec: ChartSpec, containers: &[Container], replicas: &[u32]) -> Self {
        let title = spec.title();
        let rows = containers.len();

        let mut composite = Figure::new(
            title.to_string(),
            rows,
            replicas.len(),
            (COMPOSITE_COLUMN_WIDTH * replicas.len() as u32, FIGURE_HEIGHT),
        );
        for (col, count) in replicas.iter().enumerate() {
            composite.panel_mut(0, col).column_title = Some(format!("{count} replicas"));
        }
        for (row, container) in containers.iter().enumerate() {
            composite.panel_mut(row, 0).row_label = Some(container.display_name.clone());
        }

        let per_replica = replicas
            .iter()
            .map(|&count| {
                let mut figure = Figure::new(
                    format!("{title} - {count} replicas"),
                    rows,
                    1,
                    (REPLICA_FIGURE_WIDTH, FIGURE_HEIGHT),
                );
                for (row, container) in containers.iter().enumerate() {
                    figure.panel_mut(row, 0).row_label = Some(container.display_name.clone());
                }
                (count, figure)
            })
            .collect();

        Self {
            spec,
            composite,
            per_replica,
            missing: Vec::new(),
        }
    }

    fn plot(&mut self, row: usize, col: usize, replicas: u32, times: &[f64], data: &[&SnapshotRow]) {
        let family = self.spec.family;
        let labels = family.series_labels();

        let series: Vec<Series> = (0..family.series_count())
            .map(|idx| Series {
                label: labels.get(idx).copied(),
                points: times
                    .iter()
                    .zip(data)
                    .map(|(t, row)| (*t, family.value(row, idx)))
                    .collect(),
            })
            .collect();

        if let Some(figure) = self.per_replica.get_mut(&replicas) {
            figure.panel_mut(row, 0).series = series.clone();
        }
        self.composite.panel_mut(row, col).series = series;
    }
}

/// Lay out every spec across all containers and replica counts.
///
/// A container absent from a dataset is logged and its panels stay empty.
pub fn render_charts(
    specs: Vec<ChartSpec>,
    datasets: &Datasets,
    containers: &[Container],
    duration_secs: u32,
) -> Vec<ChartBundle> {
    let replicas: Vec<u32> = datasets.keys().copied().collect();
    let mut bundles: Vec<ChartBundle> = specs
        .into_iter()
        .map(|spec| ChartBundle::new(spec, containers, &replicas))
        .collect();

    for (row, container) in containers.iter().enumerate() {
        for (col, (&count, dataset)) in datasets.iter().enumerate() {
            let data: Vec<&SnapshotRow> = dataset.rows_for(&container.name).collect();

            if data.is_empty() {
                warn!("Container {} not found in {} replicas", container.name, count);
                for bundle in &mut bundles {
                    bundle.missing.push(MissingSeries {
                        container: container.name.clone(),
                        replicas: count,
                    });
                }
                continue;
            }

            let times = sample_times(data.len(), duration_secs);
            for bundle in &mut bundles {
                bundle.plot(row, col, count, &times, &data);
            }
        }
    }

    bundles
}

/// Evenly spaced sample offsets in seconds: `duration / samples`, rounded
/// half to even, per step.
pub fn sample_times(samples: usize, duration_secs: u32) -> Vec<f64> {
    if samples == 0 {
        return Vec::new();
    }
    let step = (duration_secs as f64 / samples as f64).round_ties_even();
    (0..samples).map(|i| step * i as f64).collect()
}
