//! Writing rendered figures to `<output>/<replicas|all>/<format>/<slug>.<format>`.

use crate::chart::ChartSpec;
use crate::plot::draw_figure;
use crate::render::{ChartBundle, Figure};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for composite figures.
pub const ALL_SCOPE: &str = "all";

/// Image formats every figure is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 2] = [ImageFormat::Svg, ImageFormat::Png];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// File name stem for a chart title: lowercase ASCII letters and spaces only,
/// spaces turned into underscores.
pub fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Create `<output>/<scope>/<format>` for `all` and every replica count.
pub fn prepare_output_dirs(output_dir: &Path, replicas: &[u32]) -> Result<()> {
    let scopes = replicas
        .iter()
        .map(u32::to_string)
        .chain(std::iter::once(ALL_SCOPE.to_string()));

    for scope in scopes {
        for format in ImageFormat::ALL {
            let dir = output_dir.join(&scope).join(format.extension());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Write the composite and per-replica figures of a bundle in every format.
/// Returns the written paths.
pub fn export_bundle(bundle: &ChartBundle, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let name = slug(bundle.spec.title());
    let mut written = Vec::new();

    let scoped = std::iter::once((ALL_SCOPE.to_string(), &bundle.composite)).chain(
        bundle
            .per_replica
            .iter()
            .map(|(count, figure)| (count.to_string(), figure)),
    );

    for (scope, figure) in scoped {
        for format in ImageFormat::ALL {
            let path = output_dir
                .join(&scope)
                .join(format.extension())
                .join(format!("{}.{}", name, format.extension()));
            write_figure(figure, &bundle.spec, &path, format)
                .with_context(|| format!("Failed to write figure: {}", path.display()))?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
    }

    Ok(written)
}

fn write_figure(figure: &Figure, spec: &ChartSpec, path: &Path, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, figure.size).into_drawing_area();
            draw_figure(&root, figure, spec)
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, figure.size).into_drawing_area();
            draw_figure(&root, figure, spec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartFamily;

    #[test]
    fn test_slug() {
        assert_eq!(slug(ChartFamily::MemoryUsage.title()), "memory_usage");
        assert_eq!(slug(ChartFamily::NetworkIo.title()), "network_io");
        assert_eq!(slug(ChartFamily::CpuPercentage.title()), "cpu_usage_");
        assert_eq!(slug(ChartFamily::MemoryPercentage.title()), "memory_usage_");
    }

    #[test]
    fn test_prepare_output_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        prepare_output_dirs(tmp.path(), &[2, 4]).unwrap();
        for scope in ["all", "2", "4"] {
            for format in ["png", "svg"] {
                assert!(tmp.path().join(scope).join(format).is_dir());
            }
        }
    }
}
