//! Drawing of laid-out figures onto a plotters backend.

use crate::chart::ChartSpec;
use crate::render::{Figure, Panel};
use crate::units::format_general;
use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::sync::OnceLock;

/// Family every text element is drawn with.
const FONT_FAMILY: &str = "sans-serif";

/// Bundled so text renders the same on hosts without any installed fonts.
static SANS_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const LINE_WIDTH: u32 = 3;

/// Grey plotting background with white grid lines.
const PANEL_BACKGROUND: RGBColor = RGBColor(229, 229, 229);

const PALETTE: [RGBColor; 2] = [RGBColor(226, 74, 51), RGBColor(52, 138, 189)];

/// Register the bundled font under [`FONT_FAMILY`]. Safe to call repeatedly.
pub fn register_fonts() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered =
        *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, SANS_FONT).is_ok());
    if registered {
        Ok(())
    } else {
        Err(anyhow!("bundled font could not be loaded"))
    }
}

/// Draw a figure onto `root` and flush it.
pub fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure, spec: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    register_fonts()?;
    root.fill(&WHITE)?;
    let body = root.titled(&figure.title, (FONT_FAMILY, 24))?;

    let areas = body.split_evenly((figure.rows, figure.cols));
    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        draw_panel(area, panel, spec)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel, spec: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_min, x_max) = spec.x_range;
    let (y_min, y_max) = spec.y_range;

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(8)
        .margin_right(16)
        .x_label_area_size(30)
        .y_label_area_size(if panel.row_label.is_some() { 75 } else { 60 });
    if let Some(ref title) = panel.column_title {
        builder.caption(title, (FONT_FAMILY, 18));
    }
    let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.plotting_area().fill(&PANEL_BACKGROUND)?;

    let family = spec.family;
    let tick_formatter = |v: &f64| family.format_tick(*v);
    let seconds_formatter = |v: &f64| format_general(*v);

    let mut mesh = chart.configure_mesh();
    mesh.bold_line_style(WHITE)
        .light_line_style(WHITE.mix(0.4))
        .x_labels(5)
        .y_labels(5)
        .label_style((FONT_FAMILY, 12))
        .x_label_formatter(&seconds_formatter)
        .y_label_formatter(&tick_formatter);
    if let Some(ref label) = panel.row_label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;

    for (idx, series) in panel.series.iter().enumerate() {
        let style = PALETTE[idx % PALETTE.len()].stroke_width(LINE_WIDTH);
        let drawn = chart.draw_series(LineSeries::new(series.points.iter().copied(), style))?;
        if let Some(label) = series.label {
            drawn
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    if panel.series.iter().any(|s| s.label.is_some()) {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT_FAMILY, 12))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartFamily, ChartSpec};
    use crate::render::Series;

    fn cpu_figure() -> (Figure, ChartSpec) {
        let spec = ChartSpec {
            family: ChartFamily::CpuPercentage,
            x_range: (0.0, 60.0),
            y_range: (-1.0, 64.0),
        };
        let figure = Figure {
            title: "CPU Usage %".to_string(),
            rows: 1,
            cols: 1,
            size: (400, 300),
            panels: vec![Panel {
                column_title: Some("2 replicas".to_string()),
                row_label: Some("Web".to_string()),
                series: vec![Series {
                    label: None,
                    points: vec![(0.0, 10.0), (30.0, 40.0)],
                }],
            }],
        };
        (figure, spec)
    }

    #[test]
    fn test_svg_text_and_whole_second_ticks() {
        let (figure, spec) = cpu_figure();
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, figure.size).into_drawing_area();
            draw_figure(&root, &figure, &spec).unwrap();
        }
        assert!(svg.contains("CPU Usage %"));
        assert!(svg.contains("2 replicas"));
        // x ticks are whole seconds: "0", never "0.0"
        assert!(svg.contains(">0\n"));
        assert!(!svg.contains(".0\n"));
    }

    #[test]
    fn test_bitmap_draws_title_text_with_bundled_font() {
        let (figure, spec) = cpu_figure();
        let (width, height) = figure.size;
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, figure.size).into_drawing_area();
            draw_figure(&root, &figure, &spec).unwrap();
        }
        // The title band is white apart from the title glyphs.
        let title_band = &buffer[..(width * 20 * 3) as usize];
        assert!(title_band.iter().any(|&b| b < 128));
    }

    #[test]
    fn test_register_fonts_is_repeatable() {
        register_fonts().unwrap();
        register_fonts().unwrap();
    }
}
