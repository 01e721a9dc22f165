//! Drawing [`Chart`]s with plotters.

use super::{BarPalette, Chart, LinePlot};
use crate::config::ChartFormat;
use crate::types::{CorrelationMatrix, KeyTotal};
use anyhow::{Result, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FONT: &str = "sans-serif";

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];
const COOLWARM: [(u8, u8, u8); 3] = [(59, 76, 192), (221, 221, 221), (180, 4, 38)];

/// Writes charts as image files into one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    format: ChartFormat,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, format: ChartFormat, size: (u32, u32)) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            size,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the chart called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, self.format.extension()))
    }

    /// Render `chart` to `<output_dir>/<name>.<ext>` and return the path.
    pub fn render(&self, name: &str, chart: &Chart) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(name);
        let size = match chart {
            Chart::Heatmap { .. } => heatmap_size(self.size),
            _ => self.size,
        };

        match self.format {
            ChartFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                draw(&root, chart)?;
                root.present()?;
            }
            ChartFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                draw(&root, chart)?;
                root.present()?;
            }
        }

        debug!("Chart written: {}", path.display());
        Ok(path)
    }
}

fn heatmap_size((width, height): (u32, u32)) -> (u32, u32) {
    let side = width.min(height);
    (side, side)
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, chart: &Chart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match chart {
        Chart::Line {
            title,
            x_desc,
            y_desc,
            series,
        } => draw_lines(root, title, x_desc, y_desc, series),
        Chart::HorizontalBar {
            title,
            x_desc,
            bars,
            palette,
        } => draw_bars(root, title, x_desc, bars, *palette),
        Chart::Heatmap { title, matrix } => draw_heatmap(root, title, matrix),
    }
}

fn draw_lines<DB>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[LinePlot],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points: Vec<(f64, f64)> = series.iter().flat_map(|s| s.points.iter().copied()).collect();
    if points.is_empty() {
        bail!("no data points to plot");
    }

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0), 0.5);
    let (y_min, y_max) = value_axis(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;

    for (idx, line) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            line.points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
        )?;
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

fn draw_bars<DB>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    bars: &[KeyTotal],
    palette: BarPalette,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if bars.is_empty() {
        bail!("no bars to plot");
    }

    let n = bars.len();
    let (x_min, x_max) = value_axis(bars.iter().map(|b| b.value));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(10)
        .build_cartesian_2d(x_min..x_max, 0f64..n as f64)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(x_desc)
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|_: &f64| String::new())
        .draw()?;

    let stops: &[(u8, u8, u8)] = match palette {
        BarPalette::Viridis => &VIRIDIS,
        BarPalette::Coolwarm => &COOLWARM,
    };

    // Rank 0 sits at the top.
    chart.draw_series(bars.iter().enumerate().map(|(rank, bar)| {
        let top = (n - rank) as f64;
        let t = if n > 1 { rank as f64 / (n - 1) as f64 } else { 0.0 };
        Rectangle::new(
            [(0.0, top - 0.85), (bar.value, top - 0.15)],
            interpolate(stops, t).filled(),
        )
    }))?;

    chart.draw_series(bars.iter().enumerate().map(|(rank, bar)| {
        let top = (n - rank) as f64;
        Text::new(
            format!("{} ({:.1})", bar.key, bar.value),
            (x_min.max(0.0) + (x_max - x_min) * 0.01, top - 0.4),
            (FONT, 14).into_font(),
        )
    }))?;

    Ok(())
}

fn draw_heatmap<DB>(root: &DrawingArea<DB, Shift>, title: &str, matrix: &CorrelationMatrix) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = matrix.labels.len();
    if n == 0 {
        bail!("empty correlation matrix");
    }
    let size = n as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .build_cartesian_2d(-1.5f64..size, 0f64..size + 0.6)?;

    let cells: Vec<(usize, usize, f64)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| (i, j, matrix.values[i][j]))
        .collect();

    chart.draw_series(cells.iter().map(|&(i, j, v)| {
        let color = if v.is_nan() {
            RGBColor(200, 200, 200)
        } else {
            interpolate(&COOLWARM, (v + 1.0) / 2.0)
        };
        let (x, y) = (j as f64, size - 1.0 - i as f64);
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled())
    }))?;

    chart.draw_series(cells.iter().map(|&(i, j, v)| {
        let text = if v.is_nan() {
            "n/a".to_string()
        } else {
            format!("{:.2}", v)
        };
        Text::new(
            text,
            (j as f64 + 0.4, size - 0.55 - i as f64),
            (FONT, 18).into_font(),
        )
    }))?;

    chart.draw_series(matrix.labels.iter().enumerate().map(|(i, label)| {
        Text::new(label.clone(), (-1.45, size - 0.55 - i as f64), (FONT, 16).into_font())
    }))?;
    chart.draw_series(matrix.labels.iter().enumerate().map(|(j, label)| {
        Text::new(label.clone(), (j as f64 + 0.1, size + 0.45), (FONT, 16).into_font())
    }))?;

    Ok(())
}

/// Min/max of `values` widened by `pad` on each side.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (min - pad, max + pad)
}

/// Axis for summed values: always includes zero, with 10% headroom.
fn value_axis(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if max - min > 0.0 { max - min } else { 1.0 };
    let lower = if min < 0.0 { min - span * 0.1 } else { 0.0 };
    (lower, max + span * 0.1)
}

/// Piecewise-linear colour ramp; `t` is clamped to 0..=1.
fn interpolate(stops: &[(u8, u8, u8)], t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    if stops.len() == 1 {
        let (r, g, b) = stops[0];
        return RGBColor(r, g, b);
    }

    let scaled = t * (stops.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let local = scaled - idx as f64;
    let (r0, g0, b0) = stops[idx];
    let (r1, g1, b1) = stops[idx + 1];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * local).round() as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}
