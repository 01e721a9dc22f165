//! Chart definitions for an analysis report.
//!
//! [`standard_charts`] turns a finished [`AnalysisReport`] into the set of
//! charts the analysis produces; [`ChartRenderer`] draws them to files.
//! Building the chart list does no I/O, so it can be inspected on its own.

mod render;

pub use render::ChartRenderer;

use crate::aggregations;
use crate::config::AnalysisConfig;
use crate::reporting::AnalysisReport;
use crate::types::{CorrelationMatrix, KeyTotal, TrendSeries, YearTotal};
use tracing::warn;

const YEAR_AXIS: &str = "Year";
const VALUE_AXIS: &str = "Total Import Value (Million $)";

/// Colour ramp for bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarPalette {
    Viridis,
    Coolwarm,
}

/// One labelled line of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl LinePlot {
    pub fn from_totals(label: impl Into<String>, totals: &[YearTotal]) -> Self {
        Self {
            label: label.into(),
            points: totals.iter().map(|t| (t.year as f64, t.value)).collect(),
        }
    }

    pub fn from_trend(trend: &TrendSeries) -> Self {
        Self::from_totals(trend.key.clone(), &trend.points)
    }
}

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Line {
        title: String,
        x_desc: String,
        y_desc: String,
        series: Vec<LinePlot>,
    },
    /// Ranked bars, first entry on top.
    HorizontalBar {
        title: String,
        x_desc: String,
        bars: Vec<KeyTotal>,
        palette: BarPalette,
    },
    /// Annotated correlation heatmap.
    Heatmap {
        title: String,
        matrix: CorrelationMatrix,
    },
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Self::Line { title, .. } | Self::HorizontalBar { title, .. } | Self::Heatmap { title, .. } => {
                title
            }
        }
    }

    /// True when the chart has nothing to plot.
    ///
    /// A heatmap needs at least one finite coefficient off the diagonal.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Line { series, .. } => series.iter().all(|s| s.points.is_empty()),
            Self::HorizontalBar { bars, .. } => bars.is_empty(),
            Self::Heatmap { matrix, .. } => !matrix.values.iter().enumerate().any(|(i, row)| {
                row.iter()
                    .enumerate()
                    .any(|(j, value)| i != j && value.is_finite())
            }),
        }
    }
}

/// A chart together with the file stem it is written under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedChart {
    pub name: &'static str,
    pub chart: Chart,
}

/// The charts for `report`, in output order.
///
/// Charts with no data are left out with a warning. The price-per-unit
/// chart only appears when the report has price-per-unit rows and plots
/// the mean price of each year.
pub fn standard_charts(report: &AnalysisReport, config: &AnalysisConfig) -> Vec<NamedChart> {
    let mut candidates = vec![
        NamedChart {
            name: "total_imports_over_years",
            chart: Chart::Line {
                title: "Total U.S. Food Imports Over the Years".to_string(),
                x_desc: YEAR_AXIS.to_string(),
                y_desc: VALUE_AXIS.to_string(),
                series: vec![LinePlot::from_totals("Total", &report.totals_by_year)],
            },
        },
        NamedChart {
            name: "top_commodities",
            chart: Chart::HorizontalBar {
                title: format!("Top {} Imported Commodities by Value", config.top_n),
                x_desc: VALUE_AXIS.to_string(),
                bars: report.top_commodities.clone(),
                palette: BarPalette::Viridis,
            },
        },
        NamedChart {
            name: "top_countries",
            chart: Chart::HorizontalBar {
                title: format!(
                    "Top {} Countries Contributing to U.S. Food Imports",
                    config.top_n
                ),
                x_desc: VALUE_AXIS.to_string(),
                bars: report.top_countries.clone(),
                palette: BarPalette::Coolwarm,
            },
        },
        NamedChart {
            name: "top_categories",
            chart: Chart::HorizontalBar {
                title: format!(
                    "Top {} Most Profitable Food Categories by Import Value",
                    config.top_n
                ),
                x_desc: VALUE_AXIS.to_string(),
                bars: report.top_categories.clone(),
                palette: BarPalette::Coolwarm,
            },
        },
        NamedChart {
            name: "correlation_heatmap",
            chart: Chart::Heatmap {
                title: "Correlation Analysis of Variables".to_string(),
                matrix: report.correlation.clone(),
            },
        },
        NamedChart {
            name: "top_country_trends",
            chart: Chart::Line {
                title: format!("Yearly Import Trends for Top {} Countries", config.trend_top_n),
                x_desc: YEAR_AXIS.to_string(),
                y_desc: VALUE_AXIS.to_string(),
                series: report.country_trends.iter().map(LinePlot::from_trend).collect(),
            },
        },
        NamedChart {
            name: "top_commodity_trends",
            chart: Chart::Line {
                title: format!("Yearly Trends for Top {} Commodities", config.trend_top_n),
                x_desc: YEAR_AXIS.to_string(),
                y_desc: VALUE_AXIS.to_string(),
                series: report.commodity_trends.iter().map(LinePlot::from_trend).collect(),
            },
        },
    ];

    if let Some(rows) = &report.price_per_unit {
        candidates.push(NamedChart {
            name: "price_per_unit",
            chart: Chart::Line {
                title: "Trend of Price per Unit for Imported Food Products".to_string(),
                x_desc: YEAR_AXIS.to_string(),
                y_desc: "Price per Unit ($ per unit)".to_string(),
                series: vec![LinePlot {
                    label: "Price per Unit".to_string(),
                    points: aggregations::mean_price_by_year(rows)
                        .into_iter()
                        .map(|(year, price)| (year as f64, price))
                        .collect(),
                }],
            },
        });
    }

    candidates.push(NamedChart {
        name: "sentinel_trends",
        chart: Chart::Line {
            title: "Import Trends: WORLD vs WORLD (Quantity) vs REST OF WORLD".to_string(),
            x_desc: YEAR_AXIS.to_string(),
            y_desc: VALUE_AXIS.to_string(),
            series: report.sentinel_trends.iter().map(LinePlot::from_trend).collect(),
        },
    });

    candidates
        .into_iter()
        .filter(|named| {
            if named.chart.is_empty() {
                warn!("Skipping chart '{}': no data", named.name);
                false
            } else {
                true
            }
        })
        .collect()
}
