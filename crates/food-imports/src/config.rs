//! Configuration for an analysis run.
//!
//! Use [`AnalysisConfig::builder()`] for a validated configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Image format used for rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartFormat {
    /// Scalable vector graphics
    #[default]
    Svg,
    /// Raster PNG
    Png,
}

impl ChartFormat {
    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Configuration for the analysis pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use food_imports::config::{AnalysisConfig, ChartFormat};
///
/// let config = AnalysisConfig::builder()
///     .top_n(10)
///     .chart_format(ChartFormat::Png)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of entries in the top commodities/countries/categories rankings.
    /// Default: 10
    pub top_n: usize,

    /// Number of countries and commodities plotted in the yearly trend charts.
    /// Default: 5
    pub trend_top_n: usize,

    /// Directory where charts and reports are written.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Whether to render charts at all.
    /// Default: true
    pub render_charts: bool,

    /// Image format for charts.
    /// Default: Svg
    pub chart_format: ChartFormat,

    /// Chart size in pixels (width, height).
    /// Default: (1200, 600)
    pub chart_size: (u32, u32),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            trend_top_n: 5,
            output_dir: PathBuf::from("outputs"),
            render_charts: true,
            chart_format: ChartFormat::default(),
            chart_size: (1200, 600),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "top_n".to_string(),
                value: self.top_n,
            });
        }

        if self.trend_top_n == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "trend_top_n".to_string(),
                value: self.trend_top_n,
            });
        }

        let (width, height) = self.chart_size;
        if width < 200 || height < 150 {
            return Err(ConfigValidationError::ChartTooSmall { width, height });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },

    #[error("Chart size {width}x{height} is too small (minimum 200x150)")]
    ChartTooSmall { width: u32, height: u32 },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    top_n: Option<usize>,
    trend_top_n: Option<usize>,
    output_dir: Option<PathBuf>,
    render_charts: Option<bool>,
    chart_format: Option<ChartFormat>,
    chart_size: Option<(u32, u32)>,
}

impl AnalysisConfigBuilder {
    /// Set the size of the top-N rankings.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set how many countries/commodities the trend charts follow.
    pub fn trend_top_n(mut self, n: usize) -> Self {
        self.trend_top_n = Some(n);
        self
    }

    /// Set the output directory for charts and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable chart rendering.
    ///
    /// When disabled the pipeline performs no file I/O at all.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the chart image format.
    pub fn chart_format(mut self, format: ChartFormat) -> Self {
        self.chart_format = Some(format);
        self
    }

    /// Set the chart size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            top_n: self.top_n.unwrap_or(defaults.top_n),
            trend_top_n: self.trend_top_n.unwrap_or(defaults.trend_top_n),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            chart_format: self.chart_format.unwrap_or_default(),
            chart_size: self.chart_size.unwrap_or(defaults.chart_size),
        };

        config.validate()?;
        Ok(config)
    }
}
