//! The analysis run and its builder.

use crate::aggregations;
use crate::charts::{ChartRenderer, standard_charts};
use crate::cleaner::ImportCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::loader;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DatasetProfiler;
use crate::reporting::AnalysisReport;
use crate::types::{COMMODITY_COLUMN, COUNTRY_COLUMN, KeyTotal, VALUE_COLUMN, YEAR_COLUMN};
use chrono::Local;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// One end-to-end analysis of a food import table.
///
/// Use [`Analysis::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use food_imports::{Analysis, AnalysisConfig};
///
/// let report = Analysis::builder()
///     .config(AnalysisConfig::builder().render_charts(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run_file("FoodImports.csv")?;
/// ```
pub struct Analysis {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: ImportCleaner,
}

static_assertions::assert_impl_all!(Analysis: Send, Sync);

impl Analysis {
    pub fn builder() -> AnalysisBuilder {
        AnalysisBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load `path` and analyse it.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<AnalysisReport> {
        let path = path.as_ref();
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Loading {}", path.display()),
        ));

        let df = match loader::load_csv(path) {
            Ok(df) => df,
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis error: {}", e);
                return Err(e);
            }
        };

        let mut report = self.run(df)?;
        report.input_file = Some(path.display().to_string());
        Ok(report)
    }

    /// Analyse an already loaded DataFrame.
    ///
    /// Rows that fail cleaning are dropped, never reported as errors. An
    /// empty table after cleaning yields an empty report and no charts.
    pub fn run(&self, df: DataFrame) -> Result<AnalysisReport> {
        match self.run_internal(df) {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(report)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, df: DataFrame) -> Result<AnalysisReport> {
        let start_time = Instant::now();
        let mut report = AnalysisReport::empty();

        // ====================================================================
        // Cleaning
        // ====================================================================
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Cleaning import records...",
        ));
        let (df, cleaning) = self.cleaner.clean(df).context("During cleaning")?;
        for action in &cleaning.actions {
            debug!("Cleaning: {}", action);
        }
        report.cleaning = cleaning;

        if df.height() == 0 {
            warn!("No rows left after cleaning");
            report
                .warnings
                .push("No rows left after cleaning; nothing to aggregate".to_string());
        }

        // ====================================================================
        // Profiling
        // ====================================================================
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Profiling,
            0.0,
            "Profiling cleaned dataset...",
        ));
        report.overview = DatasetProfiler::overview(&df)
            .map_err(|e| AnalysisError::ProfilingFailed(e.to_string()))?;
        report.correlation = DatasetProfiler::correlation_matrix(&df, &[YEAR_COLUMN, VALUE_COLUMN])
            .map_err(|e| AnalysisError::ProfilingFailed(e.to_string()))?;

        // ====================================================================
        // Aggregations
        // ====================================================================
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            0.0,
            "Summing imports by year...",
        ));
        report.totals_by_year = aggregations::totals_by_year(&df)?;
        report.annual_summary = aggregations::annual_summary(&report.totals_by_year);

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            0.3,
            "Ranking commodities, countries and categories...",
        ));
        report.top_commodities = aggregations::top_commodities(&df, self.config.top_n)?;
        report.top_countries = aggregations::top_countries(&df, self.config.top_n)?;
        report.top_categories = aggregations::top_categories(&df, self.config.top_n)?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            0.6,
            "Building yearly trends...",
        ));
        let keys = |totals: Vec<KeyTotal>| -> Vec<String> {
            totals.into_iter().map(|t| t.key).collect()
        };
        let trend_countries = keys(aggregations::top_countries(&df, self.config.trend_top_n)?);
        let trend_commodities = keys(aggregations::top_commodities(&df, self.config.trend_top_n)?);
        report.country_trends =
            aggregations::yearly_trends(&df, COUNTRY_COLUMN, &trend_countries)?;
        report.commodity_trends =
            aggregations::yearly_trends(&df, COMMODITY_COLUMN, &trend_commodities)?;
        report.sentinel_trends = aggregations::sentinel_trends(&df)?;

        // ====================================================================
        // Derivations
        // ====================================================================
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Deriving,
            0.0,
            "Deriving price per unit...",
        ));
        report.price_per_unit = aggregations::price_per_unit(&df)?;
        if let Some(rows) = &report.price_per_unit {
            let undefined: BTreeSet<i64> = rows
                .iter()
                .filter(|r| r.price_per_unit.is_none())
                .map(|r| r.year)
                .collect();
            for year in undefined {
                report.warnings.push(format!(
                    "Price per unit undefined for {}: zero quantity",
                    year
                ));
            }
        }

        // ====================================================================
        // Charts
        // ====================================================================
        if self.config.render_charts {
            report.charts = self.render_charts(&report)?;
        } else {
            debug!("Chart rendering disabled");
        }

        report.generated_at = Local::now().to_rfc3339();
        report.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Analysis finished in {} ms ({} rows, {} charts)",
            report.duration_ms,
            report.cleaning.rows_after,
            report.charts.len()
        );

        Ok(report)
    }

    fn render_charts(&self, report: &AnalysisReport) -> Result<Vec<String>> {
        let renderer = ChartRenderer::new(
            self.config.output_dir.clone(),
            self.config.chart_format,
            self.config.chart_size,
        );
        let charts = standard_charts(report, &self.config);
        let total = charts.len();

        let mut written = Vec::with_capacity(total);
        for (idx, named) in charts.iter().enumerate() {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Rendering,
                idx as f32 / total.max(1) as f32,
                format!("Rendering {}...", named.name),
            ));

            let path = renderer
                .render(named.name, &named.chart)
                .map_err(|e| AnalysisError::ChartRendering {
                    chart: named.name.to_string(),
                    reason: e.to_string(),
                })?;
            written.push(path.display().to_string());
        }

        info!(
            "Wrote {} charts to {}",
            written.len(),
            renderer.output_dir().display()
        );
        Ok(written)
    }
}

/// Builder for [`Analysis`].
#[derive(Default)]
pub struct AnalysisBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl AnalysisBuilder {
    /// Use `config` instead of [`AnalysisConfig::default()`].
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Send progress updates to `reporter`.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Send progress updates to a closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the analysis.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Analysis, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Analysis {
            config,
            progress_reporter: self.progress_reporter,
            cleaner: ImportCleaner,
        })
    }
}

impl From<ConfigValidationError> for AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}
