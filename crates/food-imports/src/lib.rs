//! U.S. Food Import Analysis Library
//!
//! Exploratory analysis of the U.S. food imports dataset, built on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV loading with fallbacks for sloppy exports
//! - **Cleaning**: Header trimming, dropping rows with missing values or non-numeric years
//! - **Aggregations**: Yearly totals, top commodities/countries/categories, yearly trends
//! - **Derivations**: Price per unit from the `WORLD` and `WORLD (Quantity)` aggregates
//! - **Profiling**: Dataset overview and correlation matrix
//! - **Charts**: SVG or PNG charts rendered with plotters
//! - **Reporting**: Console summary and JSON reports
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use food_imports::{Analysis, AnalysisConfig, ChartFormat};
//! use food_imports::reporting::print_summary;
//!
//! let config = AnalysisConfig::builder()
//!     .output_dir("outputs")
//!     .chart_format(ChartFormat::Png)
//!     .build()?;
//!
//! let report = Analysis::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run_file("FoodImports.csv")?;
//!
//! print_summary(&report);
//! ```
//!
//! # Using the building blocks directly
//!
//! Every step is also available on its own:
//!
//! ```rust,ignore
//! use food_imports::{ImportCleaner, aggregations, loader};
//!
//! let df = loader::load_csv("FoodImports.csv")?;
//! let (df, summary) = ImportCleaner.clean(df)?;
//! let totals = aggregations::totals_by_year(&df)?;
//! let top = aggregations::top_countries(&df, 10)?;
//! ```

pub mod aggregations;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;

// Re-exports for convenient access
pub use cleaner::ImportCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ChartFormat, ConfigValidationError};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use pipeline::{
    Analysis, AnalysisBuilder, AnalysisStage, ClosureProgressReporter, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::DatasetProfiler;
pub use reporting::{AnalysisReport, ReportWriter};
pub use types::{
    AnnualSummary, CleaningSummary, CorrelationMatrix, DatasetOverview, KeyTotal, PricePerUnit,
    SentinelCountry, TrendSeries, ValueStatistics, YearTotal,
};
