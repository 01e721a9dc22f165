//! Analysis reports.
//!
//! [`AnalysisReport`] is the single result of a run. It is used for:
//! - the console summary ([`print_summary`])
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag, see [`ReportWriter`])
//!
//! # Example
//!
//! ```rust,ignore
//! use food_imports::reporting::{ReportWriter, print_summary};
//!
//! let report = analysis.run(df)?;
//! print_summary(&report);
//!
//! let writer = ReportWriter::new("outputs");
//! writer.write_report_to_file(&report, "FoodImports")?;
//! ```

mod generator;

pub use generator::{AnalysisReport, ReportWriter, format_summary, print_summary};
