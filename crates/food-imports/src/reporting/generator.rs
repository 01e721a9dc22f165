use crate::types::{
    AnnualSummary, CleaningSummary, CorrelationMatrix, DatasetOverview, KeyTotal, PricePerUnit,
    TrendSeries, YearTotal,
};
use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report type
// ============================================================================

/// Everything one analysis run computed.
///
/// Serialized as-is for `--json` and `--emit-report`. Undefined correlation
/// coefficients serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file, when the data came from a file
    pub input_file: Option<String>,
    /// Wall-clock time of the run in milliseconds
    pub duration_ms: u64,

    // Data
    pub overview: DatasetOverview,
    pub cleaning: CleaningSummary,

    // Aggregations
    /// `None` when no rows survived cleaning
    pub annual_summary: Option<AnnualSummary>,
    pub totals_by_year: Vec<YearTotal>,
    pub top_commodities: Vec<KeyTotal>,
    pub top_countries: Vec<KeyTotal>,
    pub top_categories: Vec<KeyTotal>,
    pub country_trends: Vec<TrendSeries>,
    pub commodity_trends: Vec<TrendSeries>,
    pub sentinel_trends: Vec<TrendSeries>,
    pub correlation: CorrelationMatrix,
    /// `None` when the dataset has no `WORLD (Quantity)` rows
    pub price_per_unit: Option<Vec<PricePerUnit>>,

    // Output
    /// Paths of the chart files written
    pub charts: Vec<String>,
    /// Non-fatal problems hit during the run
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// A report with no data, stamped with the current time.
    pub fn empty() -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            input_file: None,
            duration_ms: 0,
            overview: DatasetOverview {
                rows: 0,
                columns: 0,
                year_range: None,
                distinct_commodities: 0,
                distinct_countries: 0,
                distinct_categories: 0,
                value_stats: None,
            },
            cleaning: CleaningSummary::default(),
            annual_summary: None,
            totals_by_year: Vec::new(),
            top_commodities: Vec::new(),
            top_countries: Vec::new(),
            top_categories: Vec::new(),
            country_trends: Vec::new(),
            commodity_trends: Vec::new(),
            sentinel_trends: Vec::new(),
            correlation: CorrelationMatrix {
                labels: Vec::new(),
                values: Vec::new(),
            },
            price_per_unit: None,
            charts: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

// ============================================================================
// Console summary
// ============================================================================

/// Human-readable summary of `report`.
///
/// Starts with the mean annual, maximum and minimum import lines, followed by the
/// rankings and the price-per-unit table when present.
pub fn format_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    match &report.annual_summary {
        Some(summary) => {
            let _ = writeln!(out, "Mean annual import value: ${:.2} million", summary.mean);
            let _ = writeln!(out, "Maximum import value: ${:.2} million", summary.max);
            let _ = writeln!(out, "Minimum import value: ${:.2} million", summary.min);
        }
        None => {
            let _ = writeln!(out, "No import rows left after cleaning.");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "DATASET");
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(
        out,
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        report.cleaning.rows_before,
        report.cleaning.rows_after,
        report.cleaning.rows_removed(),
        report.cleaning.rows_removed_percentage()
    );
    if let Some((first, last)) = report.overview.year_range {
        let _ = writeln!(out, "  Years: {} - {}", first, last);
    }
    let _ = writeln!(
        out,
        "  Distinct commodities / countries / categories: {} / {} / {}",
        report.overview.distinct_commodities,
        report.overview.distinct_countries,
        report.overview.distinct_categories
    );

    write_ranking(&mut out, "TOP COMMODITIES", &report.top_commodities);
    write_ranking(&mut out, "TOP COUNTRIES", &report.top_countries);
    write_ranking(&mut out, "TOP CATEGORIES", &report.top_categories);

    if let Some(rows) = &report.price_per_unit {
        let _ = writeln!(out);
        let _ = writeln!(out, "PRICE PER UNIT");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for row in rows {
            match row.price_per_unit {
                Some(price) => {
                    let _ = writeln!(out, "  {}: {:.4}", row.year, price);
                }
                None => {
                    let _ = writeln!(out, "  {}: n/a (zero quantity)", row.year);
                }
            }
        }
    }

    if !report.charts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "CHARTS");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for chart in &report.charts {
            let _ = writeln!(out, "  - {}", chart);
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "WARNINGS");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for warning in &report.warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }

    let _ = writeln!(out, "{}", "=".repeat(60));
    out
}

fn write_ranking(out: &mut String, heading: &str, totals: &[KeyTotal]) {
    if totals.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading);
    let _ = writeln!(out, "{}", "-".repeat(40));
    for (rank, total) in totals.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<40} {:>14.2}", rank + 1, total.key, total.value);
    }
}

/// Print [`format_summary`] to stdout.
///
/// Note: uses `print!` intentionally; this is user-facing CLI output and the
/// summary already ends with a newline.
pub fn print_summary(report: &AnalysisReport) {
    print!("{}", format_summary(report));
}

// ============================================================================
// Report files
// ============================================================================

/// Writes JSON reports into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `report` to `<output_dir>/<report_base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_summary() -> AnalysisReport {
        let mut report = AnalysisReport::empty();
        report.annual_summary = Some(AnnualSummary {
            mean: 1234.5678,
            max: 2000.0,
            min: 500.25,
            years: 3,
        });
        report.top_countries = vec![KeyTotal {
            key: "Mexico".to_string(),
            value: 150.0,
        }];
        report
    }

    #[test]
    fn test_summary_lines() {
        let text = format_summary(&report_with_summary());
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Mean annual import value: $1234.57 million"));
        assert_eq!(lines.next(), Some("Maximum import value: $2000.00 million"));
        assert_eq!(lines.next(), Some("Minimum import value: $500.25 million"));
        assert!(text.contains("TOP COUNTRIES"));
        assert!(text.contains("Mexico"));
        assert!(!text.contains("TOP COMMODITIES"));
    }

    #[test]
    fn test_summary_without_data() {
        let text = format_summary(&AnalysisReport::empty());
        assert!(text.starts_with("No import rows left after cleaning."));
    }

    #[test]
    fn test_summary_price_rows() {
        let mut report = report_with_summary();
        report.price_per_unit = Some(vec![PricePerUnit {
            year: 2020,
            total_import_value: 10.0,
            total_quantity: 0.0,
            price_per_unit: None,
        }]);
        let text = format_summary(&report);
        assert!(text.contains("2020: n/a (zero quantity)"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());

        let path = writer
            .write_report_to_file(&report_with_summary(), "FoodImports")
            .unwrap();

        assert_eq!(path, dir.path().join("FoodImports_report.json"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["annual_summary"]["years"], 3);
        assert_eq!(json["top_countries"][0]["key"], "Mexico");
    }

    #[test]
    fn test_nan_correlation_serializes_as_null() {
        let mut report = AnalysisReport::empty();
        report.correlation = CorrelationMatrix {
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["correlation"]["values"][0][1].is_null());
    }

    #[test]
    fn test_report_with_nan_correlation_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = report_with_summary();
        report.correlation = CorrelationMatrix {
            labels: vec!["Year Number".to_string(), "Value".to_string()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]],
        };

        let path = ReportWriter::new(dir.path())
            .write_report_to_file(&report, "FoodImports")
            .unwrap();
        let read: AnalysisReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(read.correlation.labels, report.correlation.labels);
        assert_eq!(read.correlation.values[0][0], 1.0);
        assert!(read.correlation.values[0][1].is_nan());
        assert_eq!(read.annual_summary, report.annual_summary);
    }
}
