//! CLI entry point for the food import analysis.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use food_imports::reporting::print_summary;
use food_imports::{Analysis, AnalysisConfig, ChartFormat, ReportWriter};
use std::path::Path;
use tracing::{debug, info};

/// CLI-compatible chart format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartFormat {
    /// Scalable vector graphics
    Svg,
    /// Raster PNG
    Png,
}

impl From<CliChartFormat> for ChartFormat {
    fn from(cli: CliChartFormat) -> Self {
        match cli {
            CliChartFormat::Svg => ChartFormat::Svg,
            CliChartFormat::Png => ChartFormat::Png,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "U.S. Food Import Analysis",
    long_about = "Cleans the U.S. food imports dataset, prints summary statistics and \
                  renders charts.\n\n\
                  EXAMPLES:\n  \
                  # Analyse FoodImports.csv in the current directory\n  \
                  food-imports\n\n  \
                  # PNG charts into a custom directory\n  \
                  food-imports -i data/FoodImports.csv -o charts/ --format png\n\n  \
                  # JSON only, no charts\n  \
                  food-imports --no-charts --json"
)]
struct Args {
    /// Path to the CSV file to analyse
    #[arg(short, long, default_value = "FoodImports.csv")]
    input: String,

    /// Output directory for charts and reports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Number of entries in the top commodities/countries/categories rankings
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Number of countries and commodities in the trend charts
    #[arg(long, default_value = "5")]
    trend_top_n: usize,

    /// Image format for charts
    #[arg(long, value_enum, default_value = "svg")]
    format: CliChartFormat,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the summary)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalysisConfig::builder()
        .output_dir(&args.output)
        .top_n(args.top_n)
        .trend_top_n(args.trend_top_n)
        .chart_format(args.format.into())
        .render_charts(!args.no_charts)
        .build()?;

    let analysis = Analysis::builder()
        .config(config)
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    let report = analysis.run_file(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let writer = ReportWriter::new(&args.output);
        let report_path = writer.write_report_to_file(&report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    print_summary(&report);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
