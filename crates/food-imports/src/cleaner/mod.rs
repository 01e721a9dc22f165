//! Data cleaning for import records.
//!
//! Cleaning never fails on bad rows. It drops them and counts them:
//! - Column names are trimmed
//! - Rows with a missing (or non-numeric) `Value` are dropped
//! - Rows whose `Year Number` is not a plain digit string are dropped, and
//!   the column becomes `Int64`
//!
//! Missing required columns are the only error path.

mod sanitizers;

use crate::error::{AnalysisError, Result};
use crate::types::{CleaningSummary, REQUIRED_COLUMNS, VALUE_COLUMN, YEAR_COLUMN};
use polars::prelude::*;
use tracing::{debug, info};

pub(crate) use sanitizers::parse_year;

/// Cleaner for raw import DataFrames.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportCleaner;

impl ImportCleaner {
    /// Run every cleaning step in order.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut df = df;
        let mut summary = CleaningSummary {
            rows_before: df.height(),
            ..Default::default()
        };

        info!("Cleaning {} rows...", df.height());

        let renamed = trim_column_names(&mut df)?;
        if renamed > 0 {
            summary
                .actions
                .push(format!("Trimmed whitespace from {} column names", renamed));
        }

        ensure_required_columns(&df)?;

        let before = df.height();
        df = drop_missing_values(df)?;
        summary.rows_missing_value = before - df.height();
        summary.actions.push(if summary.rows_missing_value > 0 {
            format!(
                "Removed {} rows with missing '{}'",
                summary.rows_missing_value, VALUE_COLUMN
            )
        } else {
            format!("No rows with missing '{}' found", VALUE_COLUMN)
        });

        let before = df.height();
        df = filter_numeric_years(df)?;
        summary.rows_invalid_year = before - df.height();
        summary.actions.push(if summary.rows_invalid_year > 0 {
            format!(
                "Removed {} rows with non-numeric '{}'",
                summary.rows_invalid_year, YEAR_COLUMN
            )
        } else {
            format!("All '{}' values are numeric", YEAR_COLUMN)
        });

        summary.rows_after = df.height();
        debug!(
            "Cleaning removed {} of {} rows",
            summary.rows_removed(),
            summary.rows_before
        );

        Ok((df, summary))
    }
}

/// Strip surrounding whitespace from every column name.
pub fn trim_column_names(df: &mut DataFrame) -> Result<usize> {
    Ok(sanitizers::trim_column_names(df)?)
}

/// Fail with [`AnalysisError::ColumnNotFound`] if a required column is absent.
pub fn ensure_required_columns(df: &DataFrame) -> Result<()> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(AnalysisError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// Drop rows whose `Value` is null, NaN or not numeric.
///
/// The column is coerced to `Float64`; text that does not parse becomes null
/// and is dropped with the rest.
pub fn drop_missing_values(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let values = df
        .column(VALUE_COLUMN)
        .map_err(|_| AnalysisError::ColumnNotFound(VALUE_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let keep: Vec<bool> = values
        .f64()?
        .into_iter()
        .map(sanitizers::is_usable_value)
        .collect();

    df.replace(VALUE_COLUMN, values)?;
    let mask = Series::new("keep".into(), keep);
    Ok(df.filter(mask.bool()?)?)
}

/// Keep rows whose `Year Number` is a plain digit string and coerce it to `Int64`.
pub fn filter_numeric_years(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let as_text = df
        .column(YEAR_COLUMN)
        .map_err(|_| AnalysisError::ColumnNotFound(YEAR_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let years: Vec<Option<i64>> = as_text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_year))
        .collect();
    let keep: Vec<bool> = years.iter().map(Option::is_some).collect();

    df.replace(YEAR_COLUMN, Series::new(YEAR_COLUMN.into(), years))?;
    let mask = Series::new("keep".into(), keep);
    Ok(df.filter(mask.bool()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CATEGORY_COLUMN, COMMODITY_COLUMN, COUNTRY_COLUMN};
    use pretty_assertions::assert_eq;

    fn raw_frame() -> DataFrame {
        df!(
            "Year Number " => &[Some("2019"), Some("2020"), Some("Total"), Some("2021"), Some("2021.5")],
            " Value" => &[Some(10.0f64), None, Some(5.0), Some(7.5), Some(1.0)],
            COMMODITY_COLUMN => &["Apples", "Apples", "Apples", "Pears", "Pears"],
            COUNTRY_COLUMN => &["Mexico", "Mexico", "Chile", "Chile", "Chile"],
            CATEGORY_COLUMN => &["Fruits", "Fruits", "Fruits", "Fruits", "Fruits"],
        )
        .unwrap()
    }

    #[test]
    fn test_clean_drops_bad_rows() {
        let (df, summary) = ImportCleaner.clean(raw_frame()).unwrap();

        assert_eq!(summary.rows_before, 5);
        assert_eq!(summary.rows_missing_value, 1);
        assert_eq!(summary.rows_invalid_year, 2);
        assert_eq!(summary.rows_after, 2);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_clean_coerces_types() {
        let (df, _) = ImportCleaner.clean(raw_frame()).unwrap();

        let years = df.column(YEAR_COLUMN).unwrap();
        assert_eq!(years.dtype(), &DataType::Int64);
        assert_eq!(years.null_count(), 0);
        let years: Vec<i64> = years
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(years, vec![2019, 2021]);

        let values = df.column(VALUE_COLUMN).unwrap();
        assert_eq!(values.dtype(), &DataType::Float64);
        assert_eq!(values.null_count(), 0);
    }

    #[test]
    fn test_integer_year_column_is_kept() {
        let df = df!(
            YEAR_COLUMN => &[2020i64, 2021],
            VALUE_COLUMN => &[1.0f64, 2.0],
            COMMODITY_COLUMN => &["A", "B"],
            COUNTRY_COLUMN => &["X", "Y"],
            CATEGORY_COLUMN => &["C", "C"],
        )
        .unwrap();

        let (df, summary) = ImportCleaner.clean(df).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(summary.rows_invalid_year, 0);
    }

    #[test]
    fn test_negative_years_are_dropped() {
        let df = df!(
            YEAR_COLUMN => &[-1i64, 2021],
            VALUE_COLUMN => &[1.0f64, 2.0],
            COMMODITY_COLUMN => &["A", "B"],
            COUNTRY_COLUMN => &["X", "Y"],
            CATEGORY_COLUMN => &["C", "C"],
        )
        .unwrap();

        let (df, _) = ImportCleaner.clean(df).unwrap();
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_non_numeric_value_text_is_dropped() {
        let df = df!(
            YEAR_COLUMN => &["2020", "2020", "2020"],
            VALUE_COLUMN => &["12.5", "n/a", ""],
            COMMODITY_COLUMN => &["A", "B", "C"],
            COUNTRY_COLUMN => &["X", "Y", "Z"],
            CATEGORY_COLUMN => &["C", "C", "C"],
        )
        .unwrap();

        let (df, summary) = ImportCleaner.clean(df).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(summary.rows_missing_value, 2);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = df!(
            YEAR_COLUMN => &["2020"],
            VALUE_COLUMN => &[1.0f64],
        )
        .unwrap();

        let err = ImportCleaner.clean(df).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(ref c) if c == COMMODITY_COLUMN));
    }

    #[test]
    fn test_actions_are_recorded() {
        let (_, summary) = ImportCleaner.clean(raw_frame()).unwrap();
        assert_eq!(summary.actions.len(), 3);
        assert!(summary.actions[0].contains("Trimmed whitespace from 2 column names"));
    }
}
