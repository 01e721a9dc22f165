//! Dataset profiling: overview numbers and the correlation matrix.

mod statistics;

pub use statistics::pearson;

use crate::types::{
    CATEGORY_COLUMN, COMMODITY_COLUMN, COUNTRY_COLUMN, CorrelationMatrix, DatasetOverview,
    VALUE_COLUMN, YEAR_COLUMN,
};
use anyhow::{Result, anyhow};
use polars::prelude::*;
use tracing::debug;

/// Profiler for cleaned import tables.
pub struct DatasetProfiler;

impl DatasetProfiler {
    /// Shape, year range, cardinalities and `Value` statistics.
    ///
    /// Columns that are absent count as zero distinct values.
    pub fn overview(df: &DataFrame) -> Result<DatasetOverview> {
        let year_range = match df.column(YEAR_COLUMN) {
            Ok(column) => {
                let years = column.as_materialized_series().cast(&DataType::Int64)?;
                let years = years.i64()?;
                years.min().zip(years.max())
            }
            Err(_) => None,
        };

        let value_stats = match df.column(VALUE_COLUMN) {
            Ok(column) => statistics::value_statistics(column.as_materialized_series())?,
            Err(_) => None,
        };

        let overview = DatasetOverview {
            rows: df.height(),
            columns: df.width(),
            year_range,
            distinct_commodities: distinct_count(df, COMMODITY_COLUMN)?,
            distinct_countries: distinct_count(df, COUNTRY_COLUMN)?,
            distinct_categories: distinct_count(df, CATEGORY_COLUMN)?,
            value_stats,
        };

        debug!("Dataset overview: {:?}", overview);
        Ok(overview)
    }

    /// Pairwise Pearson correlation between numeric columns.
    ///
    /// The diagonal is 1.0; pairs that are undefined (too few rows, zero
    /// variance) are NaN.
    pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
        for name in columns {
            df.column(name)
                .map_err(|_| anyhow!("Column '{}' not found in dataset", name))?;
        }

        let size = columns.len();
        let mut values = vec![vec![f64::NAN; size]; size];
        for i in 0..size {
            values[i][i] = 1.0;
            for j in (i + 1)..size {
                let r = pearson(df, columns[i], columns[j])?.unwrap_or(f64::NAN);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix {
            labels: columns.iter().map(|c| c.to_string()).collect(),
            values,
        })
    }
}

fn distinct_count(df: &DataFrame, name: &str) -> Result<usize> {
    match df.column(name) {
        Ok(column) => Ok(column.as_materialized_series().drop_nulls().n_unique()?),
        Err(_) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            YEAR_COLUMN => &[2018i64, 2019, 2020, 2021],
            VALUE_COLUMN => &[10.0f64, 20.0, 30.0, 40.0],
            COMMODITY_COLUMN => &["Apples", "Apples", "Pears", "Plums"],
            COUNTRY_COLUMN => &["Mexico", "Chile", "Chile", "WORLD"],
            CATEGORY_COLUMN => &["Fruits", "Fruits", "Fruits", "Fruits"],
        )
        .unwrap()
    }

    #[test]
    fn test_overview() {
        let overview = DatasetProfiler::overview(&sample()).unwrap();
        assert_eq!(overview.rows, 4);
        assert_eq!(overview.columns, 5);
        assert_eq!(overview.year_range, Some((2018, 2021)));
        assert_eq!(overview.distinct_commodities, 3);
        assert_eq!(overview.distinct_countries, 3);
        assert_eq!(overview.distinct_categories, 1);
        assert_eq!(overview.value_stats.unwrap().mean, 25.0);
    }

    #[test]
    fn test_overview_empty() {
        let overview = DatasetProfiler::overview(&sample().head(Some(0))).unwrap();
        assert_eq!(overview.rows, 0);
        assert_eq!(overview.year_range, None);
        assert!(overview.value_stats.is_none());
    }

    #[test]
    fn test_correlation_matrix() {
        let matrix =
            DatasetProfiler::correlation_matrix(&sample(), &[YEAR_COLUMN, VALUE_COLUMN]).unwrap();

        assert_eq!(matrix.labels, vec![YEAR_COLUMN, VALUE_COLUMN]);
        assert_eq!(matrix.values[0][0], 1.0);
        assert_eq!(matrix.values[1][1], 1.0);
        let r = matrix.get(YEAR_COLUMN, VALUE_COLUMN).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
    }

    #[test]
    fn test_correlation_undefined_is_nan() {
        let df = df!(
            YEAR_COLUMN => &[2020i64, 2020, 2020],
            VALUE_COLUMN => &[1.0f64, 2.0, 3.0],
        )
        .unwrap();

        let matrix = DatasetProfiler::correlation_matrix(&df, &[YEAR_COLUMN, VALUE_COLUMN]).unwrap();
        assert!(matrix.values[0][1].is_nan());
    }

    #[test]
    fn test_correlation_missing_column() {
        assert!(DatasetProfiler::correlation_matrix(&sample(), &["Nope"]).is_err());
    }
}
