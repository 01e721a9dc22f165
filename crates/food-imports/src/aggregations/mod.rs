//! Group-by-and-reduce aggregations over a cleaned import table.
//!
//! Every aggregation sums `Value` over a fixed key. Rows whose key is null
//! are left out of the groups. Rankings break ties on the key so the output
//! is deterministic.

mod price;

pub use price::{TOTAL_IMPORT_VALUE, TOTAL_QUANTITY, mean_price_by_year, price_per_unit};

use crate::error::{AnalysisError, Result};
use crate::types::{
    AnnualSummary, CATEGORY_COLUMN, COMMODITY_COLUMN, COUNTRY_COLUMN, KeyTotal, SentinelCountry,
    TrendSeries, VALUE_COLUMN, YEAR_COLUMN, YearTotal,
};
use polars::prelude::*;
use tracing::debug;

/// Sum of `Value` per year, ascending by year.
pub fn totals_by_year(df: &DataFrame) -> Result<Vec<YearTotal>> {
    let grouped = grouped_sums(df, YEAR_COLUMN)?;

    let years = grouped
        .column(YEAR_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let values = grouped
        .column(VALUE_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let mut totals: Vec<YearTotal> = years
        .i64()?
        .into_iter()
        .zip(values.f64()?.into_iter())
        .filter_map(|(year, value)| {
            Some(YearTotal {
                year: year?,
                value: value.unwrap_or(0.0),
            })
        })
        .collect();

    totals.sort_by_key(|t| t.year);
    Ok(totals)
}

/// Mean, max and min over yearly totals. `None` when there are no years.
pub fn annual_summary(totals: &[YearTotal]) -> Option<AnnualSummary> {
    if totals.is_empty() {
        return None;
    }

    let sum: f64 = totals.iter().map(|t| t.value).sum();
    let max = totals
        .iter()
        .map(|t| t.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = totals.iter().map(|t| t.value).fold(f64::INFINITY, f64::min);

    Some(AnnualSummary {
        mean: sum / totals.len() as f64,
        max,
        min,
        years: totals.len(),
    })
}

/// Sum of `Value` per distinct key of `column`, largest first, at most `n` entries.
///
/// Keys listed in `exclude` are removed before ranking.
pub fn top_n_by(df: &DataFrame, column: &str, n: usize, exclude: &[&str]) -> Result<Vec<KeyTotal>> {
    let grouped = grouped_sums(df, column)?;

    let keys = grouped
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = grouped
        .column(VALUE_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let mut totals: Vec<KeyTotal> = keys
        .str()?
        .into_iter()
        .zip(values.f64()?.into_iter())
        .filter_map(|(key, value)| {
            let key = key?;
            if exclude.contains(&key) {
                return None;
            }
            Some(KeyTotal {
                key: key.to_string(),
                value: value.unwrap_or(0.0),
            })
        })
        .collect();

    totals.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.key.cmp(&b.key))
    });
    totals.truncate(n);

    debug!("Top {} by '{}': {} entries", n, column, totals.len());
    Ok(totals)
}

/// Commodities with the largest total import value.
pub fn top_commodities(df: &DataFrame, n: usize) -> Result<Vec<KeyTotal>> {
    top_n_by(df, COMMODITY_COLUMN, n, &[])
}

/// Trading partners with the largest total import value, sentinel aggregates excluded.
pub fn top_countries(df: &DataFrame, n: usize) -> Result<Vec<KeyTotal>> {
    let sentinels = SentinelCountry::ALL.map(|s| s.as_str());
    top_n_by(df, COUNTRY_COLUMN, n, &sentinels)
}

/// Food categories with the largest total import value.
pub fn top_categories(df: &DataFrame, n: usize) -> Result<Vec<KeyTotal>> {
    top_n_by(df, CATEGORY_COLUMN, n, &[])
}

/// Per-year totals for each of `keys`, in the order given.
pub fn yearly_trends(df: &DataFrame, column: &str, keys: &[String]) -> Result<Vec<TrendSeries>> {
    keys.iter()
        .map(|key| {
            let subset = rows_where(df, column, key)?;
            Ok(TrendSeries {
                key: key.clone(),
                points: totals_by_year(&subset)?,
            })
        })
        .collect()
}

/// Per-year totals for `WORLD`, `WORLD (Quantity)` and `REST OF WORLD`.
///
/// A sentinel that never occurs yields an empty series.
pub fn sentinel_trends(df: &DataFrame) -> Result<Vec<TrendSeries>> {
    let keys: Vec<String> = SentinelCountry::ALL
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    yearly_trends(df, COUNTRY_COLUMN, &keys)
}

/// Rows whose `column` equals `value`.
pub fn rows_where(df: &DataFrame, column: &str, value: &str) -> Result<DataFrame> {
    require_column(df, column)?;
    Ok(df
        .clone()
        .lazy()
        .filter(col(column).eq(lit(value)))
        .collect()?)
}

fn grouped_sums(df: &DataFrame, key: &str) -> Result<DataFrame> {
    require_column(df, key)?;
    require_column(df, VALUE_COLUMN)?;

    Ok(df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([col(VALUE_COLUMN).sum()])
        .collect()?)
}

fn require_column(df: &DataFrame, name: &str) -> Result<()> {
    if df.column(name).is_err() {
        return Err(AnalysisError::ColumnNotFound(name.to_string()));
    }
    Ok(())
}
