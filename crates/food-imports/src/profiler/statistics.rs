//! Descriptive statistics and correlation for numeric columns.

use crate::types::ValueStatistics;
use anyhow::Result;
use polars::prelude::*;

/// Mean, sample standard deviation, extremes and skewness of a numeric series.
///
/// Nulls and NaNs are ignored. Returns `None` when nothing is left.
pub(crate) fn value_statistics(series: &Series) -> Result<Option<ValueStatistics>> {
    let float_series = series.cast(&DataType::Float64)?.drop_nulls();
    let floats = float_series.f64()?;
    let values = floats.filter(&floats.is_not_nan())?;

    if values.is_empty() {
        return Ok(None);
    }

    let series = values.clone().into_series();
    Ok(Some(ValueStatistics {
        count: values.len(),
        mean: series.mean().unwrap_or(0.0),
        std: calculate_std(&series)?,
        min: values.min().unwrap_or(f64::NAN),
        max: values.max().unwrap_or(f64::NAN),
        skewness: calculate_skewness(&series)?,
    }))
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn calculate_std(series: &Series) -> Result<f64> {
    let mean = series.mean().unwrap_or(0.0);
    let n = series.len() as f64;

    if n <= 1.0 {
        return Ok(0.0);
    }

    let float_series = series.f64()?;
    let variance: f64 = float_series
        .into_iter()
        .filter_map(|v| v.map(|val| (val - mean).powi(2)))
        .sum::<f64>()
        / (n - 1.0);

    Ok(variance.sqrt())
}

pub(crate) fn calculate_skewness(series: &Series) -> Result<f64> {
    let mean = series.mean().unwrap_or(0.0);
    let std = calculate_std(series)?;

    if std == 0.0 {
        return Ok(0.0);
    }

    let n = series.len() as f64;
    let skew_sum: f64 = series
        .f64()?
        .into_iter()
        .filter_map(|v| v.map(|val| ((val - mean) / std).powi(3)))
        .sum();

    Ok(skew_sum / n)
}

/// Pearson correlation between two columns of `df`.
///
/// Rows with a missing or NaN side are skipped. `None` when the coefficient
/// is undefined (fewer than two pairs, or a side with zero variance).
pub fn pearson(df: &DataFrame, x: &str, y: &str) -> Result<Option<f64>> {
    let out = df
        .clone()
        .lazy()
        .select([
            col(x).cast(DataType::Float64).alias("x"),
            col(y).cast(DataType::Float64).alias("y"),
        ])
        .filter(
            col("x")
                .is_not_null()
                .and(col("y").is_not_null())
                .and(col("x").is_not_nan())
                .and(col("y").is_not_nan()),
        )
        .select([pearson_corr(col("x"), col("y")).alias("r")])
        .collect()?;

    let r = out
        .column("r")?
        .as_materialized_series()
        .cast(&DataType::Float64)?
        .f64()?
        .get(0);

    Ok(r.filter(|r| r.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f64]) -> Series {
        Series::new("val".into(), values)
    }

    fn pairs(x: &[Option<f64>], y: &[Option<f64>]) -> DataFrame {
        df!("x" => x, "y" => y).unwrap()
    }

    // ==================== calculate_std tests ====================

    #[test]
    fn test_calculate_std_basic() {
        // Variance = 10 / 4 = 2.5
        let std = calculate_std(&floats(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_std_degenerate() {
        assert_eq!(calculate_std(&floats(&[5.0])).unwrap(), 0.0);
        assert_eq!(calculate_std(&floats(&[])).unwrap(), 0.0);
        assert_eq!(calculate_std(&floats(&[5.0, 5.0, 5.0])).unwrap(), 0.0);
    }

    // ==================== calculate_skewness tests ====================

    #[test]
    fn test_calculate_skewness_symmetric() {
        let skew = calculate_skewness(&floats(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert!(skew.abs() < 1e-9);
    }

    #[test]
    fn test_calculate_skewness_right_tail() {
        assert!(calculate_skewness(&floats(&[1.0, 1.0, 1.0, 1.0, 10.0])).unwrap() > 0.0);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect() {
        let df = df!(
            "x" => &[1.0f64, 2.0, 3.0, 4.0],
            "up" => &[2.0f64, 4.0, 6.0, 8.0],
            "down" => &[8i64, 6, 4, 2],
        )
        .unwrap();

        assert!((pearson(&df, "x", "up").unwrap().unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&df, "x", "down").unwrap().unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_skips_missing_pairs() {
        let df = pairs(
            &[Some(1.0), None, Some(2.0), Some(3.0), Some(f64::NAN)],
            &[Some(1.0), Some(100.0), Some(2.0), Some(3.0), Some(-50.0)],
        );
        assert!((pearson(&df, "x", "y").unwrap().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        let single = pairs(&[Some(1.0)], &[Some(2.0)]);
        assert_eq!(pearson(&single, "x", "y").unwrap(), None);

        let flat = pairs(&[Some(1.0), Some(1.0), Some(1.0)], &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(pearson(&flat, "x", "y").unwrap(), None);

        let empty = pairs(&[], &[]);
        assert_eq!(pearson(&empty, "x", "y").unwrap(), None);
    }

    // ==================== value_statistics tests ====================

    #[test]
    fn test_value_statistics() {
        let series = Series::new("Value".into(), &[Some(10.0f64), None, Some(30.0), Some(f64::NAN)]);
        let stats = value_statistics(&series).unwrap().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
    }

    #[test]
    fn test_value_statistics_empty() {
        let series = Series::new("Value".into(), Vec::<f64>::new());
        assert!(value_statistics(&series).unwrap().is_none());
    }
}
