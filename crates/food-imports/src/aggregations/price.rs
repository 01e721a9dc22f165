//! Price-per-unit derived from the `WORLD` and `WORLD (Quantity)` aggregates.

use crate::error::{AnalysisError, Result};
use crate::types::{COUNTRY_COLUMN, PricePerUnit, SentinelCountry, VALUE_COLUMN, YEAR_COLUMN};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const TOTAL_IMPORT_VALUE: &str = "Total Import Value";
pub const TOTAL_QUANTITY: &str = "Total Quantity";
const PRICE_PER_UNIT: &str = "Price per Unit";

const LEFT_ROW: &str = "left_row";
const RIGHT_ROW: &str = "right_row";

/// Price per unit: `WORLD` value over `WORLD (Quantity)` quantity.
///
/// Returns `Ok(None)` when the dataset carries no `WORLD (Quantity)` rows.
/// The two row sets are inner-joined on year without aggregation, so a year
/// with several rows on a side yields one result per pair of rows, and
/// years present on only one side are absent. Rows come out by year, then
/// in `WORLD` row order, then in `WORLD (Quantity)` row order. A zero
/// quantity gives `price_per_unit: None`.
pub fn price_per_unit(df: &DataFrame) -> Result<Option<Vec<PricePerUnit>>> {
    if !has_country(df, SentinelCountry::WorldQuantity)? {
        info!(
            "No '{}' rows; skipping price-per-unit",
            SentinelCountry::WorldQuantity
        );
        return Ok(None);
    }

    let values = rows_for(df, SentinelCountry::World, TOTAL_IMPORT_VALUE, LEFT_ROW);
    let quantities = rows_for(df, SentinelCountry::WorldQuantity, TOTAL_QUANTITY, RIGHT_ROW);

    let joined = values
        .join(
            quantities,
            [col(YEAR_COLUMN)],
            [col(YEAR_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column((col(TOTAL_IMPORT_VALUE) / col(TOTAL_QUANTITY)).alias(PRICE_PER_UNIT))
        .collect()?;

    let years = int_column(&joined, YEAR_COLUMN)?;
    let left = int_column(&joined, LEFT_ROW)?;
    let right = int_column(&joined, RIGHT_ROW)?;
    let totals = joined.column(TOTAL_IMPORT_VALUE)?.as_materialized_series().cast(&DataType::Float64)?;
    let quantity = joined.column(TOTAL_QUANTITY)?.as_materialized_series().cast(&DataType::Float64)?;
    let prices = joined.column(PRICE_PER_UNIT)?.as_materialized_series().cast(&DataType::Float64)?;

    let mut rows = Vec::with_capacity(joined.height());
    for (((((year, l), r), total), qty), price) in years
        .i64()?
        .into_iter()
        .zip(left.i64()?.into_iter())
        .zip(right.i64()?.into_iter())
        .zip(totals.f64()?.into_iter())
        .zip(quantity.f64()?.into_iter())
        .zip(prices.f64()?.into_iter())
    {
        let (Some(year), Some(total), Some(qty)) = (year, total, qty) else {
            continue;
        };

        let price = if qty == 0.0 {
            warn!("Zero '{}' in {}; price per unit undefined", TOTAL_QUANTITY, year);
            None
        } else {
            price.filter(|p| p.is_finite())
        };

        let row = PricePerUnit {
            year,
            total_import_value: total,
            total_quantity: qty,
            price_per_unit: price,
        };
        rows.push(((year, l, r), row));
    }

    rows.sort_by_key(|(order, _)| *order);
    Ok(Some(rows.into_iter().map(|(_, row)| row).collect()))
}

/// Mean price per year over the rows that have a price, by ascending year.
pub fn mean_price_by_year(rows: &[PricePerUnit]) -> Vec<(i64, f64)> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if let Some(price) = row.price_per_unit {
            let entry = sums.entry(row.year).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect()
}

fn has_country(df: &DataFrame, sentinel: SentinelCountry) -> Result<bool> {
    let countries = df
        .column(COUNTRY_COLUMN)
        .map_err(|_| AnalysisError::ColumnNotFound(COUNTRY_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let found = countries
        .str()?
        .into_iter()
        .any(|c| c == Some(sentinel.as_str()));
    Ok(found)
}

/// Year and value of every `sentinel` row, tagged with its position.
fn rows_for(df: &DataFrame, sentinel: SentinelCountry, alias: &str, index: &str) -> LazyFrame {
    df.clone()
        .lazy()
        .with_row_index(index, None)
        .filter(col(COUNTRY_COLUMN).eq(lit(sentinel.as_str())))
        .select([
            col(YEAR_COLUMN),
            col(index),
            col(VALUE_COLUMN).cast(DataType::Float64).alias(alias),
        ])
}

fn int_column(df: &DataFrame, name: &str) -> Result<Series> {
    Ok(df.column(name)?.as_materialized_series().cast(&DataType::Int64)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CATEGORY_COLUMN, COMMODITY_COLUMN};
    use pretty_assertions::assert_eq;

    fn frame(rows: &[(i64, &str, f64)]) -> DataFrame {
        let years: Vec<i64> = rows.iter().map(|r| r.0).collect();
        let countries: Vec<&str> = rows.iter().map(|r| r.1).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let commodities = vec!["Food"; rows.len()];
        let categories = vec!["All"; rows.len()];
        df!(
            YEAR_COLUMN => years,
            COUNTRY_COLUMN => countries,
            VALUE_COLUMN => values,
            COMMODITY_COLUMN => commodities,
            CATEGORY_COLUMN => categories,
        )
        .unwrap()
    }

    #[test]
    fn test_no_quantity_rows() {
        let df = frame(&[(2020, "WORLD", 100.0), (2020, "Mexico", 10.0)]);
        assert_eq!(price_per_unit(&df).unwrap(), None);
    }

    fn ratios(rows: &[PricePerUnit]) -> Vec<(i64, Option<f64>)> {
        rows.iter().map(|r| (r.year, r.price_per_unit)).collect()
    }

    #[test]
    fn test_price_per_unit_pairs_every_row() {
        let df = frame(&[
            (2020, "WORLD", 100.0),
            (2020, "WORLD", 50.0),
            (2020, "WORLD (Quantity)", 10.0),
            (2020, "WORLD (Quantity)", 5.0),
            (2021, "Mexico", 999.0),
        ]);

        let rows = price_per_unit(&df).unwrap().unwrap();
        assert_eq!(
            ratios(&rows),
            vec![
                (2020, Some(10.0)),
                (2020, Some(20.0)),
                (2020, Some(5.0)),
                (2020, Some(10.0)),
            ]
        );
        assert_eq!(rows[1].total_import_value, 100.0);
        assert_eq!(rows[1].total_quantity, 5.0);
    }

    #[test]
    fn test_price_per_unit_one_row_per_side() {
        let df = frame(&[
            (2021, "WORLD", 80.0),
            (2021, "WORLD (Quantity)", 40.0),
            (2020, "WORLD", 150.0),
            (2020, "WORLD (Quantity)", 30.0),
        ]);

        let rows = price_per_unit(&df).unwrap().unwrap();
        assert_eq!(
            rows,
            vec![
                PricePerUnit {
                    year: 2020,
                    total_import_value: 150.0,
                    total_quantity: 30.0,
                    price_per_unit: Some(5.0),
                },
                PricePerUnit {
                    year: 2021,
                    total_import_value: 80.0,
                    total_quantity: 40.0,
                    price_per_unit: Some(2.0),
                },
            ]
        );
    }

    #[test]
    fn test_only_years_on_both_sides() {
        let df = frame(&[
            (2019, "WORLD", 10.0),
            (2020, "WORLD", 20.0),
            (2020, "WORLD (Quantity)", 4.0),
            (2021, "WORLD (Quantity)", 8.0),
        ]);

        let rows = price_per_unit(&df).unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].price_per_unit, Some(5.0));
    }

    #[test]
    fn test_zero_quantity_has_no_price() {
        let df = frame(&[(2020, "WORLD", 20.0), (2020, "WORLD (Quantity)", 0.0)]);

        let rows = price_per_unit(&df).unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price_per_unit, None);
    }

    #[test]
    fn test_mean_price_by_year() {
        let row = |year, price| PricePerUnit {
            year,
            total_import_value: 0.0,
            total_quantity: 0.0,
            price_per_unit: price,
        };
        let rows = vec![
            row(2021, Some(4.0)),
            row(2020, Some(10.0)),
            row(2020, Some(20.0)),
            row(2020, None),
            row(2022, None),
        ];

        assert_eq!(mean_price_by_year(&rows), vec![(2020, 15.0), (2021, 4.0)]);
    }
}
