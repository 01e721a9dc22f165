//! Column-name and cell-level sanitizers.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Invalid regex: year digits"));

/// Strip surrounding whitespace from every column name.
///
/// Returns the number of columns that were renamed.
pub(crate) fn trim_column_names(df: &mut DataFrame) -> PolarsResult<usize> {
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.trim();
            (trimmed != name.as_str()).then(|| (name.to_string(), trimmed.to_string()))
        })
        .collect();

    for (old, new) in &renames {
        debug!("Renaming column '{}' -> '{}'", old, new);
        df.rename(old, new.as_str().into())?;
    }

    Ok(renames.len())
}

/// Parse a year cell that must consist of ASCII digits only.
///
/// Signs, decimal points, surrounding whitespace and labels all reject the
/// cell, as do digit strings too large for an `i64`.
pub(crate) fn parse_year(value: &str) -> Option<i64> {
    if !YEAR_PATTERN.is_match(value) {
        return None;
    }
    value.parse::<i64>().ok()
}

/// Check whether a cell holds a usable import value (present and not NaN).
pub(crate) fn is_usable_value(value: Option<f64>) -> bool {
    value.is_some_and(|v| !v.is_nan())
}
