use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Column names
// ============================================================================

pub const YEAR_COLUMN: &str = "Year Number";
pub const VALUE_COLUMN: &str = "Value";
pub const COMMODITY_COLUMN: &str = "Commodity";
pub const COUNTRY_COLUMN: &str = "Country";
pub const CATEGORY_COLUMN: &str = "Category";

/// Columns every import dataset must carry (after name trimming).
pub const REQUIRED_COLUMNS: [&str; 5] = [
    YEAR_COLUMN,
    VALUE_COLUMN,
    COMMODITY_COLUMN,
    COUNTRY_COLUMN,
    CATEGORY_COLUMN,
];

// ============================================================================
// Sentinel countries
// ============================================================================

/// "Country" values that stand for aggregates or alternate units rather than
/// a trading partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentinelCountry {
    /// Total over all partners, in millions of dollars.
    World,
    /// Total over all partners, in quantity units.
    WorldQuantity,
    /// Everything not broken out as a named partner.
    RestOfWorld,
}

impl SentinelCountry {
    pub const ALL: [SentinelCountry; 3] = [Self::World, Self::WorldQuantity, Self::RestOfWorld];

    /// The literal value used in the `Country` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::World => "WORLD",
            Self::WorldQuantity => "WORLD (Quantity)",
            Self::RestOfWorld => "REST OF WORLD",
        }
    }

    /// Match a `Country` value exactly.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for SentinelCountry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a `Country` value is one of the sentinel aggregates.
pub fn is_sentinel_country(value: &str) -> bool {
    SentinelCountry::parse(value).is_some()
}

// ============================================================================
// Aggregation results
// ============================================================================

/// Summed import value for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    pub year: i64,
    pub value: f64,
}

/// Summed import value for one key (commodity, country or category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTotal {
    pub key: String,
    pub value: f64,
}

/// Per-year totals for a single key, ascending by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub key: String,
    pub points: Vec<YearTotal>,
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Mean, max and min of the yearly totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Number of distinct years the statistics were computed over.
    pub years: usize,
}

/// One row of the price-per-unit derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePerUnit {
    pub year: i64,
    pub total_import_value: f64,
    pub total_quantity: f64,
    /// `None` when the quantity is zero.
    pub price_per_unit: Option<f64>,
}

/// Square correlation matrix with shared row/column labels.
///
/// Undefined coefficients are NaN; JSON writes them as `null` and reads
/// `null` back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    #[serde(deserialize_with = "nullable_coefficients")]
    pub values: Vec<Vec<f64>>,
}

fn nullable_coefficients<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}

impl CorrelationMatrix {
    /// Look up the coefficient for two labelled columns.
    pub fn get(&self, x: &str, y: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == x)?;
        let j = self.labels.iter().position(|l| l == y)?;
        Some(self.values[i][j])
    }
}

// ============================================================================
// Cleaning and profiling summaries
// ============================================================================

/// What the cleaner dropped and why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    /// Rows dropped because `Value` was missing or not numeric.
    pub rows_missing_value: usize,
    /// Rows dropped because `Year Number` was not a plain integer.
    pub rows_invalid_year: usize,
    pub rows_after: usize,
    /// Human-readable log of the cleaning steps.
    pub actions: Vec<String>,
}

impl CleaningSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_removed() as f64 / self.rows_before as f64 * 100.0
        }
    }
}

/// Descriptive statistics of the `Value` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
}

/// Shape and cardinalities of a cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub year_range: Option<(i64, i64)>,
    pub distinct_commodities: usize,
    pub distinct_countries: usize,
    pub distinct_categories: usize,
    pub value_stats: Option<ValueStatistics>,
}
