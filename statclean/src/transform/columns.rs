//! Year column selection.
//!
//! Each dataset names its year dimension differently. [`YearRule`] is the
//! closed set of conventions we understand; [`select_columns`] applies one
//! to a table header and returns the identifying and year-bearing columns.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

static PREFIXED_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\D+)(\d{4})$").expect("valid regex"));

/// How a dataset encodes its year dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum YearRule {
    /// Columns named with bare digits (`2001`), kept when `>= min_year`.
    BareDigits {
        #[serde(default = "default_min_year")]
        min_year: i32,
    },

    /// Columns named `prefix` followed by exactly four digits (`Y2001`).
    Prefixed {
        #[serde(default = "default_prefix")]
        prefix: String,
    },

    /// Long layout: one column holds the year (or a year range), another the value.
    Field {
        #[serde(default = "default_year_column")]
        year_column: String,
        #[serde(default = "default_value_column")]
        value_column: String,
    },
}

fn default_min_year() -> i32 {
    2001
}

fn default_prefix() -> String {
    "Y".to_string()
}

fn default_year_column() -> String {
    "Year".to_string()
}

fn default_value_column() -> String {
    "Value".to_string()
}

impl YearRule {
    pub fn bare_digits(min_year: i32) -> Self {
        YearRule::BareDigits { min_year }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        YearRule::Prefixed { prefix: prefix.into() }
    }

    pub fn field(year_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        YearRule::Field {
            year_column: year_column.into(),
            value_column: value_column.into(),
        }
    }

    /// Whether years live in column names (wide) rather than in a field (long).
    pub fn is_per_column(&self) -> bool {
        !matches!(self, YearRule::Field { .. })
    }

    /// The year carried by a column name, if the name is year-bearing under this rule.
    pub fn column_year(&self, name: &str) -> Option<i32> {
        match self {
            YearRule::BareDigits { min_year } => {
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                name.parse::<i32>().ok().filter(|y| y >= min_year)
            }
            YearRule::Prefixed { prefix } => {
                let caps = PREFIXED_YEAR.captures(name)?;
                if &caps[1] != prefix.as_str() {
                    return None;
                }
                caps[2].parse().ok()
            }
            YearRule::Field { .. } => None,
        }
    }

    /// Columns this rule needs to find in the input.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            YearRule::Field {
                year_column,
                value_column,
            } => vec![year_column.as_str(), value_column.as_str()],
            _ => vec![],
        }
    }
}

/// A year-bearing column and the year it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct YearColumn {
    pub index: usize,
    pub name: String,
    pub year: i32,
}

/// Where the pieces of one input table live.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelection {
    pub country: usize,
    pub indicator: Option<usize>,
    /// Per-column years, in original column order. Empty for `Field` rules.
    pub years: Vec<YearColumn>,
    /// `(year, value)` column indices for `Field` rules.
    pub field: Option<(usize, usize)>,
}

/// Resolve the identifying and year-bearing columns of a header.
///
/// Every required column (country, indicator, and for `Field` rules the year
/// and value columns) is checked before anything else; all missing names are
/// reported together.
pub fn select_columns(
    headers: &[String],
    country_column: &str,
    indicator_column: Option<&str>,
    rule: &YearRule,
) -> SchemaResult<ColumnSelection> {
    let position = |name: &str| headers.iter().position(|h| h == name);

    let mut required = vec![country_column];
    required.extend(indicator_column);
    required.extend(rule.required_columns());

    let missing: Vec<String> = required
        .iter()
        .copied()
        .filter(|name| position(*name).is_none())
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    // Presence was checked above.
    let index_of = |name: &str| position(name).unwrap_or_default();

    let years = headers
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            rule.column_year(name).map(|year| YearColumn {
                index,
                name: name.clone(),
                year,
            })
        })
        .collect();

    let field = match rule {
        YearRule::Field { year_column, value_column } => {
            Some((index_of(year_column.as_str()), index_of(value_column.as_str())))
        }
        _ => None,
    };

    Ok(ColumnSelection {
        country: index_of(country_column),
        indicator: indicator_column.map(index_of),
        years,
        field,
    })
}
