//! Domain models for the normalization pipeline.
//!
//! - [`Cell`] - tagged cell value (`Text`, `Number`, `Missing`)
//! - [`RawTable`] / [`RawRecord`] - an unprocessed input table
//! - [`CanonicalKey`] - country (and optional indicator) identifying a row
//! - [`LongTriple`] - one (key, year, value) observation
//! - [`CanonicalTable`] / [`CanonicalRow`] - the normalized wide output

use serde::{Deserialize, Serialize};

/// Canonical name of the country column in every output.
pub const COUNTRY_NAME: &str = "country_name";

/// Canonical name of the indicator column in outputs that carry one.
pub const INDICATOR_NAME: &str = "indicator_name";

// =============================================================================
// Cells
// =============================================================================

/// A single cell value.
///
/// Raw input arrives as `Text` or `Missing`; `Number` appears once a value
/// has been coerced (or when a table is built in code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Build a cell from raw field text. Empty text is missing; NA markers
    /// are handled by the reader.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Coerce to a finite number. Never fails: anything unparseable is `None`.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Missing => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Text view of the cell, if it holds any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render for CSV output. Missing cells render empty.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Missing => String::new(),
        }
    }
}

/// Deterministic number formatting: integral values keep one decimal
/// (`15.0`), everything else uses the shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

// =============================================================================
// Raw Tables
// =============================================================================

/// One row of an unprocessed input table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub cells: Vec<Cell>,
}

impl RawRecord {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Cell at a column index; short rows read as missing.
    pub fn get(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&Cell::Missing)
    }
}

/// An unprocessed table: unique column names plus rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string literals. Empty strings become missing.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| RawRecord::new(r.iter().map(|c| Cell::from_raw(c)).collect()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Keys and Triples
// =============================================================================

/// Identifies one output row. Ordered by country, then indicator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalKey {
    pub country_name: String,
    pub indicator_name: Option<String>,
}

impl CanonicalKey {
    pub fn country(name: impl Into<String>) -> Self {
        Self {
            country_name: name.into(),
            indicator_name: None,
        }
    }

    pub fn with_indicator(country: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            country_name: country.into(),
            indicator_name: Some(indicator.into()),
        }
    }
}

/// One long-format observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTriple {
    pub key: CanonicalKey,
    pub year: i32,
    pub value: Option<f64>,
}

impl LongTriple {
    pub fn new(key: CanonicalKey, year: i32, value: Option<f64>) -> Self {
        Self { key, year, value }
    }
}

// =============================================================================
// Canonical Output
// =============================================================================

/// One output row: key plus one cell per year column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub key: CanonicalKey,
    pub values: Vec<Cell>,
}

/// The normalized wide table.
///
/// Invariants: `years` is strictly ascending and every row has exactly
/// `years.len()` values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalTable {
    /// Whether the `indicator_name` column is present.
    pub has_indicator: bool,
    pub years: Vec<i32>,
    pub rows: Vec<CanonicalRow>,
}

impl CanonicalTable {
    /// Output header: identifying columns, then years ascending.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![COUNTRY_NAME.to_string()];
        if self.has_indicator {
            headers.push(INDICATOR_NAME.to_string());
        }
        headers.extend(self.years.iter().map(|y| y.to_string()));
        headers
    }

    /// Value for a key and year, if that cell holds anything.
    pub fn value(&self, key: &CanonicalKey, year: i32) -> Option<&Cell> {
        let col = self.years.iter().position(|y| *y == year)?;
        self.rows
            .iter()
            .find(|r| &r.key == key)
            .and_then(|r| r.values.get(col))
            .filter(|c| !c.is_missing())
    }

    pub fn row(&self, key: &CanonicalKey) -> Option<&CanonicalRow> {
        self.rows.iter().find(|r| &r.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::from_raw("12.5").as_number(), Some(12.5));
        assert_eq!(Cell::from_raw(" 7 ").as_number(), Some(7.0));
        assert_eq!(Cell::from_raw("N/A").as_number(), None);
        assert_eq!(Cell::from_raw("").as_number(), None);
        assert_eq!(Cell::from_raw("NaN").as_number(), None);
        assert_eq!(Cell::from_raw("inf").as_number(), None);
        assert_eq!(Cell::Number(3.0).as_number(), Some(3.0));
    }

    #[test]
    fn test_empty_raw_is_missing() {
        assert!(Cell::from_raw("").is_missing());
        assert!(!Cell::from_raw(" ").is_missing());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0), "15.0");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(-2.0), "-2.0");
        assert_eq!(format_number(101.25), "101.25");
    }

    #[test]
    fn test_render() {
        assert_eq!(Cell::Missing.render(), "");
        assert_eq!(Cell::Text("<2.5".into()).render(), "<2.5");
        assert_eq!(Cell::Number(4.0).render(), "4.0");
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            CanonicalKey::with_indicator("France", "Food"),
            CanonicalKey::with_indicator("Chad", "General"),
            CanonicalKey::with_indicator("Chad", "Food"),
        ];
        keys.sort();
        assert_eq!(keys[0], CanonicalKey::with_indicator("Chad", "Food"));
        assert_eq!(keys[2].country_name, "France");
    }

    #[test]
    fn test_canonical_headers() {
        let table = CanonicalTable {
            has_indicator: true,
            years: vec![2000, 2001],
            rows: vec![],
        };
        assert_eq!(table.headers(), vec!["country_name", "indicator_name", "2000", "2001"]);
    }

    #[test]
    fn test_short_row_reads_missing() {
        let record = RawRecord::new(vec![Cell::from_raw("a")]);
        assert!(record.get(3).is_missing());
    }
}
