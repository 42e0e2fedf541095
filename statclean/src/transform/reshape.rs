//! Melt, aggregate and pivot.
//!
//! ```text
//! wide rows ──melt──▶ (key, year, value) ──mean──▶ one per (key, year) ──pivot──▶ wide rows
//! ```
//!
//! Nothing here fails: unparseable values and unresolvable years are counted
//! in [`NormalizeStats`] and left out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::columns::ColumnSelection;
use super::pipeline::NormalizeStats;
use super::year::resolve_year_cell;
use crate::models::{
    CanonicalKey, CanonicalRow, CanonicalTable, Cell, LongTriple, RawRecord, RawTable,
};

/// Inclusive range of years kept in an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Key text of a cell. `Missing` has none.
fn key_text(cell: &Cell, trim: bool) -> Option<String> {
    let text = match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => n.to_string(),
        Cell::Missing => return None,
    };
    Some(if trim { text.trim().to_string() } else { text })
}

/// The key of a row, or `None` if any identifying cell is missing.
fn row_key(row: &RawRecord, selection: &ColumnSelection, trim: bool) -> Option<CanonicalKey> {
    let country_name = key_text(row.get(selection.country), trim)?;
    let indicator_name = match selection.indicator {
        Some(index) => Some(key_text(row.get(index), trim)?),
        None => None,
    };
    Some(CanonicalKey {
        country_name,
        indicator_name,
    })
}

/// Melt a wide table (years in column names) into triples.
///
/// Missing values are dropped here and counted; rows without a key are skipped.
pub fn melt_wide(
    table: &RawTable,
    selection: &ColumnSelection,
    trim_keys: bool,
    stats: &mut NormalizeStats,
) -> Vec<LongTriple> {
    let mut triples = Vec::new();

    for row in &table.rows {
        let Some(key) = row_key(row, selection, trim_keys) else {
            stats.dropped_missing_key += 1;
            continue;
        };

        for column in &selection.years {
            match row.get(column.index).as_number() {
                Some(value) => triples.push(LongTriple::new(key.clone(), column.year, Some(value))),
                None => stats.missing_values += 1,
            }
        }
    }

    triples
}

/// Turn a long table (one year field, one value field) into triples.
///
/// A row whose year does not resolve is dropped whole; so is a row without a
/// key. A non-numeric value drops only that value.
pub fn melt_field(
    table: &RawTable,
    selection: &ColumnSelection,
    trim_keys: bool,
    stats: &mut NormalizeStats,
) -> Vec<LongTriple> {
    let Some((year_index, value_index)) = selection.field else {
        return Vec::new();
    };

    let mut triples = Vec::new();

    for row in &table.rows {
        let Some(key) = row_key(row, selection, trim_keys) else {
            stats.dropped_missing_key += 1;
            continue;
        };
        let Some(year) = resolve_year_cell(row.get(year_index)) else {
            stats.dropped_unresolved_year += 1;
            continue;
        };
        match row.get(value_index).as_number() {
            Some(value) => triples.push(LongTriple::new(key, year, Some(value))),
            None => stats.missing_values += 1,
        }
    }

    triples
}

/// Collapse triples sharing a (key, year) to their arithmetic mean.
///
/// Missing values are ignored; a group with nothing left produces no triple.
/// Output is sorted by key, then year.
pub fn aggregate_mean(triples: Vec<LongTriple>) -> Vec<LongTriple> {
    let mut groups: BTreeMap<(CanonicalKey, i32), (f64, usize)> = BTreeMap::new();

    for triple in triples {
        let Some(value) = triple.value else { continue };
        let entry = groups.entry((triple.key, triple.year)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((key, year), (sum, count))| LongTriple::new(key, year, Some(sum / count as f64)))
        .collect()
}

/// Keep only triples whose year falls inside the window.
pub fn filter_window(
    triples: Vec<LongTriple>,
    window: &YearWindow,
    stats: &mut NormalizeStats,
) -> Vec<LongTriple> {
    let before = triples.len();
    let kept: Vec<LongTriple> = triples.into_iter().filter(|t| window.contains(t.year)).collect();
    stats.outside_window += before - kept.len();
    kept
}

/// Pivot triples to one row per key and one column per year seen anywhere.
///
/// Rows come out sorted by key; cells never observed stay missing.
pub fn pivot(triples: &[LongTriple], has_indicator: bool) -> CanonicalTable {
    let mut by_key: BTreeMap<&CanonicalKey, BTreeMap<i32, f64>> = BTreeMap::new();
    let mut years: Vec<i32> = Vec::new();

    for triple in triples {
        let Some(value) = triple.value else { continue };
        by_key.entry(&triple.key).or_default().insert(triple.year, value);
        years.push(triple.year);
    }

    years.sort_unstable();
    years.dedup();

    let rows = by_key
        .into_iter()
        .map(|(key, values)| CanonicalRow {
            key: key.clone(),
            values: years
                .iter()
                .map(|y| values.get(y).map(|v| Cell::Number(*v)).unwrap_or(Cell::Missing))
                .collect(),
        })
        .collect();

    CanonicalTable {
        has_indicator,
        years,
        rows,
    }
}

/// Keep a wide table wide: select year columns, reorder them ascending and
/// pass cell content through untouched.
///
/// Rows keep their input order. When two columns carry the same year the
/// first one wins. With `drop_all_missing`, rows whose year cells are all
/// missing are removed before anything else happens to them. A missing
/// country becomes an empty name rather than dropping the row.
pub fn pass_through(
    table: &RawTable,
    selection: &ColumnSelection,
    drop_all_missing: bool,
    trim_keys: bool,
    stats: &mut NormalizeStats,
) -> CanonicalTable {
    let mut columns: BTreeMap<i32, usize> = BTreeMap::new();
    for column in &selection.years {
        columns.entry(column.year).or_insert(column.index);
    }

    let mut rows = Vec::new();
    for row in &table.rows {
        if drop_all_missing && selection.years.iter().all(|c| row.get(c.index).is_missing()) {
            stats.dropped_all_missing += 1;
            continue;
        }

        let country_name = key_text(row.get(selection.country), trim_keys).unwrap_or_default();
        let indicator_name = selection
            .indicator
            .map(|index| key_text(row.get(index), trim_keys).unwrap_or_default());

        let values: Vec<Cell> = columns.values().map(|index| row.get(*index).clone()).collect();
        stats.missing_values += values.iter().filter(|c| c.is_missing()).count();

        rows.push(CanonicalRow {
            key: CanonicalKey {
                country_name,
                indicator_name,
            },
            values,
        });
    }

    CanonicalTable {
        has_indicator: selection.indicator.is_some(),
        years: columns.into_keys().collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::columns::{select_columns, YearRule};

    fn stats() -> NormalizeStats {
        NormalizeStats::default()
    }

    #[test]
    fn test_mean_of_duplicates() {
        let key = CanonicalKey::country("Chad");
        let triples = vec![
            LongTriple::new(key.clone(), 2002, Some(10.0)),
            LongTriple::new(key.clone(), 2002, Some(20.0)),
            LongTriple::new(key.clone(), 2003, Some(5.0)),
        ];

        let agg = aggregate_mean(triples);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0], LongTriple::new(key.clone(), 2002, Some(15.0)));
        assert_eq!(agg[1], LongTriple::new(key, 2003, Some(5.0)));
    }

    #[test]
    fn test_mean_ignores_missing() {
        let key = CanonicalKey::country("Chad");
        let triples = vec![
            LongTriple::new(key.clone(), 2002, None),
            LongTriple::new(key.clone(), 2002, Some(4.0)),
            LongTriple::new(key.clone(), 2005, None),
        ];

        let agg = aggregate_mean(triples);
        assert_eq!(agg, vec![LongTriple::new(key, 2002, Some(4.0))]);
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = YearWindow::new(2000, 2025);
        assert!(window.contains(2000));
        assert!(window.contains(2025));
        assert!(!window.contains(1999));
        assert!(!window.contains(2026));

        let key = CanonicalKey::country("Mali");
        let mut s = stats();
        let kept = filter_window(
            vec![
                LongTriple::new(key.clone(), 1999, Some(1.0)),
                LongTriple::new(key.clone(), 2010, Some(1.0)),
                LongTriple::new(key, 2030, Some(1.0)),
            ],
            &window,
            &mut s,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(s.outside_window, 2);
    }

    #[test]
    fn test_pivot_sparse_rows() {
        let chad = CanonicalKey::country("Chad");
        let benin = CanonicalKey::country("Benin");
        let triples = vec![
            LongTriple::new(chad.clone(), 2003, Some(3.0)),
            LongTriple::new(benin.clone(), 2001, Some(1.0)),
        ];

        let table = pivot(&triples, false);
        assert_eq!(table.years, vec![2001, 2003]);
        assert_eq!(table.rows[0].key, benin);
        assert_eq!(table.rows[0].values, vec![Cell::Number(1.0), Cell::Missing]);
        assert_eq!(table.rows[1].values, vec![Cell::Missing, Cell::Number(3.0)]);
    }

    #[test]
    fn test_melt_wide_drops_missing_at_triple_level() {
        let raw = RawTable::from_strs(
            &["Area", "Item", "Y2001", "Y2002"],
            &[&["Chad", "Food", "1.5", "N/A"], &["", "Food", "2", "3"]],
        );
        let sel =
            select_columns(&raw.headers, "Area", Some("Item"), &YearRule::prefixed("Y")).unwrap();
        let mut s = stats();

        let triples = melt_wide(&raw, &sel, false, &mut s);
        let chad_food = CanonicalKey::with_indicator("Chad", "Food");
        assert_eq!(triples, vec![LongTriple::new(chad_food, 2001, Some(1.5))]);
        assert_eq!(s.missing_values, 1);
        assert_eq!(s.dropped_missing_key, 1);
    }

    #[test]
    fn test_melt_field_resolves_ranges() {
        let raw = RawTable::from_strs(
            &["Area", "Year", "Value"],
            &[
                &["Chad", "2001-2003", "10"],
                &["Chad", "no data", "99"],
                &["Chad", "2004", "abc"],
            ],
        );
        let rule = YearRule::field("Year", "Value");
        let sel = select_columns(&raw.headers, "Area", None, &rule).unwrap();
        let mut s = stats();

        let triples = melt_field(&raw, &sel, false, &mut s);
        assert_eq!(triples, vec![LongTriple::new(CanonicalKey::country("Chad"), 2002, Some(10.0))]);
        assert_eq!(s.dropped_unresolved_year, 1);
        assert_eq!(s.missing_values, 1);
    }

    #[test]
    fn test_pass_through_sorts_years_and_keeps_text() {
        let raw = RawTable::from_strs(
            &["Country Name", "2003", "2001", "2002"],
            &[&["  Chad ", "<2.5", "30", ""]],
        );
        let rule = YearRule::bare_digits(2001);
        let sel = select_columns(&raw.headers, "Country Name", None, &rule).unwrap();
        let mut s = stats();

        let table = pass_through(&raw, &sel, true, true, &mut s);
        assert_eq!(table.years, vec![2001, 2002, 2003]);
        assert_eq!(table.rows[0].key.country_name, "Chad");
        assert_eq!(
            table.rows[0].values,
            vec![Cell::Text("30".into()), Cell::Missing, Cell::Text("<2.5".into())]
        );
    }

    #[test]
    fn test_pass_through_drops_all_missing_rows() {
        let raw = RawTable::from_strs(
            &["Country Name", "2001", "2002"],
            &[&["Chad", "", ""], &["Mali", "", "4"]],
        );
        let rule = YearRule::bare_digits(2001);
        let sel = select_columns(&raw.headers, "Country Name", None, &rule).unwrap();
        let mut s = stats();

        let table = pass_through(&raw, &sel, true, true, &mut s);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key.country_name, "Mali");
        assert_eq!(s.dropped_all_missing, 1);
    }
}
