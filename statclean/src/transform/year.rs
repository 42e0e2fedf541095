//! Year resolution.
//!
//! Per-column rules already carry their year in the column name (see
//! [`super::columns::YearRule::column_year`]). This module handles the
//! field-based encoding, where a cell holds either one year or a range such
//! as `"2001-2003"` that collapses to its midpoint.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Cell;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// All maximal runs of exactly four ASCII digits, in order of appearance.
pub fn year_runs(text: &str) -> Vec<i32> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| run.len() == 4)
        .filter_map(|run| run.parse().ok())
        .collect()
}

/// Integer midpoint of a range, rounding toward negative infinity.
///
/// `midpoint_year(2001, 2002) == 2001`. Endpoints are used as given, not sorted.
pub fn midpoint_year(start: i32, end: i32) -> i32 {
    (start + end).div_euclid(2)
}

/// Resolve a year field from its text.
///
/// - no four-digit run: `None`
/// - one run: that year
/// - two runs: their midpoint
/// - more than two: `None`
pub fn resolve_year_text(text: &str) -> Option<i32> {
    match year_runs(text).as_slice() {
        [year] => Some(*year),
        [start, end] => Some(midpoint_year(*start, *end)),
        _ => None,
    }
}

/// Resolve a year cell. Integral numbers are taken as the year itself.
pub fn resolve_year_cell(cell: &Cell) -> Option<i32> {
    match cell {
        Cell::Text(text) => resolve_year_text(text),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < i32::MAX as f64 => Some(*n as i32),
        Cell::Number(_) | Cell::Missing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_year() {
        assert_eq!(resolve_year_text("2004"), Some(2004));
        assert_eq!(resolve_year_text(" 2004 "), Some(2004));
    }

    #[test]
    fn test_range_midpoint() {
        assert_eq!(resolve_year_text("2001-2003"), Some(2002));
        assert_eq!(resolve_year_text("2000-2002"), Some(2001));
    }

    #[test]
    fn test_odd_sum_truncates_toward_start() {
        assert_eq!(resolve_year_text("2001-2002"), Some(2001));
        assert_eq!(resolve_year_text("2019-2020"), Some(2019));
    }

    #[test]
    fn test_range_order_not_sorted() {
        // (2003 + 2000) / 2 = 2001.5 -> 2001, same as the sorted form
        assert_eq!(resolve_year_text("2003-2000"), Some(2001));
        assert_eq!(year_runs("2003-2000"), vec![2003, 2000]);
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve_year_text("no data"), None);
        assert_eq!(resolve_year_text(""), None);
        assert_eq!(resolve_year_text("201"), None);
    }

    #[test]
    fn test_more_than_two_runs_is_missing() {
        assert_eq!(resolve_year_text("2001-2002-2003"), None);
    }

    #[test]
    fn test_runs_must_be_exactly_four_digits() {
        assert_eq!(year_runs("20012003"), Vec::<i32>::new());
        assert_eq!(year_runs("FY 2010/11"), vec![2010]);
        assert_eq!(resolve_year_text("20002002"), None);
    }

    #[test]
    fn test_resolve_cell() {
        assert_eq!(resolve_year_cell(&Cell::Number(2010.0)), Some(2010));
        assert_eq!(resolve_year_cell(&Cell::Number(2010.5)), None);
        assert_eq!(resolve_year_cell(&Cell::Text("2010-2012".into())), Some(2011));
        assert_eq!(resolve_year_cell(&Cell::Missing), None);
    }
}
