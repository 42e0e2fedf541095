//! Normalization pipeline.
//!
//! ```text
//! TableSource ─▶ select columns ─▶ reshape ─▶ TableSink
//!                                   ├─ pass-through
//!                                   └─ melt ▸ mean ▸ window ▸ pivot
//! ```
//!
//! [`normalize_table`] is the pure core. [`run_dataset`] wraps it with a
//! source and a sink; a failing dataset writes nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use statclean::{run_dataset, DatasetKind, DirSink, DirSource};
//!
//! let summary = run_dataset(
//!     &DatasetKind::EnergySupplyAdequacy.spec(),
//!     &DirSource::new("data/raw"),
//!     &DirSink::new("data/processed"),
//! )?;
//! println!("{} rows written to {}", summary.stats.output_rows, summary.output);
//! ```

use serde::Serialize;

use super::columns::select_columns;
use super::dataset::{DatasetSpec, ReshapeMode};
use super::reshape::{aggregate_mean, filter_window, melt_field, melt_wide, pass_through, pivot};
use crate::error::{NormalizeResult, SchemaResult};
use crate::logs::{DatasetLog, RUN_LOG};
use crate::models::{CanonicalTable, RawTable};
use crate::parser::ReadOptions;
use crate::storage::{TableSink, TableSource};

/// Counters collected while normalizing one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeStats {
    pub input_rows: usize,
    /// Rows removed by the all-missing prefilter.
    pub dropped_all_missing: usize,
    /// Rows with an empty country (or indicator) in aggregate mode.
    pub dropped_missing_key: usize,
    /// Rows whose year field did not resolve.
    pub dropped_unresolved_year: usize,
    /// Cells that were empty or not numeric.
    pub missing_values: usize,
    /// Aggregated (key, year) values before the window filter.
    pub aggregated_values: usize,
    pub outside_window: usize,
    pub output_rows: usize,
    pub year_columns: usize,
}

/// Result of normalizing one table.
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub table: CanonicalTable,
    pub stats: NormalizeStats,
}

/// Result of one dataset run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub dataset: String,
    pub input: String,
    pub output: String,
    pub stats: NormalizeStats,
    pub completed_at: String,
}

/// Normalize a raw table according to a dataset spec.
///
/// Required columns are checked before any row is looked at; a missing one
/// is the only way this fails.
pub fn normalize_table(spec: &DatasetSpec, raw: &RawTable) -> SchemaResult<NormalizeOutcome> {
    let selection = select_columns(
        &raw.headers,
        &spec.country_column,
        spec.indicator_column.as_deref(),
        &spec.year_rule,
    )?;

    let mut stats = NormalizeStats {
        input_rows: raw.len(),
        ..Default::default()
    };

    let table = match spec.reshape {
        ReshapeMode::PassThrough => pass_through(
            raw,
            &selection,
            spec.drop_all_missing,
            spec.trim_keys,
            &mut stats,
        ),
        ReshapeMode::Aggregate => {
            let triples = if spec.year_rule.is_per_column() {
                melt_wide(raw, &selection, spec.trim_keys, &mut stats)
            } else {
                melt_field(raw, &selection, spec.trim_keys, &mut stats)
            };

            let mut aggregated = aggregate_mean(triples);
            stats.aggregated_values = aggregated.len();

            if let Some(window) = &spec.year_window {
                aggregated = filter_window(aggregated, window, &mut stats);
            }

            pivot(&aggregated, spec.indicator_column.is_some())
        }
    };

    stats.output_rows = table.rows.len();
    stats.year_columns = table.years.len();

    Ok(NormalizeOutcome { table, stats })
}

/// Read, normalize and write one dataset.
pub fn run_dataset(
    spec: &DatasetSpec,
    source: &dyn TableSource,
    sink: &dyn TableSink,
) -> NormalizeResult<RunSummary> {
    spec.validate()?;
    let log = RUN_LOG.dataset(&spec.name);

    let input = source.describe(&spec.input_file);
    log.step(format!("reading {}", input));

    let raw = source.read_table(&spec.input_file, &ReadOptions::skip(spec.skip_rows))?;
    log.detail(format!("{} rows, {} columns", raw.len(), raw.headers.len()));

    let outcome = normalize_table(spec, &raw)?;
    print_stats(&log, &outcome.stats);

    let output = sink.write_table(&spec.output_file, &outcome.table)?;
    log.written(format!("New clean file saved: {}", output));

    Ok(RunSummary {
        dataset: spec.name.clone(),
        input,
        output,
        stats: outcome.stats,
        completed_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Run several datasets independently. One failure does not stop the rest.
pub fn run_all(
    specs: &[DatasetSpec],
    source: &dyn TableSource,
    sink: &dyn TableSink,
) -> Vec<(String, NormalizeResult<RunSummary>)> {
    specs
        .iter()
        .map(|spec| {
            let result = run_dataset(spec, source, sink);
            if let Err(ref e) = result {
                RUN_LOG.dataset(&spec.name).failed(e.to_string());
            }
            (spec.name.clone(), result)
        })
        .collect()
}

fn print_stats(log: &DatasetLog<'_>, stats: &NormalizeStats) {
    if stats.dropped_all_missing > 0 {
        log.dropped(format!(
            "{} rows dropped (no values in any year column)",
            stats.dropped_all_missing
        ));
    }
    if stats.dropped_missing_key > 0 {
        log.dropped(format!("{} rows dropped (missing key)", stats.dropped_missing_key));
    }
    if stats.dropped_unresolved_year > 0 {
        log.dropped(format!(
            "{} rows dropped (unresolvable year)",
            stats.dropped_unresolved_year
        ));
    }
    if stats.outside_window > 0 {
        log.detail(format!("{} values outside the year window", stats.outside_window));
    }
    log.detail(format!("{} rows x {} year columns", stats.output_rows, stats.year_columns));
}
