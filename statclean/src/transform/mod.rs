//! Reshape-and-normalize transformation.
//!
//! - Columns: year column rules and selection
//! - Year: year field resolution (single years and ranges)
//! - Reshape: melt, mean aggregation, window filter, pivot
//! - Dataset: normalizer configurations
//! - Pipeline: orchestration over a source and a sink

pub mod columns;
pub mod dataset;
pub mod pipeline;
pub mod reshape;
pub mod year;

pub use columns::{select_columns, ColumnSelection, YearColumn, YearRule};
pub use dataset::{DatasetKind, DatasetSpec, ReshapeMode};
pub use pipeline::*;
pub use reshape::{
    aggregate_mean, filter_window, melt_field, melt_wide, pass_through, pivot, YearWindow,
};
pub use year::{midpoint_year, resolve_year_cell, resolve_year_text, year_runs};
