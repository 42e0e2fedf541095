//! # statclean - country-by-year indicator normalization
//!
//! statclean reshapes statistical extracts from international agencies
//! (World Bank, FAOSTAT, ...) into one canonical wide layout so they can be
//! joined on `country_name` and year.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │   Raw CSV   │────▶│   Parser    │────▶│    Transform     │────▶│  Clean CSV  │
//! │ (any layout)│     │ (auto-enc)  │     │ (select, resolve │     │ (wide, one  │
//! └─────────────┘     └─────────────┘     │  melt, mean,     │     │ col / year) │
//!                                         │  pivot)          │     └─────────────┘
//!                                         └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use statclean::{run_dataset, DatasetKind, DirSink, DirSource};
//!
//! let source = DirSource::new("data/raw");
//! let sink = DirSink::new("data/processed");
//! for kind in DatasetKind::ALL {
//!     run_dataset(&kind.spec(), &source, &sink)?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Cells, raw tables, keys, canonical tables
//! - [`parser`] - Raw table reading with encoding/delimiter detection
//! - [`writer`] - CSV serialization of canonical tables
//! - [`storage`] - Table sources and sinks
//! - [`transform`] - Column rules, year resolution, reshape, pipeline
//! - [`config`] - Input/output directory resolution
//! - [`logs`] - Run logging

// Core modules
pub mod error;
pub mod models;

// I/O
pub mod parser;
pub mod storage;
pub mod writer;

// Transformation
pub mod transform;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{NormalizeError, NormalizeResult, SchemaError, SpecError, TableError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CanonicalKey,
    CanonicalRow,
    CanonicalTable,
    Cell,
    LongTriple,
    RawRecord,
    RawTable,
    COUNTRY_NAME,
    INDICATOR_NAME,
};

// =============================================================================
// Re-exports - I/O
// =============================================================================

pub use parser::{parse_bytes, parse_file, parse_str, ReadOptions};
pub use storage::{DirSink, DirSource, MemorySink, MemorySource, TableSink, TableSource};
pub use writer::{to_csv_string, write_csv};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    normalize_table,
    run_all,
    run_dataset,
    DatasetKind,
    DatasetSpec,
    NormalizeOutcome,
    NormalizeStats,
    ReshapeMode,
    RunSummary,
    YearRule,
    YearWindow,
};

pub use config::RunConfig;
