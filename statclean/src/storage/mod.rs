//! Where raw tables come from and where normalized tables go.
//!
//! The pipeline only sees the [`TableSource`] and [`TableSink`] traits.
//! [`DirSource`] / [`DirSink`] work on directories; [`MemorySource`] /
//! [`MemorySink`] keep everything in memory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TableError, TableResult};
use crate::models::{CanonicalTable, RawTable};
use crate::parser::{parse_bytes, parse_file, ReadOptions};
use crate::writer::{to_csv_string, write_csv};

/// Provides raw tables by name.
pub trait TableSource {
    fn read_table(&self, name: &str, options: &ReadOptions) -> TableResult<RawTable>;

    /// Human-readable location of a table, for logs.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Accepts normalized tables by name.
pub trait TableSink {
    /// Store a table and return where it went.
    fn write_table(&self, name: &str, table: &CanonicalTable) -> TableResult<String>;
}

// =============================================================================
// Filesystem
// =============================================================================

/// Reads `<dir>/<name>`.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl TableSource for DirSource {
    fn read_table(&self, name: &str, options: &ReadOptions) -> TableResult<RawTable> {
        let path = self.path(name);
        if !path.is_file() {
            return Err(TableError::NotFound(path.display().to_string()));
        }
        parse_file(&path, options)
    }

    fn describe(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }
}

/// Writes `<dir>/<name>`, creating the directory on first write.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl TableSink for DirSink {
    fn write_table(&self, name: &str, table: &CanonicalTable) -> TableResult<String> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(name);
        let file = fs::File::create(&path)?;
        write_csv(table, std::io::BufWriter::new(file))?;
        Ok(path.display().to_string())
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Raw CSV text keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.tables.insert(name.into(), content.into());
        self
    }
}

impl TableSource for MemorySource {
    fn read_table(&self, name: &str, options: &ReadOptions) -> TableResult<RawTable> {
        let content = self
            .tables
            .get(name)
            .ok_or_else(|| TableError::NotFound(name.to_string()))?;
        parse_bytes(content.as_bytes(), options)
    }
}

/// Collects serialized output keyed by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    written: RefCell<BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.written.borrow().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.written.borrow().keys().cloned().collect()
    }
}

impl TableSink for MemorySink {
    fn write_table(&self, name: &str, table: &CanonicalTable) -> TableResult<String> {
        let csv = to_csv_string(table)?;
        self.written.borrow_mut().insert(name.to_string(), csv);
        Ok(format!("memory:{}", name))
    }
}
