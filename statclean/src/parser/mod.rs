//! Raw table reader with encoding and delimiter auto-detection.
//!
//! Turns CSV-like bytes into a [`RawTable`]. No dataset-specific logic here:
//! cells stay untrimmed text (or `Missing` when empty or an NA marker) until
//! a normalizer decides what to do with them.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{TableError, TableResult};
use crate::models::{Cell, RawRecord, RawTable};

/// Field values read as missing, on top of the empty string.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How to read one raw file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Number of leading lines to discard before the header row.
    pub skip_rows: usize,
    /// Field delimiter; auto-detected from the header row when `None`.
    pub delimiter: Option<char>,
    /// Exact field values that mean "no data".
    pub na_values: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            delimiter: None,
            na_values: DEFAULT_NA_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl ReadOptions {
    pub fn skip(skip_rows: usize) -> Self {
        Self {
            skip_rows,
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Replace the NA marker set. An empty set leaves only empty fields missing.
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    fn cell(&self, raw: &str) -> Cell {
        if self.na_values.iter().any(|na| na == raw) {
            Cell::Missing
        } else {
            Cell::from_raw(raw)
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Drop the first `n` lines of `content`.
fn skip_lines(content: &str, n: usize) -> &str {
    let mut rest = content;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// Make header names unique: repeats get `.1`, `.2`, ... suffixes. A
/// suffixed name that is already taken gets suffixed again (`a,a,a.1` reads
/// as `a, a.1, a.1.1`).
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|header| {
            let mut name = header;
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

/// Parse decoded text into a table.
///
/// # Example
/// ```ignore
/// use statclean::parser::{parse_str, ReadOptions};
///
/// let table = parse_str("Area,Value\nChad,3", &ReadOptions::default()).unwrap();
/// assert_eq!(table.headers, vec!["Area", "Value"]);
/// ```
pub fn parse_str(content: &str, options: &ReadOptions) -> TableResult<RawTable> {
    let body = skip_lines(content, options.skip_rows);
    if body.trim().is_empty() {
        return Err(TableError::Empty);
    }

    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(body));
    let mut delim_buf = [0u8; 4];
    let delim_bytes = delimiter.encode_utf8(&mut delim_buf).as_bytes();
    if delim_bytes.len() != 1 {
        return Err(TableError::Parse {
            line: 0,
            message: format!("Unsupported delimiter '{}'", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim_bytes[0])
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = reader.records();

    let header_record = records
        .next()
        .ok_or(TableError::Empty)?
        .map_err(|e| parse_error(e, options.skip_rows))?;

    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::NoHeaders);
    }
    let headers = dedupe_headers(headers);

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| parse_error(e, options.skip_rows))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let cells = (0..headers.len())
            .map(|i| record.get(i).map(|f| options.cell(f)).unwrap_or(Cell::Missing))
            .collect();
        rows.push(RawRecord::new(cells));
    }

    Ok(RawTable::new(headers, rows))
}

fn parse_error(err: csv::Error, skipped: usize) -> TableError {
    let line = err
        .position()
        .map(|p| p.line() + skipped as u64)
        .unwrap_or(0);
    TableError::Parse {
        line,
        message: err.to_string(),
    }
}

/// Parse bytes with encoding auto-detection. Valid UTF-8 is taken as is.
pub fn parse_bytes(bytes: &[u8], options: &ReadOptions) -> TableResult<RawTable> {
    let encoding = match std::str::from_utf8(bytes) {
        Ok(_) => "utf-8".to_string(),
        Err(_) => detect_encoding(bytes),
    };
    let content = decode_content(bytes, &encoding);
    parse_str(&content, options)
}

/// Read and parse a file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> TableResult<RawTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, options)
}
