//! CSV serialization of normalized tables.
//!
//! Header row first, no index column, missing cells as empty fields.

use std::io::Write;

use crate::error::TableResult;
use crate::models::CanonicalTable;

/// Write a table as comma-separated CSV.
pub fn write_csv<W: Write>(table: &CanonicalTable, writer: W) -> TableResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(table.headers())?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(2 + row.values.len());
        record.push(row.key.country_name.clone());
        if table.has_indicator {
            record.push(row.key.indicator_name.clone().unwrap_or_default());
        }
        record.extend(row.values.iter().map(|c| c.render()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Serialize a table to a CSV string.
pub fn to_csv_string(table: &CanonicalTable) -> TableResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
