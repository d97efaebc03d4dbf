//! Render decoded records as CSV: the full per-field table, or the three-column summary.

use crate::frame::DecodedRecord;
use crate::schema::Schema;
use crate::table::transpose;
use std::io::{self, Write};

pub const SUMMARY_HEADER: [&str; 3] = ["Parameter", "Result", "Reference Range"];

fn needs_quoting(cell: &str) -> bool {
    cell.contains([',', '"', '\r', '\n'])
}

/// Write one row, Excel dialect: comma separated, CRLF terminated, minimal quoting.
pub fn write_csv_row<W, S>(w: &mut W, cells: &[S]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quoting(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Header row of field names, then one row per histogram sample.
pub fn write_record_csv<W: Write + ?Sized>(w: &mut W, record: &DecodedRecord) -> io::Result<()> {
    let header: Vec<&str> = record.names().collect();
    write_csv_row(w, &header)?;
    for row in transpose(record.columns()) {
        write_csv_row(w, &row)?;
    }
    Ok(())
}

/// `[label, value, reference range]` for every field of `schema` that has a reference
/// range, in schema order. Fields missing from the record are skipped.
pub fn summary_rows(record: &DecodedRecord, schema: &Schema) -> Vec<[String; 3]> {
    schema
        .fields()
        .iter()
        .filter_map(|f| {
            let range = schema.reference_range(&f.name)?;
            let value = record.get(&f.name)?;
            Some([f.name.clone(), value.to_string(), range.to_string()])
        })
        .collect()
}

pub fn write_summary_csv<W: Write + ?Sized>(
    w: &mut W,
    record: &DecodedRecord,
    schema: &Schema,
) -> io::Result<()> {
    write_csv_row(w, &SUMMARY_HEADER)?;
    for row in summary_rows(record, schema) {
        write_csv_row(w, &row)?;
    }
    Ok(())
}
