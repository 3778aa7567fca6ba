//! CSV input files

use super::rules::lowercase_headers;
use super::table::{Table, Value};
use crate::Result;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// How header names are treated on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCase {
    /// Keep header names exactly as written
    Preserve,
    /// Lower-case header names
    Lower,
}

/// Read a header-named CSV file into a table
pub fn read_table(path: &Path, header_case: HeaderCase) -> Result<Table> {
    let file = File::open(path)?;
    let table = read_table_from_reader(file, header_case)?;
    info!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read CSV from any reader; empty fields become nulls, whitespace is kept
pub fn read_table_from_reader<R: Read>(reader: R, header_case: HeaderCase) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(headers);

    for record in rdr.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| (!field.is_empty()).then(|| Value::Text(field.to_string())))
            .collect();
        table.push_row(row);
    }

    Ok(match header_case {
        HeaderCase::Preserve => table,
        HeaderCase::Lower => lowercase_headers(table),
    })
}
