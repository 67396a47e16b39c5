//! Delimited table loading.
//!
//! The first non-blank record is the header row. Cells are trimmed and typed
//! with [`CellValue::infer`]; blank lines are skipped and ragged rows are
//! padded or truncated to the header width.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use coop_model::{CellValue, Table};

use crate::error::{IngestError, Result};

const BOM: char = '\u{feff}';

fn normalize_header(raw: &str, position: usize) -> String {
    let trimmed = raw.trim().trim_matches(BOM);
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    if normalized.is_empty() {
        format!("unnamed_{position}")
    } else {
        normalized
    }
}

fn normalize_cell(raw: &str) -> CellValue {
    CellValue::infer(raw.trim_matches(BOM))
}

/// Header names of a CSV file, without reading its body.
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(path, e))?;
        if record.iter().all(|value| value.trim().trim_matches(BOM).is_empty()) {
            continue;
        }
        return Ok(record
            .iter()
            .enumerate()
            .map(|(idx, value)| normalize_header(value, idx))
            .collect());
    }
    Err(IngestError::MissingHeader {
        path: path.to_path_buf(),
    })
}

/// Reads a CSV file into a [`Table`].
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let table = read_csv_table_from_reader(file, path)?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Reads CSV data from any reader. `source` names the input in errors.
pub fn read_csv_table_from_reader<R: Read>(input: R, source: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(source, e))?;
        if record.iter().all(|value| value.trim().trim_matches(BOM).is_empty()) {
            continue;
        }
        if headers.is_none() {
            headers = Some(
                record
                    .iter()
                    .enumerate()
                    .map(|(idx, value)| normalize_header(value, idx))
                    .collect(),
            );
            continue;
        }
        rows.push(record.iter().map(normalize_cell).collect());
    }
    let Some(headers) = headers else {
        return Err(IngestError::MissingHeader {
            path: source.to_path_buf(),
        });
    };
    Ok(Table::from_rows(&headers, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        read_csv_table_from_reader(text.as_bytes(), Path::new("inline.csv")).expect("parse")
    }

    #[test]
    fn header_whitespace_is_collapsed() {
        let table = parse("  Cooperativa ,Total   Activos\nA,1\n");
        assert_eq!(table.column_names(), vec!["Cooperativa", "Total Activos"]);
    }

    #[test]
    fn blank_header_gets_positional_name() {
        let table = parse("name,,x\na,1,2\n");
        assert_eq!(table.column_names(), vec!["name", "unnamed_1", "x"]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let table = parse("\u{feff}name,v\nA,1\n");
        assert_eq!(table.column_names()[0], "name");
    }

    #[test]
    fn cells_are_typed() {
        let table = parse("name,v,w\nA, 1.5 ,\nB,n/a,3\n");
        assert_eq!(table.cell(0, 1), Some(&CellValue::Number(1.5)));
        assert_eq!(table.cell(0, 2), Some(&CellValue::Missing));
        assert_eq!(table.cell(1, 1), Some(&CellValue::text("n/a")));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = parse("name,v\n\nA,1\n,\nB,2\n");
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_csv_table_from_reader("".as_bytes(), Path::new("empty.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader { .. }));
    }

    #[test]
    fn header_only_input_is_an_empty_table() {
        let table = parse("name,v\n");
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }
}
