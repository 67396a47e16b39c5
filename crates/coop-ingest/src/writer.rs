//! Delimited table writing.
//!
//! Output is a whole-file rewrite: header row, then one record per row, with
//! numbers printed without trailing zeros and missing cells left empty.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use coop_model::Table;

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Options for writing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Prefix the file with a UTF-8 byte-order mark.
    pub bom: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { bom: true }
    }
}

impl WriteOptions {
    pub fn with_bom(mut self, enable: bool) -> Self {
        self.bom = enable;
        self
    }
}

/// Serializes `table` to `output`.
pub fn write_csv_table_to_writer<W: Write>(
    table: &Table,
    mut output: W,
    options: WriteOptions,
    target: &Path,
) -> Result<()> {
    if options.bom {
        output
            .write_all(UTF8_BOM)
            .map_err(|e| IngestError::FileWrite {
                path: target.to_path_buf(),
                source: e,
            })?;
    }
    let mut writer = WriterBuilder::new().from_writer(output);
    writer
        .write_record(table.column_names())
        .map_err(|e| IngestError::csv(target, e))?;
    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.cells[row].display())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| IngestError::csv(target, e))?;
    }
    writer.flush().map_err(|e| IngestError::FileWrite {
        path: target.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Writes `table` to `path`, replacing any existing file.
///
/// Parent directories are created when missing.
pub fn write_csv_table(table: &Table, path: &Path, options: WriteOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_csv_table_to_writer(table, BufWriter::new(file), options, path)?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "wrote table"
    );
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes to a temporary sibling file, then renames it over `path`.
///
/// A crash mid-write leaves the previous file intact.
pub fn write_csv_table_atomic(table: &Table, path: &Path, options: WriteOptions) -> Result<()> {
    let tmp = temporary_sibling(path);
    write_csv_table(table, &tmp, options)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IngestError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
