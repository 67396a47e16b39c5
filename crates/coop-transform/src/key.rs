//! Identity column canonicalization.

use coop_common::format_numeric;
use coop_model::{CellValue, ENTITY_KEY, Table, unique_column_name};

/// Renames the first column to `entity_key` and trims its values.
///
/// Key text is otherwise kept as read, leading zeros included. Numeric
/// cells (only built in memory; the loader keeps non-canonical numbers as
/// text) become their display text and blank keys become missing.
/// A later column that already carries the name `entity_key` is moved out of
/// the way first (`entity_key_{position}`). Other columns are untouched.
pub fn normalize_key(table: &mut Table) {
    if table.column_count() == 0 {
        return;
    }
    if let Some(position) = table.column_index(ENTITY_KEY).filter(|idx| *idx != 0) {
        let renamed = unique_column_name(ENTITY_KEY, position, |name| table.has_column(name));
        if let Some(column) = table.column_at_mut(position) {
            column.name = renamed;
        }
    }
    let Some(key) = table.column_at_mut(0) else {
        return;
    };
    key.name = ENTITY_KEY.to_string();
    for cell in &mut key.cells {
        *cell = match std::mem::replace(cell, CellValue::Missing) {
            CellValue::Text(value) => CellValue::text(value.trim()),
            CellValue::Number(value) => CellValue::Text(format_numeric(value)),
            CellValue::Missing => CellValue::Missing,
        };
    }
}

/// The key text of a cell, or `None` for missing/blank keys.
pub(crate) fn key_text(cell: &CellValue) -> Option<String> {
    let text = cell.display();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
