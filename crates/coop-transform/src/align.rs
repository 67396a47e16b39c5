//! Column alignment through externally computed row mappings.
//!
//! Mappings come from elsewhere (fuzzy name matching, manual curation); this
//! module checks them against both tables and copies columns across. Every
//! check runs and every new column is built before the master is touched.

use tracing::{debug, error, info_span, warn};

use coop_model::{
    CellValue, Column, DEFAULT_LABEL_COLUMN, ENTITY_KEY, EventLog, IndexMapping, Result, Stage,
    Table, TableError, unique_column_name,
};

use crate::rating::resolve_worst_rating;

/// Appends every non-key column of `source` to `master`, row-aligned by
/// `mapping`.
///
/// Unmatched master rows get missing cells and are counted as a warning; a
/// mapping that matches no master row at all is recorded as an error event.
/// Name collisions are renamed to `{name}_1`, `{name}_2`, ... Returns the
/// number of columns appended.
pub fn append_by_mapping(
    master: &mut Table,
    source: &Table,
    mapping: &IndexMapping,
    events: &mut EventLog,
) -> Result<usize> {
    let span = info_span!("align", rows = master.row_count(), source_rows = source.row_count());
    let _guard = span.enter();

    mapping.validate("append by mapping", master.row_count(), source.row_count())?;
    let aligned = source.take_rows(mapping.entries());

    let mut columns: Vec<Column> = Vec::with_capacity(aligned.column_count().saturating_sub(1));
    for mut column in aligned.into_columns().into_iter().skip(1) {
        let taken = |name: &str| master.has_column(name) || columns.iter().any(|c| c.name == name);
        if taken(&column.name) {
            let renamed = unique_column_name(&column.name, 1, taken);
            debug!(from = %column.name, to = %renamed, "renamed colliding column");
            column.name = renamed;
        }
        columns.push(column);
    }
    let appended = columns.len();
    master.append_columns(columns)?;

    let unmatched = mapping.unmatched_count();
    if unmatched > 0 && unmatched == master.row_count() {
        error!(unmatched, "no master row has a source row");
        events.error(
            Stage::Align,
            format!("none of {unmatched} master row(s) had a source row; appended columns are empty"),
        );
    } else if unmatched > 0 {
        warn!(unmatched, "master rows without a source row");
        events.warn(
            Stage::Align,
            format!("{unmatched} master row(s) had no source row"),
        );
    }
    events.info(Stage::Align, format!("appended {appended} column(s)"));
    Ok(appended)
}

/// Resolves `column` of `source` through `mapping` into the `Label` column.
///
/// See [`append_rating_into`].
pub fn append_rating_by_mapping(
    master: &mut Table,
    source: &Table,
    column: &str,
    mapping: &IndexMapping,
    events: &mut EventLog,
) -> Result<()> {
    append_rating_into(master, source, column, mapping, DEFAULT_LABEL_COLUMN, events)
}

/// Resolves `column` of `source` through `mapping` into `label_column`.
///
/// Each matched cell is reduced to its worst rating. Unmatched rows and
/// unresolvable ratings become empty labels and are counted as a warning.
/// An existing label column is overwritten in place.
pub fn append_rating_into(
    master: &mut Table,
    source: &Table,
    column: &str,
    mapping: &IndexMapping,
    label_column: &str,
    events: &mut EventLog,
) -> Result<()> {
    let span = info_span!("rating", column, label_column);
    let _guard = span.enter();

    const OPERATION: &str = "append rating by mapping";
    mapping.validate(OPERATION, master.row_count(), source.row_count())?;
    let ratings = source.column(column).ok_or_else(|| TableError::MissingColumn {
        operation: OPERATION,
        column: column.to_string(),
    })?;

    let mut unresolved = 0usize;
    let cells: Vec<CellValue> = mapping
        .entries()
        .iter()
        .map(|entry| {
            let label = entry
                .and_then(|row| ratings.cells.get(row))
                .map(|cell| resolve_worst_rating(&cell.display()))
                .unwrap_or_default();
            if label.is_empty() {
                unresolved += 1;
            }
            CellValue::text(label.as_str())
        })
        .collect();
    master.set_column(Column::new(label_column, cells))?;

    if unresolved > 0 {
        warn!(unresolved, "rows without a resolvable rating");
        events.warn(
            Stage::Rating,
            format!("{unresolved} row(s) left without a rating label"),
        );
    }
    Ok(())
}

/// Builds a master table from parallel name and abbreviation lists.
///
/// Names become the `entity_key` column, trimmed.
pub fn create_master(
    names: &[String],
    abbreviations: &[String],
    abbreviation_column: &str,
) -> Result<Table> {
    if names.len() != abbreviations.len() {
        return Err(TableError::LengthMismatch {
            operation: "create master",
            expected: names.len(),
            actual: abbreviations.len(),
        });
    }
    let keys = names.iter().map(|name| CellValue::text(name.trim())).collect();
    let abbreviations = abbreviations
        .iter()
        .map(|abbr| CellValue::text(abbr.trim()))
        .collect();
    Table::from_columns(vec![
        Column::new(ENTITY_KEY, keys),
        Column::new(abbreviation_column, abbreviations),
    ])
}

/// Writes a ready-made label list into `label_column`.
pub fn append_labels(table: &mut Table, labels: &[String], label_column: &str) -> Result<()> {
    if labels.len() != table.row_count() {
        return Err(TableError::LengthMismatch {
            operation: "append labels",
            expected: table.row_count(),
            actual: labels.len(),
        });
    }
    let cells = labels.iter().map(|label| CellValue::text(label.trim())).collect();
    table.set_column(Column::new(label_column, cells))
}
