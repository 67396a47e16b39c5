//! Read-only views over a loaded table.
//!
//! These back the `inspect` command: the orchestration layer uses them to
//! look at a source table before deciding how to merge or align it.

use coop_model::{Table, TableError};

/// Row and column counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

pub fn table_shape(table: &Table) -> TableShape {
    TableShape {
        rows: table.row_count(),
        columns: table.column_count(),
    }
}

/// Trimmed, non-missing values of the first (identity) column.
pub fn first_column_values(table: &Table) -> Vec<String> {
    table
        .column_at(0)
        .map(|column| {
            column
                .cells
                .iter()
                .filter(|cell| !cell.is_missing())
                .map(|cell| cell.display().trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Header row followed by the first `n` rows, as display text.
pub fn head(table: &Table, n: usize) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(n.min(table.row_count()) + 1);
    out.push(
        table
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    for row in 0..n.min(table.row_count()) {
        out.push(
            table
                .columns()
                .iter()
                .map(|column| column.cells[row].display())
                .collect(),
        );
    }
    out
}

/// Up to `limit` display values of column `index`, starting at row `offset`.
///
/// Missing cells are `None`.
pub fn column_slice(
    table: &Table,
    index: usize,
    offset: usize,
    limit: usize,
) -> Result<Vec<Option<String>>, TableError> {
    let column = table.column_at(index).ok_or(TableError::IndexOutOfBounds {
        operation: "read column",
        index: index as i64,
        len: table.column_count(),
    })?;
    Ok(column
        .cells
        .iter()
        .skip(offset)
        .take(limit)
        .map(|cell| (!cell.is_missing()).then(|| cell.display()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_model::Column;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::from_texts("name", &["A", "", "C"]),
            Column::from_numbers("v", &[Some(1.0), Some(2.5), None]),
        ])
        .expect("table")
    }

    #[test]
    fn shape_and_first_column() {
        let table = sample();
        assert_eq!(table_shape(&table), TableShape { rows: 3, columns: 2 });
        assert_eq!(first_column_values(&table), vec!["A", "C"]);
        assert!(first_column_values(&Table::new()).is_empty());
    }

    #[test]
    fn head_includes_header() {
        let rows = head(&sample(), 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["name", "v"]);
        assert_eq!(rows[2], vec!["", "2.5"]);
        assert_eq!(head(&sample(), 10).len(), 4);
    }

    #[test]
    fn column_slice_pages() {
        let table = sample();
        let slice = column_slice(&table, 1, 1, 5).expect("slice");
        assert_eq!(slice, vec![Some("2.5".to_string()), None]);
        let err = column_slice(&table, 2, 0, 5).unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfBounds { index: 2, len: 2, .. }));
    }
}
