//! Manual corrections to a table before or between stages.

use std::collections::HashSet;

use coop_model::{Result, Table, TableError};

/// Removes the named columns. Unknown names are ignored.
///
/// Returns the number of columns removed.
pub fn delete_columns(table: &mut Table, names: &[String]) -> usize {
    let names: HashSet<&str> = names.iter().map(String::as_str).collect();
    table
        .retain_columns(|column| !names.contains(column.name.as_str()))
        .len()
}

/// Removes the rows whose cell in column `column_index` displays as one of
/// `values` (exact match). Returns the number of rows removed.
pub fn delete_rows_by_values(
    table: &mut Table,
    column_index: usize,
    values: &[String],
) -> Result<usize> {
    let column = table
        .column_at(column_index)
        .ok_or(TableError::IndexOutOfBounds {
            operation: "delete rows",
            index: column_index as i64,
            len: table.column_count(),
        })?;
    let values: HashSet<&str> = values.iter().map(String::as_str).collect();
    let mask: Vec<bool> = column
        .cells
        .iter()
        .map(|cell| !values.contains(cell.display().as_str()))
        .collect();
    table.filter_rows(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_model::Column;

    fn table() -> Table {
        Table::from_columns(vec![
            Column::from_texts("name", &["Coop1", "TOTAL", "Coop2", ""]),
            Column::from_numbers("v", &[Some(1.0), Some(3.0), Some(2.0), None]),
        ])
        .expect("table")
    }

    #[test]
    fn deletes_known_columns_only() {
        let mut table = table();
        let removed = delete_columns(&mut table, &["v".to_string(), "nope".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(table.column_names(), vec!["name"]);
    }

    #[test]
    fn deletes_rows_by_display_text() {
        let mut table = table();
        let removed =
            delete_rows_by_values(&mut table, 0, &["TOTAL".to_string(), String::new()])
                .expect("delete");
        assert_eq!(removed, 2);
        assert_eq!(table.column("v").expect("v").numbers(), vec![1.0, 2.0]);

        let removed = delete_rows_by_values(&mut table, 1, &["2".to_string()]).expect("delete");
        assert_eq!(removed, 1);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn bad_column_index_is_rejected() {
        let err = delete_rows_by_values(&mut table(), 7, &[]).unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfBounds { index: 7, len: 2, .. }));
    }
}
