//! Sequential left-outer merge of source tables on `entity_key`.
//!
//! The first table anchors the run: its rows, in order, are the rows of the
//! result. Every later table contributes columns only.

use std::collections::HashMap;

use tracing::{debug, error, info_span, warn};

use coop_model::{Column, ENTITY_KEY, EventLog, Result, Stage, Table, TableError, unique_column_name};

use crate::key::{key_text, normalize_key};

/// First-seen row index per key. Rows with missing keys are not indexed.
///
/// Returns the index and the number of duplicate rows ignored.
fn index_keys(table: &Table) -> (HashMap<String, usize>, usize) {
    let mut index = HashMap::new();
    let mut duplicates = 0;
    let Some(keys) = table.column_at(0) else {
        return (index, duplicates);
    };
    for (row, cell) in keys.cells.iter().enumerate() {
        let Some(key) = key_text(cell) else {
            continue;
        };
        if index.contains_key(&key) {
            duplicates += 1;
        } else {
            index.insert(key, row);
        }
    }
    (index, duplicates)
}

/// Source row for every master row; missing master keys never match.
fn match_rows(master: &Table, index: &HashMap<String, usize>) -> Vec<Option<usize>> {
    match master.column(ENTITY_KEY) {
        Some(keys) => keys
            .cells
            .iter()
            .map(|cell| key_text(cell).and_then(|key| index.get(&key).copied()))
            .collect(),
        None => vec![None; master.row_count()],
    }
}

/// Joins `incoming` onto `master`, renaming collisions from `position`.
fn join_into(master: &mut Table, incoming: &Table, position: usize) -> Result<usize> {
    let (index, _) = index_keys(incoming);
    let positions = match_rows(master, &index);
    let matched = positions.iter().flatten().count();
    let aligned = incoming.take_rows(&positions);

    let mut columns: Vec<Column> = Vec::with_capacity(aligned.column_count().saturating_sub(1));
    for mut column in aligned.into_columns().into_iter().skip(1) {
        let taken = |name: &str| master.has_column(name) || columns.iter().any(|c| c.name == name);
        if taken(&column.name) {
            let renamed = unique_column_name(&column.name, position, taken);
            debug!(from = %column.name, to = %renamed, "renamed colliding column");
            column.name = renamed;
        }
        columns.push(column);
    }
    master.append_columns(columns)?;
    Ok(matched)
}

/// Merges `tables` in order into one master table.
///
/// Empty incoming tables are skipped with a warning. Within an incoming
/// table the first row for a key wins; later duplicates are counted in the
/// event log. Master row count and order never change after the first
/// table, and columns are appended in list order.
pub fn merge_sequential(tables: Vec<Table>, events: &mut EventLog) -> Result<Table> {
    let span = info_span!("merge", tables = tables.len());
    let _guard = span.enter();

    let mut tables = tables.into_iter().enumerate();
    let Some((_, mut master)) = tables.next() else {
        return Err(TableError::NoInput {
            operation: "merge tables",
        });
    };
    normalize_key(&mut master);
    debug!(
        rows = master.row_count(),
        columns = master.column_count(),
        "anchored master table"
    );

    for (position, mut incoming) in tables {
        if incoming.is_empty() || incoming.column_count() == 0 {
            warn!(position, "skipping empty table");
            events.warn(Stage::Merge, format!("table {position} is empty, skipped"));
            continue;
        }
        normalize_key(&mut incoming);
        let (_, duplicates) = index_keys(&incoming);
        if duplicates > 0 {
            warn!(position, duplicates, "duplicate keys in incoming table");
            events.warn(
                Stage::Merge,
                format!("table {position}: {duplicates} duplicate key row(s) ignored, first kept"),
            );
        }
        let matched = join_into(&mut master, &incoming, position)?;
        debug!(
            position,
            matched,
            columns = incoming.column_count().saturating_sub(1),
            "merged table"
        );
        if matched == 0 && master.row_count() > 0 {
            error!(position, "no key matched a master row");
            events.error(
                Stage::Merge,
                format!("table {position}: no key matched any of {} master row(s)", master.row_count()),
            );
        } else {
            events.info(
                Stage::Merge,
                format!(
                    "table {position}: matched {matched} of {} master row(s)",
                    master.row_count()
                ),
            );
        }
    }
    Ok(master)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_model::CellValue;

    fn table(key: &str, keys: &[&str], name: &str, values: &[Option<f64>]) -> Table {
        Table::from_columns(vec![
            Column::from_texts(key, keys),
            Column::from_numbers(name, values),
        ])
        .expect("table")
    }

    #[test]
    fn empty_list_is_an_error() {
        let err = merge_sequential(Vec::new(), &mut EventLog::new()).unwrap_err();
        assert!(matches!(err, TableError::NoInput { .. }));
    }

    #[test]
    fn single_table_is_normalized_only() {
        let mut events = EventLog::new();
        let merged = merge_sequential(
            vec![table("Cooperativa", &[" A ", "B"], "v", &[Some(1.0), Some(2.0)])],
            &mut events,
        )
        .expect("merge");
        assert_eq!(merged.column_names(), vec!["entity_key", "v"]);
        assert_eq!(merged.cell(0, 0), Some(&CellValue::text("A")));
        assert!(events.is_empty());
    }

    #[test]
    fn collisions_use_list_position() {
        let tables = vec![
            table("k", &["A"], "v", &[Some(1.0)]),
            table("k", &["A"], "v", &[Some(2.0)]),
            table("k", &["A"], "v", &[Some(3.0)]),
        ];
        let merged = merge_sequential(tables, &mut EventLog::new()).expect("merge");
        assert_eq!(merged.column_names(), vec!["entity_key", "v", "v_1", "v_2"]);
    }

    #[test]
    fn collision_suffix_skips_taken_names() {
        let anchor = Table::from_columns(vec![
            Column::from_texts("k", &["A"]),
            Column::from_numbers("v", &[Some(1.0)]),
            Column::from_numbers("v_1", &[Some(1.5)]),
        ])
        .expect("table");
        let tables = vec![anchor, table("k", &["A"], "v", &[Some(2.0)])];
        let merged = merge_sequential(tables, &mut EventLog::new()).expect("merge");
        assert_eq!(merged.column_names(), vec!["entity_key", "v", "v_1", "v_2"]);
    }

    #[test]
    fn duplicates_keep_first_and_warn() {
        let mut events = EventLog::new();
        let tables = vec![
            table("k", &["A", "B"], "v", &[Some(1.0), Some(2.0)]),
            table("k", &["A", "A", "B"], "w", &[Some(10.0), Some(11.0), Some(12.0)]),
        ];
        let merged = merge_sequential(tables, &mut events).expect("merge");
        assert_eq!(merged.column("w").expect("w").numbers(), vec![10.0, 12.0]);
        assert_eq!(events.warning_count(), 1);
    }

    #[test]
    fn empty_incoming_tables_are_skipped() {
        let mut events = EventLog::new();
        let tables = vec![
            table("k", &["A"], "v", &[Some(1.0)]),
            Table::new(),
            table("k", &[], "w", &[]),
        ];
        let merged = merge_sequential(tables, &mut events).expect("merge");
        assert_eq!(merged.column_names(), vec!["entity_key", "v"]);
        assert_eq!(events.for_stage(Stage::Merge).count(), 2);
        assert_eq!(events.warning_count(), 2);
    }

    #[test]
    fn missing_master_keys_never_match() {
        let tables = vec![
            table("k", &["", "A"], "v", &[Some(1.0), Some(2.0)]),
            table("k", &["", "A"], "w", &[Some(5.0), Some(6.0)]),
        ];
        let merged = merge_sequential(tables, &mut EventLog::new()).expect("merge");
        let w = merged.column("w").expect("w");
        assert!(w.cells[0].is_missing());
        assert_eq!(w.cells[1], CellValue::Number(6.0));
    }

    #[test]
    fn disjoint_keys_record_an_error() {
        let mut events = EventLog::new();
        let tables = vec![
            table("k", &["A", "B"], "v", &[Some(1.0), Some(2.0)]),
            table("k", &["C"], "w", &[Some(3.0)]),
        ];
        let merged = merge_sequential(tables, &mut events).expect("merge");
        assert!(merged.column("w").expect("w").is_all_missing());
        assert_eq!(events.error_count(), 1);
    }

    #[test]
    fn empty_anchor_keeps_zero_rows() {
        let tables = vec![
            table("k", &[], "v", &[]),
            table("k", &["A"], "w", &[Some(1.0)]),
        ];
        let merged = merge_sequential(tables, &mut EventLog::new()).expect("merge");
        assert_eq!(merged.row_count(), 0);
        assert_eq!(merged.column_names(), vec!["entity_key", "v", "w"]);
    }
}
