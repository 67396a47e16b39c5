//! Tests for coop-model types.

use coop_model::{CellValue, Column, IndexMapping, Table, TableError};
use proptest::prelude::*;

#[test]
fn table_round_trips_through_json() {
    let table = Table::from_columns(vec![
        Column::from_texts("entity_key", &["Coop1", "Coop2"]),
        Column::from_numbers("assets", &[Some(10.0), None]),
    ])
    .expect("table");
    let json = serde_json::to_string(&table).expect("serialize table");
    let round: Table = serde_json::from_str(&json).expect("deserialize table");
    assert_eq!(round, table);
}

#[test]
fn from_rows_pads_and_truncates() {
    let headers = vec!["a".to_string(), "b".to_string()];
    let table = Table::from_rows(
        &headers,
        vec![
            vec![CellValue::text("1")],
            vec![
                CellValue::text("2"),
                CellValue::text("3"),
                CellValue::text("extra"),
            ],
        ],
    )
    .expect("table");
    assert_eq!(table.row_count(), 2);
    assert!(table.cell(0, 1).expect("cell").is_missing());
    assert_eq!(table.cell(1, 1), Some(&CellValue::text("3")));
}

#[test]
fn rename_out_of_bounds() {
    let mut table = Table::from_columns(vec![Column::from_texts("a", &["x"])]).expect("table");
    let err = table.rename_column_at(3, "b").unwrap_err();
    assert_eq!(
        err,
        TableError::IndexOutOfBounds {
            operation: "rename column",
            index: 3,
            len: 1
        }
    );
}

#[test]
fn error_messages_name_the_operation() {
    let err = TableError::LengthMismatch {
        operation: "append by mapping",
        expected: 3,
        actual: 2,
    };
    assert_eq!(
        err.to_string(),
        "append by mapping: length mismatch, expected 3 but got 2"
    );
    let err = TableError::MissingOutput {
        operation: "append labels",
    };
    assert!(err.to_string().starts_with("append labels:"));
}

proptest! {
    #[test]
    fn signed_mapping_round_trips(values in prop::collection::vec(-1i64..50, 0..40)) {
        let mapping = IndexMapping::from_signed(&values).expect("valid mapping");
        prop_assert_eq!(mapping.len(), values.len());
        prop_assert_eq!(mapping.to_signed(), values);
    }

    #[test]
    fn take_rows_preserves_requested_length(
        positions in prop::collection::vec(prop::option::of(0usize..10), 0..30)
    ) {
        let table = Table::from_columns(vec![Column::from_numbers(
            "v",
            &[Some(1.0), Some(2.0), Some(3.0)],
        )])
        .expect("table");
        let taken = table.take_rows(&positions);
        prop_assert_eq!(taken.row_count(), positions.len());
    }
}
