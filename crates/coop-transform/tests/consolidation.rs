use coop_model::{
    CellValue, Column, ConsolidationOptions, ENTITY_KEY, EventLog, IndexMapping, Stage, Table,
    TableError,
};
use coop_transform::{
    ConsolidationRun, append_by_mapping, drop_useless_columns, merge_sequential,
    normalize_and_finalize,
};

fn keyed(key_name: &str, keys: &[&str], value_name: &str, values: &[f64]) -> Table {
    let values: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    Table::from_columns(vec![
        Column::from_texts(key_name, keys),
        Column::from_numbers(value_name, &values),
    ])
    .expect("table")
}

fn scenario() -> Vec<Table> {
    vec![
        keyed("Cooperativa", &["Coop1", "Coop2"], "activos", &[10.0, 20.0]),
        keyed("Entidad", &["Coop2", "Coop1", "Coop3"], "pasivos", &[5.0, 1.0, 99.0]),
        keyed("nombre", &["Coop1"], "roe", &[7.0]),
    ]
}

#[test]
fn three_way_merge_scenario() {
    let mut events = EventLog::new();
    let merged = merge_sequential(scenario(), &mut events).expect("merge");

    assert_eq!(
        merged.column_names(),
        vec![ENTITY_KEY, "activos", "pasivos", "roe"]
    );
    assert_eq!(merged.row_count(), 2);

    let coop1 = merged.row(0).expect("row 0");
    assert_eq!(coop1[0], &CellValue::text("Coop1"));
    assert_eq!(coop1[1], &CellValue::Number(10.0));
    assert_eq!(coop1[2], &CellValue::Number(1.0));
    assert_eq!(coop1[3], &CellValue::Number(7.0));

    let coop2 = merged.row(1).expect("row 1");
    assert_eq!(coop2[0], &CellValue::text("Coop2"));
    assert_eq!(coop2[1], &CellValue::Number(20.0));
    assert_eq!(coop2[2], &CellValue::Number(5.0));
    assert!(coop2[3].is_missing());
    assert_eq!(events.warning_count(), 0);
}

#[test]
fn merge_column_order_is_deterministic() {
    let first = merge_sequential(scenario(), &mut EventLog::new()).expect("merge");
    let second = merge_sequential(scenario(), &mut EventLog::new()).expect("merge");
    assert_eq!(first, second);
    insta::assert_debug_snapshot!(first.column_names(), @r#"
    [
        "entity_key",
        "activos",
        "pasivos",
        "roe",
    ]
    "#);
}

#[test]
fn same_named_columns_from_every_source() {
    let tables = vec![
        keyed("k", &["A"], "total", &[1.0]),
        keyed("k", &["A"], "total", &[2.0]),
        keyed("k", &["A"], "total", &[3.0]),
        keyed("k", &["A"], "total_2", &[4.0]),
    ];
    let merged = merge_sequential(tables, &mut EventLog::new()).expect("merge");
    assert_eq!(
        merged.column_names(),
        vec![ENTITY_KEY, "total", "total_1", "total_2", "total_2_3"]
    );
}

#[test]
fn failed_append_leaves_master_unchanged() {
    let mut master = merge_sequential(scenario(), &mut EventLog::new()).expect("merge");
    let before = master.clone();
    let source = keyed("name", &["x", "y"], "extra", &[1.0, 2.0]);
    let mut events = EventLog::new();

    let too_long = IndexMapping::from_signed(&[0, 1, 1]).expect("mapping");
    let err = append_by_mapping(&mut master, &source, &too_long, &mut events).unwrap_err();
    assert_eq!(
        err.to_string(),
        "append by mapping: length mismatch, expected 2 but got 3"
    );

    let out_of_bounds = IndexMapping::from_signed(&[0, 2]).expect("mapping");
    let err = append_by_mapping(&mut master, &source, &out_of_bounds, &mut events).unwrap_err();
    assert!(matches!(err, TableError::IndexOutOfBounds { index: 2, .. }));

    assert_eq!(master, before);
}

#[test]
fn full_run_through_the_facade() {
    let options = ConsolidationOptions::default();
    let mut run = ConsolidationRun::new(options);
    run.merge_sources(vec![
        keyed("Cooperativa", &["A", "B", "C", "D"], "activos", &[1.0, 2.0, 3.0, 4.0]),
        keyed("Cooperativa", &["D", "C", "B", "A"], "pasivos", &[0.0, 0.0, 0.0, 0.0]),
    ])
    .expect("merge");

    let ratings = Table::from_columns(vec![
        Column::from_texts("Entidad", &["a", "b", "c"]),
        Column::from_texts("Calificacion", &["AA-/A+", "BBB", "junk"]),
    ])
    .expect("ratings");
    let mapping = IndexMapping::from_signed(&[0, 1, 2, -1]).expect("mapping");
    run.append_rating_by_mapping(&ratings, "Calificacion", &mapping)
        .expect("rating");

    let clean = run.clean().expect("clean");
    assert_eq!(clean.all_zero, vec!["pasivos"]);

    let report = run.finalize().expect("finalize");
    assert_eq!(report.standardized_columns, vec!["activos"]);

    let (table, events) = run.finish().expect("finish");
    assert_eq!(table.column_names(), vec![ENTITY_KEY, "activos", "Label"]);
    let label = table.column("Label").expect("label");
    assert_eq!(label.cells[0], CellValue::text("A"));
    assert_eq!(label.cells[1], CellValue::text("BBB"));
    assert!(label.cells[2].is_missing());
    assert_eq!(events.for_stage(Stage::Rating).count(), 1);
}

#[test]
fn normalize_drops_duplicate_keys() {
    let mut table = Table::from_columns(vec![
        Column::from_texts(ENTITY_KEY, &["X", "X", "Y"]),
        Column::from_numbers("v", &[Some(1.0), Some(2.0), Some(3.0)]),
    ])
    .expect("table");
    let report = normalize_and_finalize(
        &mut table,
        &ConsolidationOptions::default(),
        &mut EventLog::new(),
    );
    assert_eq!(report.duplicate_rows, 1);
    assert_eq!(table.row_count(), 2);
    let keys: Vec<String> = table
        .column(ENTITY_KEY)
        .expect("key")
        .cells
        .iter()
        .map(CellValue::display)
        .collect();
    assert_eq!(keys, vec!["X", "Y"]);
}

#[test]
fn standardized_features_have_unit_spread() {
    let mut table = Table::from_columns(vec![
        Column::from_texts(ENTITY_KEY, &["A", "B", "C", "D", "E"]),
        Column::from_texts("a", &["1%", "5%", "9%", "", "20%"]),
        Column::from_texts("b", &["$1,000", "$2,500", "$100", "$7", "$60"]),
        Column::from_texts("cooperativa", &["n1", "n2", "n3", "n4", "n5"]),
    ])
    .expect("table");
    let report = normalize_and_finalize(
        &mut table,
        &ConsolidationOptions::default(),
        &mut EventLog::new(),
    );
    assert_eq!(report.standardized_columns, vec!["a", "b"]);
    for name in ["a", "b"] {
        let values = table.column(name).expect("column").numbers();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 1e-9, "{name} mean {mean}");
        assert!((std - 1.0).abs() < 1e-9, "{name} std {std}");
    }
    assert_eq!(
        table.column("cooperativa").expect("metadata").cells[0],
        CellValue::text("n1")
    );
}

#[test]
fn cleaner_keeps_protected_metadata() {
    let mut table = Table::from_columns(vec![
        Column::from_texts(ENTITY_KEY, &["A", "B"]),
        Column::from_texts("Segmento", &["1", "1"]),
        Column::from_texts("other", &["1", "1"]),
    ])
    .expect("table");
    let report = drop_useless_columns(
        &mut table,
        &ConsolidationOptions::default(),
        &mut EventLog::new(),
    );
    assert_eq!(report.constant, vec!["other"]);
    assert_eq!(table.column_names(), vec![ENTITY_KEY, "Segmento"]);
}
