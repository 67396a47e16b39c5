//! Hand-off of a finished table to polars for analysis.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

use coop_model::{CellValue, Table};

/// Converts `table` into a `DataFrame`.
///
/// Numeric and all-missing columns become `Float64`, anything else `String`
/// (numbers in mixed columns keep their display text). Missing cells are
/// nulls.
pub fn to_dataframe(table: &Table) -> PolarsResult<DataFrame> {
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let series = if column.is_numeric() || column.is_all_missing() {
                let values: Vec<Option<f64>> =
                    column.cells.iter().map(CellValue::as_number).collect();
                Series::new(column.name.as_str().into(), values)
            } else {
                let values: Vec<Option<String>> = column
                    .cells
                    .iter()
                    .map(|cell| (!cell.is_missing()).then(|| cell.display()))
                    .collect();
                Series::new(column.name.as_str().into(), values)
            };
            series.into_column()
        })
        .collect();
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_model::Column;
    use polars::prelude::DataType;

    #[test]
    fn numeric_and_text_columns() {
        let table = Table::from_columns(vec![
            Column::from_texts("entity_key", &["A", "B"]),
            Column::from_numbers("v", &[Some(1.5), None]),
            Column::new(
                "mixed",
                vec![CellValue::Number(2.0), CellValue::text("x")],
            ),
            Column::missing("empty", 2),
        ])
        .expect("table");
        let df = to_dataframe(&table).expect("frame");
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("v").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("empty").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("entity_key").unwrap().dtype(), &DataType::String);

        let v = df.column("v").unwrap().f64().unwrap();
        assert_eq!(v.get(0), Some(1.5));
        assert_eq!(v.get(1), None);
        let mixed = df.column("mixed").unwrap().str().unwrap();
        assert_eq!(mixed.get(0), Some("2"));
    }

    #[test]
    fn empty_table_is_empty_frame() {
        let df = to_dataframe(&Table::new()).expect("frame");
        assert_eq!(df.width(), 0);
    }
}
