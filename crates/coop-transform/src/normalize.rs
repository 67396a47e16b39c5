//! Value normalization of the merged table.
//!
//! Turns the feature columns (everything except identity and metadata) into
//! dense, standardized numbers. The steps run in a fixed order:
//!
//! 1. **Coerce**: strip `%`, `,` and currency symbols, parse, else missing
//! 2. **Sparse**: drop columns more than half missing
//! 3. **Constant**: drop columns with at most one distinct value
//! 4. **Impute**: fill missing cells with the column median
//! 5. **Dedupe**: drop rows without a key, then repeated keys (first wins)
//! 6. **Standardize**: `(v - mean) / std` with the population std
//!
//! Feature columns are recomputed after every dropping step.

use std::collections::HashSet;

use tracing::{debug, info_span, warn};

use coop_common::{parse_f64, strip_numeric_decorations};
use coop_model::{
    CellValue, Column, ConsolidationOptions, ENTITY_KEY, EventLog, SPARSE_NULL_FRACTION, Stage,
    Table, TableError,
};

use crate::key::key_text;

/// Parses a decorated numeric string such as `1,200`, `15%` or `$ 30`.
///
/// Returns `None` for blank or unparsable input.
pub fn coerce_number(raw: &str) -> Option<f64> {
    parse_f64(&strip_numeric_decorations(raw))
}

/// Like [`coerce_number`], but reports where the unparsable value was.
pub fn coerce_number_strict(raw: &str, column: &str, row: usize) -> Result<f64, TableError> {
    coerce_number(raw).ok_or_else(|| TableError::UnparsableValue {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    })
}

/// What [`normalize_and_finalize`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    /// Non-blank text cells that did not parse and became missing.
    pub unparsable_cells: usize,
    pub sparse_columns: Vec<String>,
    pub constant_columns: Vec<String>,
    pub imputed_cells: usize,
    pub rows_without_key: usize,
    pub duplicate_rows: usize,
    /// Feature columns left after pruning.
    pub standardized_columns: Vec<String>,
    /// Standardized columns whose spread was zero, now all `0`.
    pub zero_variance_columns: Vec<String>,
}

fn feature_indices(table: &Table, options: &ConsolidationOptions) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| !options.is_protected(&column.name))
        .map(|(index, _)| index)
        .collect()
}

fn coerce_column(column: &mut Column) -> usize {
    let mut unparsable = 0;
    for cell in &mut column.cells {
        if let CellValue::Text(text) = cell {
            let parsed = coerce_number(text);
            if parsed.is_none() && !text.trim().is_empty() {
                unparsable += 1;
            }
            *cell = parsed.map_or(CellValue::Missing, CellValue::Number);
        }
    }
    unparsable
}

fn drop_features<F>(table: &mut Table, options: &ConsolidationOptions, drop: F) -> Vec<String>
where
    F: Fn(&Column) -> bool,
{
    table.retain_columns(|column| options.is_protected(&column.name) || !drop(column))
}

fn is_sparse(column: &Column) -> bool {
    if column.is_empty() {
        return false;
    }
    column.missing_count() as f64 / column.len() as f64 > SPARSE_NULL_FRACTION
}

/// Median of the non-missing values; the mean of the middle pair for an
/// even count.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn impute_column(column: &mut Column) -> usize {
    let fill = median(&mut column.numbers()).unwrap_or(0.0);
    let mut filled = 0;
    for cell in &mut column.cells {
        if cell.is_missing() {
            *cell = CellValue::Number(fill);
            filled += 1;
        }
    }
    filled
}

/// Row mask keeping the first row of every present key, plus the counts of
/// rows without a key and of repeated keys.
fn dedupe_mask(keys: &Column) -> (Vec<bool>, usize, usize) {
    let mut seen = HashSet::new();
    let mut without_key = 0;
    let mut duplicates = 0;
    let mask = keys
        .cells
        .iter()
        .map(|cell| match key_text(cell) {
            None => {
                without_key += 1;
                false
            }
            Some(key) => {
                let first = seen.insert(key);
                if !first {
                    duplicates += 1;
                }
                first
            }
        })
        .collect();
    (mask, without_key, duplicates)
}

/// Population standardization in place. Returns false when the spread is
/// zero (or not finite) and the column was zeroed instead.
fn standardize_column(column: &mut Column) -> bool {
    let values = column.numbers();
    if values.is_empty() {
        return true;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let degenerate =
        !mean.is_finite() || !std.is_finite() || std <= f64::EPSILON * mean.abs().max(1.0);
    for cell in &mut column.cells {
        if let CellValue::Number(value) = cell {
            *value = if degenerate { 0.0 } else { (*value - mean) / std };
        }
    }
    !degenerate
}

/// Runs the six normalization steps over `table`.
///
/// Value anomalies never fail the run; they are counted in the report and
/// the event log. A table without an `entity_key` column skips deduplication
/// with a warning.
pub fn normalize_and_finalize(
    table: &mut Table,
    options: &ConsolidationOptions,
    events: &mut EventLog,
) -> NormalizeReport {
    let span = info_span!("normalize", rows = table.row_count(), columns = table.column_count());
    let _guard = span.enter();
    let mut report = NormalizeReport::default();

    for index in feature_indices(table, options) {
        if let Some(column) = table.column_at_mut(index) {
            let unparsable = coerce_column(column);
            if unparsable > 0 {
                debug!(column = %column.name, unparsable, "nulled unparsable cells");
            }
            report.unparsable_cells += unparsable;
        }
    }
    if report.unparsable_cells > 0 {
        warn!(cells = report.unparsable_cells, "unparsable values set to missing");
        events.warn(
            Stage::Normalize,
            format!("{} unparsable value(s) set to missing", report.unparsable_cells),
        );
    }

    report.sparse_columns = drop_features(table, options, is_sparse);
    report.constant_columns = drop_features(table, options, |column| column.distinct_count() <= 1);
    for (reason, names) in [
        ("sparse", &report.sparse_columns),
        ("constant", &report.constant_columns),
    ] {
        if !names.is_empty() {
            debug!(reason, columns = ?names, "dropped feature columns");
            events.info(
                Stage::Normalize,
                format!("dropped {} {reason} column(s): {}", names.len(), names.join(", ")),
            );
        }
    }

    for index in feature_indices(table, options) {
        if let Some(column) = table.column_at_mut(index) {
            report.imputed_cells += impute_column(column);
        }
    }
    if report.imputed_cells > 0 {
        events.info(
            Stage::Normalize,
            format!("imputed {} missing value(s) with column medians", report.imputed_cells),
        );
    }

    let dedupe = table.column(ENTITY_KEY).map(dedupe_mask);
    match dedupe {
        Some((mask, without_key, duplicates)) => {
            if let Err(err) = table.filter_rows(&mask) {
                warn!(%err, "deduplication skipped");
            } else if without_key + duplicates > 0 {
                report.rows_without_key = without_key;
                report.duplicate_rows = duplicates;
                warn!(without_key, duplicates, "dropped rows during deduplication");
                events.warn(
                    Stage::Normalize,
                    format!(
                        "dropped {without_key} row(s) without key and {duplicates} duplicate key row(s)"
                    ),
                );
            }
        }
        None => {
            warn!("no entity_key column, skipping deduplication");
            events.warn(Stage::Normalize, "no entity_key column, deduplication skipped");
        }
    }

    for index in feature_indices(table, options) {
        if let Some(column) = table.column_at_mut(index) {
            report.standardized_columns.push(column.name.clone());
            if !standardize_column(column) {
                report.zero_variance_columns.push(column.name.clone());
            }
        }
    }
    debug!(
        standardized = report.standardized_columns.len(),
        zero_variance = report.zero_variance_columns.len(),
        "standardized feature columns"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_strips_decorations() {
        assert_eq!(coerce_number("1,200"), Some(1200.0));
        assert_eq!(coerce_number(" 15% "), Some(15.0));
        assert_eq!(coerce_number("$ 30.5"), Some(30.5));
        assert_eq!(coerce_number("€-2"), Some(-2.0));
        assert_eq!(coerce_number("n/a"), None);
        assert_eq!(coerce_number(""), None);
    }

    #[test]
    fn strict_coercion_names_the_cell() {
        let err = coerce_number_strict("abc", "activos", 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "column 'activos' row 3: cannot parse 'abc' as a number"
        );
        assert_eq!(coerce_number_strict("1%", "x", 0), Ok(1.0));
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn standardizes_to_zero_mean_unit_std() {
        let mut column = Column::from_numbers("x", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert!(standardize_column(&mut column));
        let values = column.numbers();
        let mean = values.iter().sum::<f64>() / 4.0;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var.sqrt() - 1.0).abs() < 1e-12);

        let mut flat = Column::from_numbers("y", &[Some(5.0), Some(5.0)]);
        assert!(!standardize_column(&mut flat));
        assert_eq!(flat.numbers(), vec![0.0, 0.0]);
    }

    #[test]
    fn runs_steps_in_order() {
        let mut table = Table::from_columns(vec![
            Column::from_texts(ENTITY_KEY, &["A", "B", "A", "", "C"]),
            Column::from_texts("money", &["$1,000", "2,000", "3,000", "4,000", "n/a"]),
            Column::from_texts("sparse", &["1", "", "", "", "2"]),
            Column::from_texts("flat", &["7%", "7%", "7", "", "7"]),
            Column::from_texts("segmento", &["x", "y", "z", "w", "v"]),
        ])
        .expect("table");
        let mut events = EventLog::new();
        let report =
            normalize_and_finalize(&mut table, &ConsolidationOptions::default(), &mut events);

        assert_eq!(report.unparsable_cells, 1);
        assert_eq!(report.sparse_columns, vec!["sparse"]);
        assert_eq!(report.constant_columns, vec!["flat"]);
        assert_eq!(report.imputed_cells, 1);
        assert_eq!(report.rows_without_key, 1);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.standardized_columns, vec!["money"]);
        assert_eq!(table.column_names(), vec![ENTITY_KEY, "money", "segmento"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.column("segmento").expect("segmento").cells[2],
            CellValue::text("v")
        );
        assert_eq!(events.warning_count(), 2);
    }

    #[test]
    fn missing_key_column_skips_dedupe() {
        let mut table = Table::from_columns(vec![
            Column::from_texts("name", &["A", "A"]),
            Column::from_numbers("v", &[Some(1.0), Some(3.0)]),
        ])
        .expect("table");
        let mut events = EventLog::new();
        let report =
            normalize_and_finalize(&mut table, &ConsolidationOptions::default(), &mut events);
        assert_eq!(table.row_count(), 2);
        assert_eq!(report.duplicate_rows, 0);
        assert_eq!(report.sparse_columns, vec!["name"]);
        assert!(
            events
                .iter()
                .any(|event| event.message.contains("deduplication skipped"))
        );
    }
}
