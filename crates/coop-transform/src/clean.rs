//! Removal of columns that carry no information.

use tracing::{debug, info_span};

use coop_model::{Column, ConsolidationOptions, EventLog, Stage, Table};

/// Columns dropped by [`drop_useless_columns`], per pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub all_missing: Vec<String>,
    pub all_zero: Vec<String>,
    pub constant: Vec<String>,
}

impl CleanReport {
    pub fn dropped_count(&self) -> usize {
        self.all_missing.len() + self.all_zero.len() + self.constant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped_count() == 0
    }
}

fn is_all_zero(column: &Column) -> bool {
    !column.is_empty()
        && column
            .cells
            .iter()
            .all(|cell| cell.numeric_value() == Some(0.0))
}

fn drop_pass<F>(
    table: &mut Table,
    options: &ConsolidationOptions,
    pass: &str,
    useless: F,
) -> Vec<String>
where
    F: Fn(&Column) -> bool,
{
    let dropped = table.retain_columns(|column| options.is_protected(&column.name) || !useless(column));
    for name in &dropped {
        debug!(column = %name, pass, "dropped column");
    }
    dropped
}

/// Drops all-missing, all-zero and single-valued columns, in that order.
///
/// Protected columns are always kept. Running the cleaner twice drops
/// nothing the second time.
pub fn drop_useless_columns(
    table: &mut Table,
    options: &ConsolidationOptions,
    events: &mut EventLog,
) -> CleanReport {
    let span = info_span!("clean", columns = table.column_count());
    let _guard = span.enter();

    let report = CleanReport {
        all_missing: drop_pass(table, options, "all_missing", Column::is_all_missing),
        all_zero: drop_pass(table, options, "all_zero", is_all_zero),
        constant: drop_pass(table, options, "constant", |column| {
            column.distinct_count() <= 1
        }),
    };

    for (reason, names) in [
        ("entirely missing", &report.all_missing),
        ("entirely zero", &report.all_zero),
        ("constant", &report.constant),
    ] {
        if !names.is_empty() {
            events.info(
                Stage::Clean,
                format!("dropped {} {reason} column(s): {}", names.len(), names.join(", ")),
            );
        }
    }
    report
}
