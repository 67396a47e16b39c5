use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use coop_model::{EventLog, EventSeverity};

use crate::types::CommandOutcome;

/// Plain header lines of the summary.
pub fn summary_lines(outcome: &CommandOutcome) -> Vec<String> {
    let mut lines = vec![format!("Command: {}", outcome.command)];
    match &outcome.output {
        Some(path) => lines.push(format!("Output: {}", path.display())),
        None => lines.push("Output: (not written)".to_string()),
    }
    lines.push(format!(
        "Table: {} rows x {} columns",
        outcome.shape.rows, outcome.shape.columns
    ));
    lines.push(format!(
        "Events: {} ({} warnings, {} errors)",
        outcome.events.len(),
        outcome.events.warning_count(),
        outcome.events.error_count()
    ));
    lines
}

pub fn print_summary(outcome: &CommandOutcome) {
    for line in summary_lines(outcome) {
        println!("{line}");
    }
    if !outcome.events.is_empty() {
        println!("{}", event_table(&outcome.events));
    }
}

/// Events as a styled table, one row per event in log order.
pub fn event_table(events: &EventLog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Stage"),
        header_cell("Severity"),
        header_cell("Message"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    for (index, event) in events.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(event.stage.as_str()).fg(Color::Blue),
            severity_cell(event.severity),
            Cell::new(&event.message),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(4)),
        ColumnConstraint::UpperBoundary(Width::Fixed(14)),
        ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Percentage(75)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: EventSeverity) -> Cell {
    match severity {
        EventSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        EventSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
        EventSeverity::Info => dim_cell("info"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
