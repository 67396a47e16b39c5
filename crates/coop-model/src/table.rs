//! Column-oriented table with dynamically typed cells.

use std::collections::BTreeSet;

use coop_common::{format_numeric, parse_f64};

use crate::error::{Result, TableError};

/// Name of the identity column every source table's first column becomes.
pub const ENTITY_KEY: &str = "entity_key";

/// A single table cell.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// Builds a text cell, mapping blank text to `Missing`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    /// Infers a cell from raw CSV text: blank is missing, numbers written in
    /// their canonical form are numeric, everything else stays text.
    ///
    /// A number is canonical when [`format_numeric`] prints it back
    /// unchanged, so `0190115798001`, `007` and `1.0` stay text and are
    /// written out exactly as read. Decorated numbers such as `1,200` or
    /// `15%` stay text too; turning those into numbers is the value
    /// normalizer's job.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match parse_f64(trimmed) {
            Some(number) if format_numeric(number) == trimmed => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Numeric reading of the cell: numbers as is, text when it parses as a
    /// plain number (`0.00`, `007`).
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(value) => parse_f64(value),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Display form used for output and for text comparisons.
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_numeric(*value),
            Self::Missing => String::new(),
        }
    }
}

/// Distinctness key: numbers compare by value, text by content, and the two
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum DistinctKey {
    Number(u64),
    Text(String),
}

fn distinct_key(cell: &CellValue) -> Option<DistinctKey> {
    match cell {
        CellValue::Missing => None,
        // -0.0 and 0.0 are the same value
        CellValue::Number(value) if *value == 0.0 => Some(DistinctKey::Number(0)),
        CellValue::Number(value) => Some(DistinctKey::Number(value.to_bits())),
        CellValue::Text(value) => Some(DistinctKey::Text(value.clone())),
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// A column of `len` missing cells.
    pub fn missing(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![CellValue::Missing; len])
    }

    /// Convenience constructor for numeric columns; `None` becomes missing.
    pub fn from_numbers(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let cells = values
            .iter()
            .map(|value| value.map_or(CellValue::Missing, CellValue::Number))
            .collect();
        Self::new(name, cells)
    }

    /// Convenience constructor for text columns; blank strings become missing.
    pub fn from_texts(name: impl Into<String>, values: &[&str]) -> Self {
        let cells = values.iter().map(|value| CellValue::text(*value)).collect();
        Self::new(name, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_missing()).count()
    }

    pub fn is_all_missing(&self) -> bool {
        self.cells.iter().all(CellValue::is_missing)
    }

    /// True when the column holds at least one value and every non-missing
    /// cell is a number.
    pub fn is_numeric(&self) -> bool {
        let mut seen = false;
        for cell in &self.cells {
            match cell {
                CellValue::Number(_) => seen = true,
                CellValue::Missing => {}
                CellValue::Text(_) => return false,
            }
        }
        seen
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.cells
            .iter()
            .filter_map(distinct_key)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Non-missing numeric values in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.cells.iter().filter_map(CellValue::as_number).collect()
    }
}

/// Picks the first free `{base}_{n}` name with `n >= start`.
///
/// This is the single disambiguation rule for column-name collisions:
/// merges start at the incoming table's list position, appends at 1 and
/// duplicate headers at their own column position.
pub fn unique_column_name<F>(base: &str, start: usize, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut n = start;
    loop {
        let candidate = format!("{base}_{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, renaming duplicate names.
    ///
    /// A repeated name becomes `{name}_{position}`; see [`unique_column_name`].
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(ragged) = columns.iter().find(|column| column.len() != expected) {
                return Err(TableError::LengthMismatch {
                    operation: "build table",
                    expected,
                    actual: ragged.len(),
                });
            }
        }
        let originals: BTreeSet<String> = columns.iter().map(|c| c.name.clone()).collect();
        let mut used: BTreeSet<String> = BTreeSet::new();
        let mut out = Vec::with_capacity(columns.len());
        for (position, mut column) in columns.into_iter().enumerate() {
            if used.contains(&column.name) {
                column.name = unique_column_name(&column.name, position, |name| {
                    used.contains(name) || originals.contains(name)
                });
            }
            used.insert(column.name.clone());
            out.push(column);
        }
        Ok(Self { columns: out })
    }

    /// Builds a table from a header and row-major cells.
    ///
    /// Short rows are padded with missing cells, long rows truncated.
    pub fn from_rows(headers: &[String], rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column::new(name.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.cells.push(cells.next().unwrap_or(CellValue::Missing));
            }
        }
        Self::from_columns(columns)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_at_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Appends a column, renaming it with [`unique_column_name`] (from 1) if
    /// the name is taken. Returns the name the column was stored under.
    pub fn push_column(&mut self, mut column: Column) -> Result<String> {
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                operation: "append column",
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        if self.has_column(&column.name) {
            column.name = unique_column_name(&column.name, 1, |name| self.has_column(name));
        }
        let name = column.name.clone();
        self.columns.push(column);
        Ok(name)
    }

    /// Appends several columns at once. Lengths and names are checked before
    /// anything is appended, so a failure leaves the table untouched.
    pub fn append_columns(&mut self, columns: Vec<Column>) -> Result<()> {
        let expected = if self.columns.is_empty() {
            columns.first().map_or(0, Column::len)
        } else {
            self.row_count()
        };
        if let Some(ragged) = columns.iter().find(|column| column.len() != expected) {
            return Err(TableError::LengthMismatch {
                operation: "append columns",
                expected,
                actual: ragged.len(),
            });
        }
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for column in &columns {
            if self.has_column(&column.name) || !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    operation: "append columns",
                    column: column.name.clone(),
                });
            }
        }
        self.columns.extend(columns);
        Ok(())
    }

    /// Replaces the column with the same name in place, or appends it.
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                operation: "set column",
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        match self.column_index(&column.name) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.column_index(name)?;
        Some(self.columns.remove(index))
    }

    /// Keeps the columns matching `keep`, returning the names removed.
    pub fn retain_columns<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&Column) -> bool,
    {
        let mut removed = Vec::new();
        self.columns.retain(|column| {
            if keep(column) {
                true
            } else {
                removed.push(column.name.clone());
                false
            }
        });
        removed
    }

    /// Renames the column at `index`. The new name must not belong to
    /// another column.
    pub fn rename_column_at(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if index >= self.columns.len() {
            return Err(TableError::IndexOutOfBounds {
                operation: "rename column",
                index: index as i64,
                len: self.columns.len(),
            });
        }
        if self
            .columns
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && c.name == name)
        {
            return Err(TableError::DuplicateColumn {
                operation: "rename column",
                column: name,
            });
        }
        self.columns[index].name = name;
        Ok(())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.columns.get(column)?.cells.get(row)
    }

    /// The cells of one row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<&CellValue>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[row]).collect())
    }

    /// Builds a new table whose row `i` is this table's row `positions[i]`.
    ///
    /// `None` positions, and positions past the end, produce missing cells.
    pub fn take_rows(&self, positions: &[Option<usize>]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let cells = positions
                    .iter()
                    .map(|position| {
                        position
                            .and_then(|idx| column.cells.get(idx).cloned())
                            .unwrap_or(CellValue::Missing)
                    })
                    .collect();
                Column::new(column.name.clone(), cells)
            })
            .collect();
        Table { columns }
    }

    /// Keeps the rows whose mask entry is true.
    pub fn filter_rows(&mut self, mask: &[bool]) -> Result<usize> {
        if mask.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                operation: "filter rows",
                expected: self.row_count(),
                actual: mask.len(),
            });
        }
        for column in &mut self.columns {
            let mut keep = mask.iter();
            column.cells.retain(|_| *keep.next().unwrap_or(&false));
        }
        Ok(mask.iter().filter(|keep| !**keep).count())
    }
}
