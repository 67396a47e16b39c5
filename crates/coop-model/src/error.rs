//! Structural error taxonomy shared by every consolidation stage.

use thiserror::Error;

/// Errors raised when an operation's structural precondition does not hold.
///
/// Every variant names the operation that failed. Operations returning one of
/// these leave their target table unmodified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// No source tables were supplied.
    #[error("{operation}: no input tables supplied")]
    NoInput { operation: &'static str },

    /// A mapping, label list or column disagrees with the table row count.
    #[error("{operation}: length mismatch, expected {expected} but got {actual}")]
    LengthMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A row or column index lies outside the table.
    #[error("{operation}: index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        operation: &'static str,
        index: i64,
        len: usize,
    },

    /// A named column is absent.
    #[error("{operation}: column '{column}' not found")]
    MissingColumn {
        operation: &'static str,
        column: String,
    },

    /// A column name is already taken.
    #[error("{operation}: column '{column}' already exists")]
    DuplicateColumn {
        operation: &'static str,
        column: String,
    },

    /// The master table has not been created yet.
    #[error("{operation}: master table does not exist yet, merge or create it first")]
    MissingOutput { operation: &'static str },

    /// A cell could not be parsed where a number was required.
    #[error("column '{column}' row {row}: cannot parse '{value}' as a number")]
    UnparsableValue {
        column: String,
        row: usize,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;
