//! Configuration options for consolidation runs.

use serde::{Deserialize, Serialize};

use crate::table::ENTITY_KEY;

/// Fraction of missing cells above which a feature column is dropped.
pub const SPARSE_NULL_FRACTION: f64 = 0.5;

/// Default name of the resolved rating column.
pub const DEFAULT_LABEL_COLUMN: &str = "Label";

/// Default name of the abbreviation column created with a master table.
pub const DEFAULT_ABBREVIATION_COLUMN: &str = "abreviacion";

/// Column names that are never cleaned, coerced or standardized.
pub const DEFAULT_PROTECTED_COLUMNS: [&str; 6] = [
    ENTITY_KEY,
    "cooperativa",
    DEFAULT_ABBREVIATION_COLUMN,
    "label",
    "entity",
    "segmento",
];

/// Options controlling consolidation behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationOptions {
    /// Identity and metadata columns, matched case-insensitively.
    ///
    /// `entity_key` is always protected, whether listed or not.
    pub protected_columns: Vec<String>,

    /// Destination column of the rating append.
    pub label_column: String,

    /// Abbreviation column of a master created from name lists.
    pub abbreviation_column: String,

    /// Write a UTF-8 byte-order mark at the start of output files.
    pub write_bom: bool,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self {
            protected_columns: DEFAULT_PROTECTED_COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            abbreviation_column: DEFAULT_ABBREVIATION_COLUMN.to_string(),
            write_bom: true,
        }
    }
}

impl ConsolidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protected_columns(mut self, columns: Vec<String>) -> Self {
        self.protected_columns = columns;
        self
    }

    pub fn with_label_column(mut self, name: impl Into<String>) -> Self {
        self.label_column = name.into();
        self
    }

    pub fn with_bom(mut self, enable: bool) -> Self {
        self.write_bom = enable;
        self
    }

    /// True for identity/metadata columns.
    ///
    /// The label and abbreviation columns are protected too, so renaming them
    /// does not expose them to numeric coercion.
    pub fn is_protected(&self, column: &str) -> bool {
        column.eq_ignore_ascii_case(ENTITY_KEY)
            || column.eq_ignore_ascii_case(&self.label_column)
            || column.eq_ignore_ascii_case(&self.abbreviation_column)
            || self
                .protected_columns
                .iter()
                .any(|name| name.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_protection_is_case_insensitive() {
        let options = ConsolidationOptions::default();
        assert!(options.is_protected("entity_key"));
        assert!(options.is_protected("Label"));
        assert!(options.is_protected("SEGMENTO"));
        assert!(options.is_protected("Abreviacion"));
        assert!(!options.is_protected("activos"));
    }

    #[test]
    fn entity_key_is_always_protected() {
        let options = ConsolidationOptions::default().with_protected_columns(vec![]);
        assert!(options.is_protected("ENTITY_KEY"));
        assert!(options.is_protected("label"));
        assert!(!options.is_protected("segmento"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let options: ConsolidationOptions =
            toml::from_str("label_column = \"Rating\"\nwrite_bom = false\n").expect("toml");
        assert_eq!(options.label_column, "Rating");
        assert!(!options.write_bom);
        assert_eq!(options.protected_columns.len(), DEFAULT_PROTECTED_COLUMNS.len());
        assert!(options.is_protected("rating"));
    }
}
