//! Explicit row correspondence between a master table and a source table.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Sentinel used by the wire form of a mapping for "no matching source row".
pub const NO_MATCH: i64 = -1;

/// One entry per master row: the source row to copy from, or `None`.
///
/// Mappings are computed outside this workspace; this type only checks them.
/// On the wire (JSON, TOML, CLI) a mapping is a list of integers with `-1`
/// meaning no match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct IndexMapping {
    entries: Vec<Option<usize>>,
}

impl IndexMapping {
    pub fn new(entries: Vec<Option<usize>>) -> Self {
        Self { entries }
    }

    /// Converts the signed wire form. Any negative value other than `-1`
    /// is reported as out of bounds.
    pub fn from_signed(values: &[i64]) -> Result<Self> {
        let entries = values
            .iter()
            .map(|value| match *value {
                NO_MATCH => Ok(None),
                v if v < 0 => Err(TableError::IndexOutOfBounds {
                    operation: "parse index mapping",
                    index: v,
                    len: values.len(),
                }),
                v => Ok(Some(v as usize)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn to_signed(&self) -> Vec<i64> {
        self.entries
            .iter()
            .map(|entry| entry.map_or(NO_MATCH, |idx| idx as i64))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Option<usize>] {
        &self.entries
    }

    /// Number of master rows with no source row.
    pub fn unmatched_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_none()).count()
    }

    /// Checks the mapping against the master and source row counts.
    pub fn validate(
        &self,
        operation: &'static str,
        master_rows: usize,
        source_rows: usize,
    ) -> Result<()> {
        if self.entries.len() != master_rows {
            return Err(TableError::LengthMismatch {
                operation,
                expected: master_rows,
                actual: self.entries.len(),
            });
        }
        if let Some(bad) = self
            .entries
            .iter()
            .flatten()
            .find(|idx| **idx >= source_rows)
        {
            return Err(TableError::IndexOutOfBounds {
                operation,
                index: *bad as i64,
                len: source_rows,
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<i64>> for IndexMapping {
    type Error = TableError;

    fn try_from(values: Vec<i64>) -> Result<Self> {
        Self::from_signed(&values)
    }
}

impl From<IndexMapping> for Vec<i64> {
    fn from(mapping: IndexMapping) -> Self {
        mapping.to_signed()
    }
}
