//! Consolidation run with explicit stages.
//!
//! A run owns the master table and the event log. Stages are applied in the
//! order the caller chooses, typically:
//! 1. **Merge**: anchor the master and merge keyed sources
//! 2. **Align**: append mapped columns and the rating label
//! 3. **Clean**: drop uninformative columns
//! 4. **Finalize**: coerce, prune, impute, dedupe and standardize
//!
//! Persistence is left to the caller: load tables before the run, write
//! the result of [`ConsolidationRun::finish`] after it.

use tracing::{info, info_span};

use coop_model::{
    ConsolidationOptions, EventLog, IndexMapping, Result, Stage, Table, TableError,
};

use crate::align::{append_by_mapping, append_labels, append_rating_into, create_master};
use crate::clean::{CleanReport, drop_useless_columns};
use crate::key::normalize_key;
use crate::merge::merge_sequential;
use crate::normalize::{NormalizeReport, normalize_and_finalize};

/// In-memory state of one consolidation run.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationRun {
    options: ConsolidationOptions,
    master: Option<Table>,
    events: EventLog,
}

impl ConsolidationRun {
    /// A run with no master yet.
    pub fn new(options: ConsolidationOptions) -> Self {
        Self {
            options,
            master: None,
            events: EventLog::new(),
        }
    }

    /// Resumes from a previously written master table.
    pub fn from_master(options: ConsolidationOptions, mut master: Table) -> Self {
        normalize_key(&mut master);
        let mut run = Self::new(options);
        run.events.info(
            Stage::Load,
            format!(
                "resumed master with {} row(s) and {} column(s)",
                master.row_count(),
                master.column_count()
            ),
        );
        run.master = Some(master);
        run
    }

    /// Starts from a master built out of parallel name and abbreviation
    /// lists.
    pub fn with_master_list(
        options: ConsolidationOptions,
        names: &[String],
        abbreviations: &[String],
    ) -> Result<Self> {
        let master = create_master(names, abbreviations, &options.abbreviation_column)?;
        let mut run = Self::new(options);
        run.events.info(
            Stage::Load,
            format!("created master with {} row(s)", master.row_count()),
        );
        run.master = Some(master);
        Ok(run)
    }

    pub fn options(&self) -> &ConsolidationOptions {
        &self.options
    }

    pub fn master(&self) -> Option<&Table> {
        self.master.as_ref()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Merges `sources` into the master in order.
    ///
    /// Without a master the first source anchors the run; otherwise the
    /// existing master is the anchor and every source is merged onto it.
    /// On error the master is left as it was.
    pub fn merge_sources(&mut self, sources: Vec<Table>) -> Result<()> {
        let span = info_span!("merge_sources", sources = sources.len());
        let _guard = span.enter();

        let mut tables = Vec::with_capacity(sources.len() + 1);
        let resumed = self.master.is_some();
        if let Some(master) = self.master.clone() {
            tables.push(master);
        }
        tables.extend(sources);
        let merged = merge_sequential(tables, &mut self.events)?;
        info!(
            resumed,
            rows = merged.row_count(),
            columns = merged.column_count(),
            "merge complete"
        );
        self.master = Some(merged);
        Ok(())
    }

    /// Appends mapped columns of `source`. Returns the number appended.
    pub fn append_by_mapping(&mut self, source: &Table, mapping: &IndexMapping) -> Result<usize> {
        let master = self
            .master
            .as_mut()
            .ok_or(TableError::MissingOutput {
                operation: "append by mapping",
            })?;
        append_by_mapping(master, source, mapping, &mut self.events)
    }

    /// Resolves `column` of `source` into the configured label column.
    pub fn append_rating_by_mapping(
        &mut self,
        source: &Table,
        column: &str,
        mapping: &IndexMapping,
    ) -> Result<()> {
        let master = self
            .master
            .as_mut()
            .ok_or(TableError::MissingOutput {
                operation: "append rating by mapping",
            })?;
        append_rating_into(
            master,
            source,
            column,
            mapping,
            &self.options.label_column,
            &mut self.events,
        )
    }

    /// Writes a ready label list into the configured label column.
    pub fn append_labels(&mut self, labels: &[String]) -> Result<()> {
        let master = self.master.as_mut().ok_or(TableError::MissingOutput {
            operation: "append labels",
        })?;
        append_labels(master, labels, &self.options.label_column)
    }

    pub fn clean(&mut self) -> Result<CleanReport> {
        let master = self
            .master
            .as_mut()
            .ok_or(TableError::MissingOutput { operation: "clean" })?;
        Ok(drop_useless_columns(master, &self.options, &mut self.events))
    }

    pub fn finalize(&mut self) -> Result<NormalizeReport> {
        let master = self
            .master
            .as_mut()
            .ok_or(TableError::MissingOutput { operation: "finalize" })?;
        Ok(normalize_and_finalize(master, &self.options, &mut self.events))
    }

    /// Ends the run, returning the master and the event log.
    pub fn finish(self) -> Result<(Table, EventLog)> {
        match self.master {
            Some(master) => Ok((master, self.events)),
            None => Err(TableError::MissingOutput { operation: "finish run" }),
        }
    }

    /// Splits the run into its parts without requiring a master.
    pub fn into_parts(self) -> (ConsolidationOptions, Option<Table>, EventLog) {
        (self.options, self.master, self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_model::{CellValue, Column};

    fn source(keys: &[&str], name: &str, values: &[Option<f64>]) -> Table {
        Table::from_columns(vec![
            Column::from_texts("name", keys),
            Column::from_numbers(name, values),
        ])
        .expect("source")
    }

    #[test]
    fn stages_before_master_fail() {
        let mut run = ConsolidationRun::new(ConsolidationOptions::default());
        let mapping = IndexMapping::new(vec![]);
        let err = run
            .append_by_mapping(&source(&[], "v", &[]), &mapping)
            .unwrap_err();
        assert!(matches!(err, TableError::MissingOutput { .. }));
        assert!(run.clean().is_err());
        assert!(run.finalize().is_err());
        assert!(run.append_labels(&[]).is_err());
        assert!(run.finish().is_err());
    }

    #[test]
    fn merge_onto_resumed_master() {
        let master = Table::from_columns(vec![
            Column::from_texts("entity_key", &["A", "B"]),
            Column::from_numbers("v", &[Some(1.0), Some(2.0)]),
        ])
        .expect("master");
        let mut run = ConsolidationRun::from_master(ConsolidationOptions::default(), master);
        run.merge_sources(vec![source(&["B"], "v", &[Some(20.0)])])
            .expect("merge");
        let (table, events) = run.finish().expect("finish");
        assert_eq!(table.column_names(), vec!["entity_key", "v", "v_1"]);
        assert_eq!(table.cell(1, 2), Some(&CellValue::Number(20.0)));
        assert!(!events.is_empty());
    }

    #[test]
    fn master_list_then_labels() {
        let names = vec!["A".to_string(), "B".to_string()];
        let abbrs = vec!["a".to_string(), "b".to_string()];
        let mut run = ConsolidationRun::with_master_list(
            ConsolidationOptions::default().with_label_column("Rating"),
            &names,
            &abbrs,
        )
        .expect("run");
        run.append_labels(&["AA".to_string(), "B".to_string()])
            .expect("labels");
        let master = run.master().expect("master");
        assert_eq!(master.column_names(), vec!["entity_key", "abreviacion", "Rating"]);
    }
}
