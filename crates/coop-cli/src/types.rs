use std::path::PathBuf;

use coop_ingest::TableShape;
use coop_model::EventLog;

/// What a table-producing command did.
#[derive(Debug)]
pub struct CommandOutcome {
    /// Command name, for the summary header.
    pub command: &'static str,
    /// Where the result was written; `None` for dry runs.
    pub output: Option<PathBuf>,
    pub shape: TableShape,
    pub events: EventLog,
}

impl CommandOutcome {
    pub fn has_errors(&self) -> bool {
        self.events.has_errors()
    }
}
