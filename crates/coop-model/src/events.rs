//! Structured pipeline events.
//!
//! Stages report what they did (columns dropped, duplicate keys discarded,
//! unparsable cells nulled) into an [`EventLog`] owned by the caller. The
//! log is plain data: callers can print it, serialize it or ignore it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventSeverity::Info => "info",
            EventSeverity::Warning => "warning",
            EventSeverity::Error => "error",
        })
    }
}

/// Pipeline stage that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    KeyNormalize,
    Merge,
    Align,
    Clean,
    Normalize,
    Rating,
    Write,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::KeyNormalize => "key_normalize",
            Stage::Merge => "merge",
            Stage::Align => "align",
            Stage::Clean => "clean",
            Stage::Normalize => "normalize",
            Stage::Rating => "rating",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub stage: Stage,
    pub message: String,
    pub severity: EventSeverity,
}

/// Ordered collection of events for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<PipelineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, severity: EventSeverity, message: impl Into<String>) {
        self.events.push(PipelineEvent {
            stage,
            message: message.into(),
            severity,
        });
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, EventSeverity::Info, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, EventSeverity::Warning, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, EventSeverity::Error, message);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineEvent> {
        self.events.iter()
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &PipelineEvent> {
        self.events.iter().filter(move |event| event.stage == stage)
    }

    pub fn warning_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.severity == EventSeverity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.severity == EventSeverity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Moves every event of `other` to the end of this log.
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}
