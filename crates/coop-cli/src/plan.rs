//! TOML run plans.
//!
//! A plan lists everything one consolidation run needs:
//!
//! ```toml
//! output = "out/dataset.csv"
//! sources = ["data/balance", "data/extra.csv"]
//! clean = true
//! finalize = true
//!
//! [[append]]
//! source = "data/segments.csv"
//! mapping = [0, 2, -1]
//!
//! [label]
//! source = "data/ratings.csv"
//! column = "Calificacion"
//! mapping = "data/rating_mapping.json"
//!
//! [options]
//! label_column = "Label"
//! ```
//!
//! Relative paths are resolved against the plan file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use coop_model::{ConsolidationOptions, IndexMapping};

/// A row mapping given inline or as a path to a JSON list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MappingSource {
    Inline(IndexMapping),
    File(PathBuf),
}

impl MappingSource {
    /// Parses a CLI mapping argument: an existing file path, or an inline
    /// comma-separated list such as `0,2,-1`.
    pub fn from_arg(arg: &str) -> Result<Self> {
        let path = Path::new(arg);
        if path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }
        let values = arg
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .with_context(|| format!("invalid mapping entry '{part}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        let mapping = IndexMapping::from_signed(&values)
            .with_context(|| format!("invalid mapping '{arg}'"))?;
        Ok(Self::Inline(mapping))
    }

    pub fn load(&self) -> Result<IndexMapping> {
        match self {
            Self::Inline(mapping) => Ok(mapping.clone()),
            Self::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("read mapping {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parse mapping {}", path.display()))
            }
        }
    }

    fn resolve(&mut self, base: &Path) {
        if let Self::File(path) = self {
            *path = resolve_path(base, path);
        }
    }
}

/// Builds the master from two name lists (first column of each CSV).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterListStep {
    pub names: PathBuf,
    pub abbreviations: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendStep {
    pub source: PathBuf,
    pub mapping: MappingSource,
}

/// Rating label step: a rating column resolved through a mapping, or a
/// ready label list (one label per line).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelStep {
    Rating {
        source: PathBuf,
        column: String,
        mapping: MappingSource,
    },
    List {
        labels: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunPlan {
    pub output: PathBuf,
    /// Previously written master to resume from.
    #[serde(default)]
    pub master: Option<PathBuf>,
    #[serde(default)]
    pub master_list: Option<MasterListStep>,
    /// Keyed sources merged in order. Directories expand to their CSV files.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default, rename = "append")]
    pub appends: Vec<AppendStep>,
    #[serde(default)]
    pub label: Option<LabelStep>,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub finalize: bool,
    #[serde(default)]
    pub options: ConsolidationOptions,
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl RunPlan {
    /// Parses a plan from TOML text without touching the file system.
    pub fn parse(text: &str) -> Result<Self> {
        let plan: RunPlan = toml::from_str(text).context("parse run plan")?;
        plan.check()?;
        Ok(plan)
    }

    /// Reads a plan and resolves its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read run plan {}", path.display()))?;
        let mut plan = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        if let Some(base) = path.parent() {
            plan.resolve(base);
        }
        Ok(plan)
    }

    fn check(&self) -> Result<()> {
        if self.master.is_some() && self.master_list.is_some() {
            bail!("run plan sets both `master` and `master_list`");
        }
        if self.master.is_none() && self.master_list.is_none() && self.sources.is_empty() {
            bail!("run plan needs `sources`, `master` or `master_list`");
        }
        Ok(())
    }

    fn resolve(&mut self, base: &Path) {
        self.output = resolve_path(base, &self.output);
        if let Some(master) = &mut self.master {
            *master = resolve_path(base, master);
        }
        if let Some(list) = &mut self.master_list {
            list.names = resolve_path(base, &list.names);
            list.abbreviations = resolve_path(base, &list.abbreviations);
        }
        for source in &mut self.sources {
            *source = resolve_path(base, source);
        }
        for step in &mut self.appends {
            step.source = resolve_path(base, &step.source);
            step.mapping.resolve(base);
        }
        match &mut self.label {
            Some(LabelStep::Rating {
                source, mapping, ..
            }) => {
                *source = resolve_path(base, source);
                mapping.resolve(base);
            }
            Some(LabelStep::List { labels }) => {
                *labels = resolve_path(base, labels);
            }
            None => {}
        }
    }
}
