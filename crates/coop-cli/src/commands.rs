//! Command implementations.
//!
//! Each table-producing command loads its inputs, drives a
//! [`ConsolidationRun`] and writes the result atomically. Output for the
//! user is printed by the caller from the returned [`CommandOutcome`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use coop_ingest::{
    WriteOptions, column_slice, first_column_values, head, list_csv_files, read_csv_table,
    table_shape, write_csv_table_atomic,
};
use coop_model::{ConsolidationOptions, EventLog, Stage, Table};
use coop_transform::{ConsolidationRun, delete_columns, delete_rows_by_values, resolve_worst_rating};

use crate::cli::{
    AppendArgs, CreateArgs, EditArgs, InspectArgs, LabelArgs, MergeArgs, OutputArgs, RatingArgs,
    RunArgs, StageArgs,
};
use crate::plan::{LabelStep, MappingSource, RunPlan};
use crate::types::CommandOutcome;

/// Loads consolidation options from an optional TOML file.
pub fn load_options(common: &OutputArgs) -> Result<ConsolidationOptions> {
    let options: ConsolidationOptions = match &common.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read options {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parse options {}", path.display()))?
        }
        None => ConsolidationOptions::default(),
    };
    Ok(if common.no_bom {
        options.with_bom(false)
    } else {
        options
    })
}

/// Expands directories to their CSV files (sorted by name); files pass
/// through in the order given.
pub fn expand_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let listed = list_csv_files(path)
                .with_context(|| format!("list csv files in {}", path.display()))?;
            files.extend(listed);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn load_table(path: &Path) -> Result<Table> {
    read_csv_table(path).with_context(|| format!("load {}", path.display()))
}

fn load_tables(paths: &[PathBuf], events: &mut EventLog) -> Result<Vec<Table>> {
    paths
        .iter()
        .map(|path| {
            let table = load_table(path)?;
            events.info(
                Stage::Load,
                format!(
                    "loaded {} ({} rows, {} columns)",
                    path.display(),
                    table.row_count(),
                    table.column_count()
                ),
            );
            Ok(table)
        })
        .collect()
}

fn load_labels(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read labels {}", path.display()))?;
    Ok(text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(|line| line.trim().to_string())
        .collect())
}

fn write_output(
    command: &'static str,
    table: &Table,
    mut events: EventLog,
    output: Option<&Path>,
    options: &ConsolidationOptions,
) -> Result<CommandOutcome> {
    if let Some(path) = output {
        write_csv_table_atomic(table, path, WriteOptions::default().with_bom(options.write_bom))
            .with_context(|| format!("write {}", path.display()))?;
        events.info(Stage::Write, format!("wrote {}", path.display()));
        info!(path = %path.display(), rows = table.row_count(), "output written");
    }
    Ok(CommandOutcome {
        command,
        output: output.map(Path::to_path_buf),
        shape: table_shape(table),
        events,
    })
}

fn finish_run(
    command: &'static str,
    run: ConsolidationRun,
    mut loaded: EventLog,
    output: Option<&Path>,
) -> Result<CommandOutcome> {
    let options = run.options().clone();
    let (table, events) = run.finish()?;
    loaded.extend(events);
    write_output(command, &table, loaded, output, &options)
}

pub fn run_merge(args: &MergeArgs) -> Result<CommandOutcome> {
    let span = info_span!("merge_command");
    let _guard = span.enter();
    let options = load_options(&args.common)?;
    let mut loaded = EventLog::new();
    let sources = expand_sources(&args.sources)?;
    if sources.is_empty() {
        bail!("no source tables found");
    }
    let tables = load_tables(&sources, &mut loaded)?;
    let mut run = match &args.master {
        Some(path) => ConsolidationRun::from_master(options, load_table(path)?),
        None => ConsolidationRun::new(options),
    };
    run.merge_sources(tables)?;
    finish_run("merge", run, loaded, Some(args.output.as_path()))
}

pub fn run_create(args: &CreateArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let names = first_column_values(&load_table(&args.names)?);
    let abbreviations = first_column_values(&load_table(&args.abbreviations)?);
    let run = ConsolidationRun::with_master_list(options, &names, &abbreviations)?;
    finish_run("create", run, EventLog::new(), Some(args.output.as_path()))
}

pub fn run_append(args: &AppendArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let mapping = MappingSource::from_arg(&args.mapping)?.load()?;
    let source = load_table(&args.source)?;
    let mut run = ConsolidationRun::from_master(options, load_table(&args.master)?);
    run.append_by_mapping(&source, &mapping)?;
    let output = args.output.as_deref().unwrap_or(&args.master);
    finish_run("append", run, EventLog::new(), Some(output))
}

pub fn run_label(args: &LabelArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let mut run = ConsolidationRun::from_master(options, load_table(&args.master)?);
    match (&args.source, &args.column, &args.mapping, &args.labels) {
        (Some(source), Some(column), Some(mapping), None) => {
            let mapping = MappingSource::from_arg(mapping)?.load()?;
            run.append_rating_by_mapping(&load_table(source)?, column, &mapping)?;
        }
        (None, None, None, Some(labels)) => {
            run.append_labels(&load_labels(labels)?)?;
        }
        _ => bail!("label needs either --source, --column and --mapping, or --labels"),
    }
    let output = args.output.as_deref().unwrap_or(&args.master);
    finish_run("label", run, EventLog::new(), Some(output))
}

pub fn run_clean(args: &StageArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let mut run = ConsolidationRun::from_master(options, load_table(&args.master)?);
    run.clean()?;
    let output = args.output.as_deref().unwrap_or(&args.master);
    finish_run("clean", run, EventLog::new(), Some(output))
}

pub fn run_finalize(args: &StageArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let mut run = ConsolidationRun::from_master(options, load_table(&args.master)?);
    run.finalize()?;
    let output = args.output.as_deref().unwrap_or(&args.master);
    finish_run("finalize", run, EventLog::new(), Some(output))
}

pub fn run_edit(args: &EditArgs) -> Result<CommandOutcome> {
    let options = load_options(&args.common)?;
    let mut table = load_table(&args.table)?;
    let mut events = EventLog::new();
    if !args.drop_columns.is_empty() {
        let removed = delete_columns(&mut table, &args.drop_columns);
        events.info(Stage::Clean, format!("deleted {removed} column(s)"));
    }
    if let Some(index) = args.row_column {
        let removed = delete_rows_by_values(&mut table, index, &args.drop_values)?;
        events.info(Stage::Clean, format!("deleted {removed} row(s)"));
    }
    let output = args.output.as_deref().unwrap_or(&args.table);
    write_output("edit", &table, events, Some(output), &options)
}

/// Executes a [`RunPlan`] already loaded from disk.
pub fn execute_plan(plan: &RunPlan, dry_run: bool) -> Result<CommandOutcome> {
    let span = info_span!("run_plan", output = %plan.output.display());
    let _guard = span.enter();
    let options = plan.options.clone();
    let mut loaded = EventLog::new();

    let mut run = if let Some(path) = &plan.master {
        ConsolidationRun::from_master(options, load_table(path)?)
    } else if let Some(list) = &plan.master_list {
        let names = first_column_values(&load_table(&list.names)?);
        let abbreviations = first_column_values(&load_table(&list.abbreviations)?);
        ConsolidationRun::with_master_list(options, &names, &abbreviations)?
    } else {
        ConsolidationRun::new(options)
    };

    let sources = expand_sources(&plan.sources)?;
    if !sources.is_empty() {
        let tables = load_tables(&sources, &mut loaded)?;
        run.merge_sources(tables)?;
    }

    for step in &plan.appends {
        let source = load_table(&step.source)?;
        let mapping = step.mapping.load()?;
        run.append_by_mapping(&source, &mapping)
            .with_context(|| format!("append {}", step.source.display()))?;
    }

    match &plan.label {
        Some(LabelStep::Rating {
            source,
            column,
            mapping,
        }) => {
            let mapping = mapping.load()?;
            run.append_rating_by_mapping(&load_table(source)?, column, &mapping)
                .with_context(|| format!("label from {}", source.display()))?;
        }
        Some(LabelStep::List { labels }) => {
            run.append_labels(&load_labels(labels)?)?;
        }
        None => {}
    }

    if plan.clean {
        run.clean()?;
    }
    if plan.finalize {
        run.finalize()?;
    }
    let output = (!dry_run).then_some(plan.output.as_path());
    finish_run("run", run, loaded, output)
}

pub fn run_plan(args: &RunArgs) -> Result<CommandOutcome> {
    let plan = RunPlan::load(&args.plan)?;
    execute_plan(&plan, args.dry_run)
}

pub fn run_rating(args: &RatingArgs) {
    for value in &args.values {
        println!("{value}\t{}", resolve_worst_rating(value));
    }
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let table = load_table(&args.table)?;
    let shape = table_shape(&table);
    println!("{}: {} rows x {} columns", args.table.display(), shape.rows, shape.columns);
    match args.column {
        Some(index) => {
            let values = column_slice(&table, index, args.offset, args.limit)?;
            for (row, value) in values.iter().enumerate() {
                println!("{}\t{}", args.offset + row, value.as_deref().unwrap_or(""));
            }
        }
        None => {
            for row in head(&table, args.head) {
                println!("{}", row.join("\t"));
            }
        }
    }
    Ok(())
}
