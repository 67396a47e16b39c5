//! CLI argument definitions for the consolidation tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "coop-consolidate",
    version,
    about = "Consolidate cooperative financial tables into one analysis-ready dataset",
    long_about = "Merge per-source CSV tables on the cooperative name, append mapped \
                  columns and rating labels, drop uninformative columns and normalize \
                  feature values.\n\n\
                  Every command reads and writes UTF-8 CSV with a header row; the first \
                  column of each source is its identity column."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge source tables on their first column into one master table.
    Merge(MergeArgs),

    /// Build a master table from a name list and an abbreviation list.
    Create(CreateArgs),

    /// Append a source table's columns through a row mapping.
    Append(AppendArgs),

    /// Add the rating label column, from a rating source or a label list.
    Label(LabelArgs),

    /// Drop all-missing, all-zero and constant columns.
    Clean(StageArgs),

    /// Coerce, prune, impute, deduplicate and standardize feature columns.
    Finalize(StageArgs),

    /// Delete columns or rows from a table.
    Edit(EditArgs),

    /// Execute a full run described by a TOML plan.
    Run(RunArgs),

    /// Resolve raw rating strings to their worst rating.
    Rating(RatingArgs),

    /// Show the shape, header and first rows of a table.
    Inspect(InspectArgs),
}

/// Options shared by commands that write a table.
#[derive(Args, Clone, Default)]
pub struct OutputArgs {
    /// TOML file with consolidation options.
    #[arg(long = "options", value_name = "PATH")]
    pub options: Option<PathBuf>,

    /// Do not write a UTF-8 byte-order mark.
    #[arg(long = "no-bom")]
    pub no_bom: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Source CSV files or directories, merged in the order given.
    ///
    /// A directory contributes its `*.csv` files sorted by name.
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Existing master to merge onto instead of anchoring on the first source.
    #[arg(long = "master", value_name = "PATH")]
    pub master: Option<PathBuf>,

    /// Output CSV path.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct CreateArgs {
    /// CSV whose first column lists the cooperative names.
    #[arg(long = "names", value_name = "PATH")]
    pub names: PathBuf,

    /// CSV whose first column lists the abbreviations, parallel to the names.
    #[arg(long = "abbreviations", value_name = "PATH")]
    pub abbreviations: PathBuf,

    /// Output CSV path.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct AppendArgs {
    /// Master table to append to.
    #[arg(long = "master", value_name = "PATH")]
    pub master: PathBuf,

    /// Source table whose non-key columns are appended.
    #[arg(long = "source", value_name = "PATH")]
    pub source: PathBuf,

    /// Row mapping: inline (`0,2,-1`) or a JSON file holding an integer list.
    #[arg(long = "mapping", value_name = "MAPPING", allow_hyphen_values = true)]
    pub mapping: String,

    /// Output CSV path (default: overwrite the master).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct LabelArgs {
    /// Master table to label.
    #[arg(long = "master", value_name = "PATH")]
    pub master: PathBuf,

    /// Rating source table.
    #[arg(long = "source", value_name = "PATH", requires_all = ["column", "mapping"], conflicts_with = "labels")]
    pub source: Option<PathBuf>,

    /// Rating column in the source table.
    #[arg(long = "column", value_name = "NAME")]
    pub column: Option<String>,

    /// Row mapping into the source: inline (`0,2,-1`) or a JSON file.
    #[arg(long = "mapping", value_name = "MAPPING", allow_hyphen_values = true)]
    pub mapping: Option<String>,

    /// Ready-made labels, one per line, in master row order.
    #[arg(long = "labels", value_name = "PATH")]
    pub labels: Option<PathBuf>,

    /// Output CSV path (default: overwrite the master).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct StageArgs {
    /// Master table to process.
    #[arg(value_name = "MASTER")]
    pub master: PathBuf,

    /// Output CSV path (default: overwrite the master).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct EditArgs {
    /// Table to edit.
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Column to delete (repeatable). Unknown names are ignored.
    #[arg(long = "drop-column", value_name = "NAME")]
    pub drop_columns: Vec<String>,

    /// Column index whose values select rows to delete.
    #[arg(long = "row-column", value_name = "INDEX", requires = "drop_values")]
    pub row_column: Option<usize>,

    /// Cell value whose rows are deleted (repeatable, exact match).
    #[arg(long = "drop-value", value_name = "VALUE", requires = "row_column")]
    pub drop_values: Vec<String>,

    /// Output CSV path (default: overwrite the table).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: OutputArgs,
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML run plan.
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Execute every stage but do not write the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RatingArgs {
    /// Raw rating strings, e.g. `AA-/A+`.
    #[arg(value_name = "RATING", required = true, allow_hyphen_values = true)]
    pub values: Vec<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Table to inspect.
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Number of rows to show.
    #[arg(long = "head", value_name = "N", default_value_t = 5)]
    pub head: usize,

    /// Show one column (by index) instead of the first rows.
    #[arg(long = "column", value_name = "INDEX")]
    pub column: Option<usize>,

    /// First row of the column slice.
    #[arg(long = "offset", value_name = "N", default_value_t = 0)]
    pub offset: usize,

    /// Maximum rows of the column slice.
    #[arg(long = "limit", value_name = "N", default_value_t = 20)]
    pub limit: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
