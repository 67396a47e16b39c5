//! Table ingestion for cooperative consolidation.
//!
//! This crate reads source tables from delimited text into the typed
//! [`coop_model::Table`], writes consolidated tables back out, and offers a
//! few read-only views used to inspect sources before merging.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use coop_ingest::{read_csv_table, write_csv_table, WriteOptions};
//!
//! let table = read_csv_table(Path::new("data/preprocessed/temp/01_balance.csv"))?;
//! write_csv_table(&table, Path::new("data/processed/dataset.csv"), WriteOptions::default())?;
//! ```

mod csv_table;
mod discovery;
mod error;
mod inspect;
mod writer;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv_table::{read_csv_headers, read_csv_table, read_csv_table_from_reader};

// === CSV Writing ===
pub use writer::{
    WriteOptions, write_csv_table, write_csv_table_atomic, write_csv_table_to_writer,
};

// === File Discovery ===
pub use discovery::list_csv_files;

// === Inspection ===
pub use inspect::{TableShape, column_slice, first_column_values, head, table_shape};
