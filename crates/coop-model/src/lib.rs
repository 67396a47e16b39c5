//! Data model for cooperative table consolidation.
//!
//! - **table**: [`Table`], [`Column`] and the tagged [`CellValue`]
//! - **mapping**: [`IndexMapping`] row correspondences
//! - **rating**: the ordered [`Rating`] scale and resolved [`RatingValue`]
//! - **events**: the caller-owned [`EventLog`]
//! - **options**: [`ConsolidationOptions`]
//! - **error**: the structural [`TableError`] taxonomy

pub mod error;
pub mod events;
pub mod mapping;
pub mod options;
pub mod rating;
pub mod table;

pub use error::{Result, TableError};
pub use events::{EventLog, EventSeverity, PipelineEvent, Stage};
pub use mapping::{IndexMapping, NO_MATCH};
pub use options::{
    ConsolidationOptions, DEFAULT_ABBREVIATION_COLUMN, DEFAULT_LABEL_COLUMN,
    DEFAULT_PROTECTED_COLUMNS, SPARSE_NULL_FRACTION,
};
pub use rating::{Rating, RatingValue};
pub use table::{CellValue, Column, ENTITY_KEY, Table, unique_column_name};
