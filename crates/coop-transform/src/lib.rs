//! Consolidation stages for cooperative tables.
//!
//! - **key**: identity column canonicalization
//! - **merge**: sequential keyed left-outer merge
//! - **align**: mapping-based column and rating appends
//! - **clean**: removal of uninformative columns
//! - **normalize**: coercion, pruning, imputation, dedupe and standardization
//! - **rating**: worst-case rating resolution
//! - **edit**: manual column/row deletion
//! - **frame**: conversion to a polars `DataFrame`
//! - **pipeline**: the [`ConsolidationRun`] façade

pub mod align;
pub mod clean;
pub mod edit;
pub mod frame;
pub mod key;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod rating;

pub use align::{
    append_by_mapping, append_labels, append_rating_by_mapping, append_rating_into, create_master,
};
pub use clean::{CleanReport, drop_useless_columns};
pub use edit::{delete_columns, delete_rows_by_values};
pub use frame::to_dataframe;
pub use key::normalize_key;
pub use merge::merge_sequential;
pub use normalize::{NormalizeReport, coerce_number, coerce_number_strict, normalize_and_finalize};
pub use pipeline::ConsolidationRun;
pub use rating::resolve_worst_rating;
