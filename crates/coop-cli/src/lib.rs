//! Command-line front end for cooperative table consolidation.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod plan;
pub mod summary;
pub mod types;
