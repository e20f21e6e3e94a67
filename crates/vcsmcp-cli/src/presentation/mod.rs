//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: handlers decide what to show, these
//! functions decide how it looks.

pub mod results;
pub mod tables;

pub use results::{format_failure, print_result};
pub use tables::{format_status_table, format_tools, truncate_string};
