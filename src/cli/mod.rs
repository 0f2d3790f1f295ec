//! Command-line interface
//!
//! Argument parsing, command dispatch and result rendering for the
//! `tripagg` binary.

pub mod args;
pub mod commands;
pub mod output;
pub mod router;

pub use args::{Cli, Commands, RunArgs};
pub use output::{write_table, OutputFormat};
pub use router::execute_command;
