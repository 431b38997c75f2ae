//! Argument parsing and command execution for the `triagekit` binary.

mod args;
mod commands;

pub use args::{ClassifyArgs, Cli, Command, DescribeArgs, GeminiArgs, HotlistCommand};
pub use commands::{run, Output};
