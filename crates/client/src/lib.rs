//! Line-oriented command runner for ContextQuest.
//!
//! The `contextquest` binary reads one command per line from stdin and writes
//! one JSON result per recognized command to stdout. [`CliRunner`] holds the
//! parsing and dispatch so it can be driven from tests without a process.

pub mod logging;
pub mod runner;

pub use runner::{CliResult, CliRunner, CommandError, CommandOutput, SlotSummary};
