//! Reforge CLI - command line front end for the reforge rewriting engine
//!
//! This crate provides option handling, output sinks and the concurrent
//! per-file runner behind the `reforge` binary.

pub mod options;
pub mod output;
pub mod runner;

// Re-export commonly used types for convenience
pub use options::{command, Options};
pub use output::{ConsoleSink, OutputSink};
pub use runner::{process_file, run_files, FileOutcome, FileStatus, Summary};

/// One `name  description` line per built-in rule, in catalog order.
pub fn rule_listing() -> String {
    let rules = reforge_core::rules::all_rules();
    let width = rules.iter().map(|rule| rule.name().len()).max().unwrap_or(0);
    rules
        .iter()
        .map(|rule| format!("{:width$}  {}\n", rule.name(), rule.description()))
        .collect()
}
