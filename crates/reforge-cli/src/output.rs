//! Output sinks for per-file results
//!
//! The runner hands every finished file to an [`OutputSink`], so the
//! console front end and tests can consume results differently.

use std::path::Path;

use reforge_core::RunReport;

/// Receives the outcome of each processed file, in command line order.
pub trait OutputSink: Send + Sync {
    /// Rewritten text of a file that was not written back
    fn on_text(&self, path: &Path, text: &str);

    /// Full run report, when `--report` was given
    fn on_report(&self, path: &Path, report: &RunReport);

    /// A file that could not be processed or did not reach a fixpoint
    fn on_error(&self, path: &Path, message: &str);
}

/// Prints text and reports to stdout, errors to stderr
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for ConsoleSink {
    fn on_text(&self, _path: &Path, text: &str) {
        print!("{text}");
        if !text.is_empty() && !text.ends_with('\n') {
            println!();
        }
    }

    fn on_report(&self, path: &Path, report: &RunReport) {
        let entry = serde_json::json!({
            "file": path.display().to_string(),
            "report": report,
        });
        match serde_json::to_string_pretty(&entry) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{}: cannot encode report: {e}", path.display()),
        }
    }

    fn on_error(&self, path: &Path, message: &str) {
        eprintln!("{}: {message}", path.display());
    }
}
