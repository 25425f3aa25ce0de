//! Rewrites files concurrently, one independent engine run per file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use reforge_core::{create_frontend, EngineConfig, Refactorer, RunReport, RunStatus};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::options::Options;
use crate::output::OutputSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Rewritten,
    Failed(String),
}

/// Result of processing one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Present whenever the file parsed
    pub report: Option<RunReport>,
    pub status: FileStatus,
}

/// Totals over one invocation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub changed: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: &FileOutcome) {
        self.processed += 1;
        match outcome.status {
            FileStatus::Unchanged => {}
            FileStatus::Rewritten => self.changed += 1,
            FileStatus::Failed(_) => self.failed += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn load_and_run(path: &Path, config: &EngineConfig) -> Result<(String, RunReport)> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let frontend = create_frontend(&config.language)?;
    let report = Refactorer::from_config(config)?.run(frontend.as_ref(), &source)?;
    Ok((source, report))
}

/// Runs the engine over one file and writes the result back when `write`
/// is set and the run succeeded.
pub fn process_file(path: &Path, config: &EngineConfig, write: bool) -> FileOutcome {
    let failed = |message: String| FileOutcome {
        path: path.to_path_buf(),
        report: None,
        status: FileStatus::Failed(message),
    };
    let (source, report) = match load_and_run(path, config) {
        Ok(loaded) => loaded,
        Err(e) => return failed(format!("{e:#}")),
    };

    let failure = match &report.status {
        RunStatus::Converged => None,
        RunStatus::NonConvergence if !config.fail_on_non_convergence => {
            warn!(path = %path.display(), iterations = report.iterations, "keeping text from unfinished run");
            None
        }
        RunStatus::NonConvergence => Some(format!(
            "no fixpoint after {} iterations",
            report.iterations
        )),
        RunStatus::Cancelled => Some("cancelled".to_string()),
        RunStatus::InvalidRewrite { reason } => Some(format!("invalid rewrite: {reason}")),
    };

    let status = match failure {
        Some(message) => FileStatus::Failed(message),
        None if report.text == source => FileStatus::Unchanged,
        None if write => match fs::write(path, &report.text) {
            Ok(()) => FileStatus::Rewritten,
            Err(e) => FileStatus::Failed(format!("writing {}: {e}", path.display())),
        },
        None => FileStatus::Rewritten,
    };
    debug!(path = %path.display(), status = ?status, iterations = report.iterations, "processed file");

    FileOutcome {
        path: path.to_path_buf(),
        report: Some(report),
        status,
    }
}

fn emit(outcome: &FileOutcome, options: &Options, sink: &dyn OutputSink) {
    if let (true, Some(report)) = (options.report, &outcome.report) {
        sink.on_report(&outcome.path, report);
    }
    match (&outcome.status, &outcome.report) {
        (FileStatus::Failed(message), _) => sink.on_error(&outcome.path, message),
        (_, Some(report)) if !options.write && !options.report => {
            sink.on_text(&outcome.path, &report.text)
        }
        _ => {}
    }
}

/// Processes every file of `options` on the blocking pool and hands the
/// outcomes to `sink` in command line order.
pub async fn run_files(options: &Options, sink: &dyn OutputSink) -> Result<Summary> {
    // Unknown rule names or languages fail the invocation before any file
    // is touched.
    Refactorer::from_config(&options.config)?;
    create_frontend(&options.config.language)?;

    let mut tasks = JoinSet::new();
    for (index, path) in options.files.iter().cloned().enumerate() {
        let config = options.config.clone();
        let write = options.write;
        tasks.spawn_blocking(move || (index, process_file(&path, &config, write)));
    }

    let mut outcomes = Vec::with_capacity(options.files.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("file task did not complete")?);
    }
    outcomes.sort_by_key(|(index, _)| *index);

    let mut summary = Summary::default();
    for (_, outcome) in &outcomes {
        summary.record(outcome);
        emit(outcome, options, sink);
    }
    info!(
        processed = summary.processed,
        changed = summary.changed,
        failed = summary.failed,
        "done"
    );
    Ok(summary)
}
