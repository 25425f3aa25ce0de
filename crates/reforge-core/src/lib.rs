//! # Reforge Core
//!
//! Rule-based source rewriting engine, including:
//! - Arena syntax tree with detached fragments and a precedence-aware printer
//! - A Java-subset frontend and a syntax-only resolver
//! - Rule dispatch, conflict-checked edit batches and text projection
//! - The fixpoint driver that reruns the rules until nothing changes
//! - Three rule families: dead code, expression simplification and TestNG
//!   assertion normalization
//!
//! This crate provides the engine that front ends (the `reforge` CLI,
//! editor integrations, batch jobs) drive one document at a time.

#![warn(clippy::all)]

pub mod ast;
pub mod engine;
pub mod frontend;
pub mod resolver;
pub mod rules;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use ast::{Fragment, FragmentBuilder, NodeId, NodeKind, NodeRef, SyntaxKind, SyntaxTree};
pub use engine::{
    CancellationToken, Edit, EditBatch, EditRejection, RefactoringRule, Refactorer, RuleContext,
    RuleStats, RunReport, RunStatus, Visit,
};
pub use frontend::{create_frontend, Frontend, ParseError};
pub use resolver::{Constant, Fact, MethodSignature, Resolver, TypeDescriptor};

/// Reforge version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for reforge components.
///
/// `RUST_LOG` wins; without it the engine logs at `info`.
pub fn init_tracing() {
    init_tracing_with("reforge_core=info");
}

/// Initialize tracing with `default_directive` used when `RUST_LOG` is unset.
pub fn init_tracing_with(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    // A subscriber installed earlier (tests, host application) stays in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of edit batches applied to one document
    pub max_iterations: usize,
    /// Rules to run, in order; empty selects the whole catalog
    pub rules: Vec<String>,
    /// Treat a run that hits the iteration cap as a failure
    pub fail_on_non_convergence: bool,
    /// Frontend used to parse documents, see [`create_frontend`]
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            rules: Vec::new(),
            fail_on_non_convergence: true,
            language: "java".to_string(),
        }
    }
}

/// Error types for reforge runs
#[derive(thiserror::Error, Debug)]
pub enum RefactorError {
    /// The input document did not parse
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The iteration cap was reached with edits still pending
    #[error("no fixpoint after {iterations} iterations")]
    NonConvergence { iterations: usize, text: String },

    /// The run was cancelled between iterations
    #[error("cancelled after {iterations} iterations")]
    Cancelled { iterations: usize, text: String },

    /// A pass produced text that could not be rendered or re-parsed
    #[error("invalid rewrite: {reason}")]
    InvalidRewrite { reason: String, text: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RefactorError {
    /// Best text available when the run stopped early.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            RefactorError::NonConvergence { text, .. }
            | RefactorError::Cancelled { text, .. }
            | RefactorError::InvalidRewrite { text, .. } => Some(text),
            RefactorError::Parse(_) | RefactorError::Config(_) => None,
        }
    }
}

/// Result type for reforge operations
pub type Result<T> = std::result::Result<T, RefactorError>;
