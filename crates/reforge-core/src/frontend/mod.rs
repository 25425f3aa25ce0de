// Frontend module - binds a host language to the engine.
// A frontend turns document text into a `SyntaxTree` and provides the
// resolver the rules query for semantic facts about that tree.

use serde::{Deserialize, Serialize};

use crate::ast::SyntaxTree;
use crate::resolver::Resolver;

pub mod java;

pub use java::JavaFrontend;

/// Trait for all language frontends
pub trait Frontend: Send + Sync {
    /// Parse a whole document
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Resolver bound to one snapshot of a tree. Never cached across
    /// iterations: each parsed tree gets a fresh resolver.
    fn resolver<'t>(&self, tree: &'t SyntaxTree) -> Box<dyn Resolver + 't>;

    /// Get frontend name for diagnostics
    fn name(&self) -> &'static str;
}

/// A document that the frontend could not turn into a tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    /// Error at byte `offset` of `source`, with a 1-based line and column.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map(|nl| before[nl + 1..].chars().count())
            .unwrap_or_else(|| before.chars().count())
            + 1;
        Self {
            offset,
            line,
            column,
            message: message.into(),
        }
    }
}

/// Create a frontend by language name
pub fn create_frontend(language: &str) -> anyhow::Result<Box<dyn Frontend>> {
    match language {
        "java" => Ok(Box::new(JavaFrontend::new())),
        _ => anyhow::bail!("Unknown language: {}", language),
    }
}
