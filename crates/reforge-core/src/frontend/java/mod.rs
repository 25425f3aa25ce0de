// Java subset frontend: nom lexer, recursive-descent parser and the
// syntax-only resolver.

pub mod lexer;
pub mod parser;

use crate::ast::SyntaxTree;
use crate::frontend::{Frontend, ParseError};
use crate::resolver::{Resolver, SyntacticResolver};

/// Frontend for the Java statement-level subset.
#[derive(Debug, Clone, Default)]
pub struct JavaFrontend {
    bindings: Vec<(String, String)>,
    static_imports: Vec<String>,
}

impl JavaFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` to have type `ty` in every document, on top of the
    /// declarations the resolver finds in the document itself.
    pub fn with_binding(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.bindings.push((name.into(), ty.into()));
        self
    }

    /// Treats every document as if it statically imported all members of
    /// `owner` (e.g. `org.testng.Assert`).
    pub fn with_static_import(mut self, owner: impl Into<String>) -> Self {
        self.static_imports.push(owner.into());
        self
    }
}

impl Frontend for JavaFrontend {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        parser::parse(source)
    }

    fn resolver<'t>(&self, tree: &'t SyntaxTree) -> Box<dyn Resolver + 't> {
        let resolver = self
            .bindings
            .iter()
            .fold(SyntacticResolver::new(tree), |r, (name, ty)| {
                r.with_binding(name, ty)
            });
        let resolver = self
            .static_imports
            .iter()
            .fold(resolver, |r, owner| r.with_static_import(owner));
        Box::new(resolver)
    }

    fn name(&self) -> &'static str {
        "java"
    }
}
