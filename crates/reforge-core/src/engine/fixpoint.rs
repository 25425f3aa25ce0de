/*!
# Fixpoint Driver

Parses the document, runs a pass, applies the accepted batch and repeats
until a pass stages nothing. Each iteration works on a fresh tree and a
fresh resolver; nothing from one snapshot leaks into the next.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::frontend::Frontend;
use crate::{EngineConfig, RefactorError};

use super::batch::RejectedEdit;
use super::rules::{RefactoringRule, RuleStats};
use super::text_mapper;
use super::traversal::{run_pass, Dispatcher};

/// External stop signal, checked before every pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The last pass staged no edit.
    Converged,
    /// The iteration cap was reached with edits still pending.
    NonConvergence,
    Cancelled,
    /// The rendered text could not be produced or did not parse.
    InvalidRewrite { reason: String },
}

/// Outcome of one run over one document.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Last successfully rendered text.
    pub text: String,
    /// Number of applied batches.
    pub iterations: usize,
    pub status: RunStatus,
    /// Per-rule counters in registration order.
    pub rule_stats: IndexMap<String, RuleStats>,
    pub rejections: Vec<RejectedEdit>,
}

impl RunReport {
    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }

    /// Rules that had at least one edit accepted.
    pub fn rules_applied(&self) -> Vec<&str> {
        self.rule_stats
            .values()
            .filter(|stats| stats.edits > 0)
            .map(|stats| stats.rule.as_str())
            .collect()
    }

    /// The final text, or the error matching a non-converged status.
    pub fn into_result(self) -> Result<String, RefactorError> {
        match self.status {
            RunStatus::Converged => Ok(self.text),
            RunStatus::NonConvergence => Err(RefactorError::NonConvergence {
                iterations: self.iterations,
                text: self.text,
            }),
            RunStatus::Cancelled => Err(RefactorError::Cancelled {
                iterations: self.iterations,
                text: self.text,
            }),
            RunStatus::InvalidRewrite { reason } => Err(RefactorError::InvalidRewrite {
                reason,
                text: self.text,
            }),
        }
    }
}

/// Fixpoint driver over an ordered rule registry.
pub struct Refactorer {
    rules: Vec<Arc<dyn RefactoringRule>>,
    max_iterations: usize,
    cancellation: Option<CancellationToken>,
}

impl Default for Refactorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Refactorer {
    /// Driver without rules.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            max_iterations: EngineConfig::default().max_iterations,
            cancellation: None,
        }
    }

    /// Driver with the whole built-in catalog in catalog order.
    pub fn with_catalog() -> Self {
        let mut refactorer = Self::new();
        refactorer.rules = crate::rules::all_rules();
        refactorer
    }

    /// Driver configured from `config`; an empty rule list selects the
    /// whole catalog.
    pub fn from_config(config: &EngineConfig) -> Result<Self, RefactorError> {
        let mut refactorer = Self::new().max_iterations(config.max_iterations);
        if config.rules.is_empty() {
            refactorer.rules = crate::rules::all_rules();
            return Ok(refactorer);
        }
        for name in &config.rules {
            let rule = crate::rules::by_name(name)
                .ok_or_else(|| RefactorError::Config(format!("unknown rule `{name}`")))?;
            refactorer.rules.push(rule);
        }
        Ok(refactorer)
    }

    /// Appends a rule; registration order is dispatch order.
    pub fn add_rule(mut self, rule: impl RefactoringRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn add_shared_rule(mut self, rule: Arc<dyn RefactoringRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Maximum number of batches applied before giving up.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Rewrites `source` until no rule has anything left to change.
    ///
    /// Only a parse failure of the input is an error; every other outcome
    /// is described by the report's status.
    pub fn run(&self, frontend: &dyn Frontend, source: &str) -> Result<RunReport, RefactorError> {
        let dispatcher = Dispatcher::new(&self.rules);
        let mut stats: Vec<RuleStats> = self
            .rules
            .iter()
            .map(|rule| RuleStats::new(rule.name()))
            .collect();
        let mut rejections = Vec::new();
        let mut text = source.to_string();
        let mut tree = frontend.parse(&text)?;
        let mut iterations = 0;

        let status = loop {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                break RunStatus::Cancelled;
            }

            let pass = {
                let resolver = frontend.resolver(&tree);
                run_pass(
                    &tree,
                    resolver.as_ref(),
                    &self.rules,
                    &dispatcher,
                    &mut stats,
                    iterations,
                )
            };
            let edits = pass.batch.len();
            let rejected = pass.rejections.len();
            rejections.extend(pass.rejections);

            if pass.batch.is_empty() {
                break RunStatus::Converged;
            }
            if iterations >= self.max_iterations {
                warn!(iterations, pending = edits, "iteration cap reached");
                break RunStatus::NonConvergence;
            }

            let rendered = match text_mapper::render(&tree, &pass.batch) {
                Ok(rendered) => rendered,
                Err(error) => {
                    break RunStatus::InvalidRewrite {
                        reason: error.to_string(),
                    }
                }
            };
            let next = match frontend.parse(&rendered) {
                Ok(next) => next,
                Err(error) => {
                    break RunStatus::InvalidRewrite {
                        reason: format!("rewritten text does not parse: {error}"),
                    }
                }
            };

            text = rendered;
            tree = next;
            iterations += 1;
            info!(iteration = iterations, edits, rejected, "applied edit batch");
        };

        info!(iterations, status = ?status, "run finished");
        Ok(RunReport {
            text,
            iterations,
            status,
            rule_stats: stats
                .into_iter()
                .map(|stats| (stats.rule.clone(), stats))
                .collect(),
            rejections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::ast::{NodeId, NodeKind, NodeRef, SyntaxKind};
    use crate::engine::{Edit, EditRejection, RuleContext, Visit};
    use crate::frontend::java::JavaFrontend;
    use pretty_assertions::assert_eq;

    struct Rename(&'static str, &'static str);

    impl RefactoringRule for Rename {
        fn name(&self) -> &'static str {
            "rename"
        }

        fn description(&self) -> &'static str {
            "renames one variable"
        }

        fn interests(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::Name]
        }

        fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
            match node.kind() {
                NodeKind::Name(name) if name == self.0 => {
                    let to = self.1;
                    cx.replace_with(node, |b| b.name(to))
                }
                _ => Visit::Descend,
            }
        }
    }

    /// Removes the first statement it sees, then keeps replaying that
    /// removal by id on later visits.
    #[derive(Default)]
    struct ReplayRemoval {
        kept: Mutex<Option<NodeId>>,
    }

    impl RefactoringRule for ReplayRemoval {
        fn name(&self) -> &'static str {
            "replay"
        }

        fn description(&self) -> &'static str {
            "removes one statement and remembers its id"
        }

        fn interests(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::ExpressionStatement]
        }

        fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
            let mut kept = self.kept.lock().unwrap();
            let previous = *kept;
            match previous {
                None => {
                    *kept = Some(node.id());
                    cx.remove(node)
                }
                Some(target) => cx.record(Edit::Remove { target }),
            }
        }
    }

    #[test]
    fn test_ids_from_an_earlier_pass_are_stale() {
        let report = Refactorer::new()
            .add_rule(ReplayRemoval::default())
            .run(&JavaFrontend::new(), "first();\nsecond();\nthird();\n")
            .unwrap();
        assert_eq!(report.status, RunStatus::Converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.text, "second();\nthird();\n");

        let later: Vec<&EditRejection> = report
            .rejections
            .iter()
            .filter(|rejection| rejection.iteration == 1)
            .map(|rejection| &rejection.reason)
            .collect();
        assert_eq!(later.len(), 2);
        assert!(later
            .iter()
            .all(|reason| matches!(reason, EditRejection::StaleNode { .. })));
    }

    #[test]
    fn test_no_rules_converges_immediately() {
        let report = Refactorer::new()
            .run(&JavaFrontend::new(), "a(); // note\n")
            .unwrap();
        assert_eq!(report.status, RunStatus::Converged);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.text, "a(); // note\n");
    }

    #[test]
    fn test_single_rewrite_then_verification_pass() {
        let report = Refactorer::new()
            .add_rule(Rename("a", "b"))
            .run(&JavaFrontend::new(), "f(a, a);")
            .unwrap();
        assert_eq!(report.text, "f(b, b);");
        assert_eq!(report.iterations, 1);
        assert_eq!(report.rules_applied(), vec!["rename"]);
        assert_eq!(report.rule_stats["rename"].edits, 2);
    }

    #[test]
    fn test_zero_cap_reports_non_convergence() {
        let report = Refactorer::new()
            .add_rule(Rename("a", "b"))
            .max_iterations(0)
            .run(&JavaFrontend::new(), "a;")
            .unwrap();
        assert_eq!(report.status, RunStatus::NonConvergence);
        assert_eq!(report.text, "a;");
        assert!(matches!(
            report.into_result(),
            Err(RefactorError::NonConvergence { iterations: 0, .. })
        ));
    }

    #[test]
    fn test_cancelled_before_first_pass() {
        let token = CancellationToken::new();
        token.cancel();
        let report = Refactorer::new()
            .add_rule(Rename("a", "b"))
            .with_cancellation(token)
            .run(&JavaFrontend::new(), "a;")
            .unwrap();
        assert_eq!(report.status, RunStatus::Cancelled);
        assert_eq!(report.text, "a;");
    }

    #[test]
    fn test_rewrite_that_breaks_parsing_is_invalid() {
        let report = Refactorer::new()
            .add_rule(Rename("a", "class"))
            .run(&JavaFrontend::new(), "f(a);")
            .unwrap();
        assert!(matches!(report.status, RunStatus::InvalidRewrite { .. }));
        assert_eq!(report.text, "f(a);");
    }

    #[test]
    fn test_unparsable_input_is_an_error() {
        let error = Refactorer::with_catalog()
            .run(&JavaFrontend::new(), "if (")
            .unwrap_err();
        assert!(matches!(error, RefactorError::Parse(_)));
    }

    #[test]
    fn test_unknown_rule_in_config() {
        let config = EngineConfig {
            rules: vec!["no-such-rule".into()],
            ..EngineConfig::default()
        };
        assert!(matches!(
            Refactorer::from_config(&config),
            Err(RefactorError::Config(_))
        ));
    }
}
