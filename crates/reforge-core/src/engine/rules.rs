/*!
# Refactoring Rules

Core trait for rewrite rules and the context a rule works through.
*/

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{Fragment, FragmentBuilder, NodeId, NodeRef, SyntaxKind, SyntaxTree};
use crate::resolver::Resolver;

use super::batch::{Edit, EditBatch, RejectedEdit};

/// Traversal directive returned by a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking into the node's children.
    Descend,
    /// The node's children are stale or handled for this pass.
    SkipSubtree,
}

/// A rewrite rule.
///
/// Rules are stateless between visits. A rule only sees nodes whose kind it
/// lists in [`interests`](Self::interests); every other kind is "no match,
/// descend". A visit either leaves the tree alone and returns
/// `Visit::Descend`, or stages edits through the context.
pub trait RefactoringRule: Send + Sync {
    /// Catalog name, used for configuration and diagnostics.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Node kinds this rule wants to visit.
    fn interests(&self) -> &'static [SyntaxKind];

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit;
}

/// Per-rule counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub rule: String,
    pub visits: usize,
    pub edits: usize,
    pub rejections: usize,
}

impl RuleStats {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            ..Self::default()
        }
    }
}

/// Handle given to a rule for one visit.
pub struct RuleContext<'a> {
    tree: &'a SyntaxTree,
    resolver: &'a dyn Resolver,
    batch: &'a mut EditBatch,
    rule: &'static str,
    iteration: usize,
    accepted: usize,
    rejected: Vec<RejectedEdit>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        resolver: &'a dyn Resolver,
        batch: &'a mut EditBatch,
        rule: &'static str,
        iteration: usize,
    ) -> Self {
        Self {
            tree,
            resolver,
            batch,
            rule,
            iteration,
            accepted: 0,
            rejected: Vec::new(),
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }

    /// Builds a detached fragment whose ids cannot clash with the tree.
    pub fn build(&mut self, f: impl FnOnce(&mut FragmentBuilder<'_>) -> NodeId) -> Fragment {
        let mut builder = FragmentBuilder::new(self.tree, self.batch.ids_mut());
        let root = f(&mut builder);
        builder.finish(root)
    }

    pub fn replace(&mut self, target: NodeRef<'_>, replacement: Fragment) -> Visit {
        self.record(Edit::Replace {
            target: target.id(),
            replacement,
        })
    }

    pub fn replace_with(
        &mut self,
        target: NodeRef<'_>,
        f: impl FnOnce(&mut FragmentBuilder<'_>) -> NodeId,
    ) -> Visit {
        let replacement = self.build(f);
        self.replace(target, replacement)
    }

    /// Replaces `target` with a copy of `source`.
    pub fn replace_with_copy(&mut self, target: NodeRef<'_>, source: NodeRef<'_>) -> Visit {
        self.replace_with(target, |b| b.copy(source.id()))
    }

    pub fn remove(&mut self, target: NodeRef<'_>) -> Visit {
        self.record(Edit::Remove {
            target: target.id(),
        })
    }

    pub fn insert_before(&mut self, anchor: NodeRef<'_>, fragment: Fragment) -> Visit {
        self.record(Edit::InsertBefore {
            anchor: anchor.id(),
            fragment,
        })
    }

    pub fn insert_after(&mut self, anchor: NodeRef<'_>, fragment: Fragment) -> Visit {
        self.record(Edit::InsertAfter {
            anchor: anchor.id(),
            fragment,
        })
    }

    pub fn move_to(&mut self, target: NodeRef<'_>, new_parent: NodeRef<'_>, index: usize) -> Visit {
        self.record(Edit::Move {
            target: target.id(),
            new_parent: new_parent.id(),
            index,
        })
    }

    /// Stages `edit`. Returns `SkipSubtree` when the batch accepted it and
    /// `Descend` when it was rejected.
    pub fn record(&mut self, edit: Edit) -> Visit {
        let node = edit.key();
        let kind = edit.kind_name();
        match self.batch.record(self.tree, self.rule, edit) {
            Ok(()) => {
                debug!(rule = self.rule, %node, edit = kind, "accepted edit");
                self.accepted += 1;
                Visit::SkipSubtree
            }
            Err(reason) => {
                warn!(rule = self.rule, %node, edit = kind, %reason, "rejected edit");
                self.rejected.push(RejectedEdit {
                    rule: self.rule.to_string(),
                    iteration: self.iteration,
                    edit: kind.to_string(),
                    node,
                    reason,
                });
                Visit::Descend
            }
        }
    }

    /// Number of accepted edits and the rejections of this visit.
    pub(crate) fn finish(self) -> (usize, Vec<RejectedEdit>) {
        (self.accepted, self.rejected)
    }
}
