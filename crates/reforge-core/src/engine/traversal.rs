// Pre-order traversal driver.
// Each node is offered to the rules registered for its kind, in
// registration order. The first rule whose edit is accepted owns the node
// for this pass; nodes inside a consumed subtree are never dispatched.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::ast::{SyntaxKind, SyntaxTree};
use crate::resolver::Resolver;

use super::batch::{EditBatch, RejectedEdit};
use super::rules::{RefactoringRule, RuleContext, RuleStats, Visit};

/// Maps node kinds to the indices of the rules interested in them.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: HashMap<SyntaxKind, Vec<usize>>,
}

impl Dispatcher {
    pub fn new(rules: &[Arc<dyn RefactoringRule>]) -> Self {
        let mut table: HashMap<SyntaxKind, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for kind in rule.interests() {
                let entry = table.entry(*kind).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }
        Self { table }
    }

    pub fn rules_for(&self, kind: SyntaxKind) -> &[usize] {
        self.table.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Result of one traversal.
#[derive(Debug)]
pub struct Pass {
    pub batch: EditBatch,
    pub rejections: Vec<RejectedEdit>,
}

/// Walks `tree` once and collects the edits of every rule.
///
/// `stats` is indexed like `rules`.
pub fn run_pass(
    tree: &SyntaxTree,
    resolver: &dyn Resolver,
    rules: &[Arc<dyn RefactoringRule>],
    dispatcher: &Dispatcher,
    stats: &mut [RuleStats],
    iteration: usize,
) -> Pass {
    let mut batch = EditBatch::new(tree);
    let mut rejections = Vec::new();
    let mut stack = vec![tree.root_id()];

    while let Some(id) = stack.pop() {
        if batch.is_consumed(tree, id) {
            continue;
        }
        let node = tree.node(id);
        let mut skip = false;

        for &index in dispatcher.rules_for(node.syntax_kind()) {
            let rule = &rules[index];
            trace!(rule = rule.name(), node = %id, kind = ?node.syntax_kind(), "dispatch");
            stats[index].visits += 1;

            let mut cx = RuleContext::new(tree, resolver, &mut batch, rule.name(), iteration);
            let directive = rule.visit(node, &mut cx);
            let (accepted, rejected) = cx.finish();

            stats[index].edits += accepted;
            stats[index].rejections += rejected.len();
            rejections.extend(rejected);

            if directive == Visit::SkipSubtree {
                skip = true;
            }
            if accepted > 0 {
                skip = true;
                break;
            }
        }

        if !skip {
            stack.extend(node.kind().children().into_iter().rev());
        }
    }

    Pass { batch, rejections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, NodeRef};
    use crate::frontend::{java::JavaFrontend, Frontend};
    use pretty_assertions::assert_eq;

    /// Replaces every name `from` with the name `to`.
    struct Rename {
        name: &'static str,
        from: &'static str,
        to: &'static str,
    }

    impl RefactoringRule for Rename {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "renames a variable"
        }

        fn interests(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::Name]
        }

        fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
            match node.kind() {
                NodeKind::Name(name) if name == self.from => {
                    let to = self.to;
                    cx.replace_with(node, |b| b.name(to))
                }
                _ => Visit::Descend,
            }
        }
    }

    /// Counts visits without editing.
    struct Watch;

    impl RefactoringRule for Watch {
        fn name(&self) -> &'static str {
            "watch"
        }

        fn description(&self) -> &'static str {
            "observes names"
        }

        fn interests(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::Name, SyntaxKind::Name]
        }

        fn visit(&self, _node: NodeRef<'_>, _cx: &mut RuleContext<'_>) -> Visit {
            Visit::Descend
        }
    }

    fn rules() -> Vec<Arc<dyn RefactoringRule>> {
        vec![
            Arc::new(Rename {
                name: "rename",
                from: "a",
                to: "b",
            }),
            Arc::new(Watch),
        ]
    }

    #[test]
    fn test_dispatch_table_keeps_registration_order() {
        let dispatcher = Dispatcher::new(&rules());
        assert_eq!(dispatcher.rules_for(SyntaxKind::Name), &[0, 1]);
        assert!(dispatcher.rules_for(SyntaxKind::If).is_empty());
    }

    #[test]
    fn test_first_accepted_rule_owns_the_node() {
        let frontend = JavaFrontend::new();
        let tree = frontend.parse("f(a, c);").unwrap();
        let resolver = frontend.resolver(&tree);
        let rules = rules();
        let dispatcher = Dispatcher::new(&rules);
        let mut stats = vec![RuleStats::new("rename"), RuleStats::new("watch")];

        let pass = run_pass(&tree, resolver.as_ref(), &rules, &dispatcher, &mut stats, 0);

        assert_eq!(pass.batch.len(), 1);
        assert!(pass.rejections.is_empty());
        assert_eq!(stats[0].visits, 2);
        assert_eq!(stats[0].edits, 1);
        // `a` was taken by the rename, so only `c` reached the watcher.
        assert_eq!(stats[1].visits, 1);
    }
}
