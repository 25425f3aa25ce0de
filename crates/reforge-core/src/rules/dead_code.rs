// Dead code elimination: constant conditions, empty branches and loops
// that can never do anything.

use crate::ast::{NodeKind, NodeRef, SyntaxKind};
use crate::engine::{RefactoringRule, RuleContext, Visit};

pub struct DeadCodeElimination;

fn is_empty_statement(node: NodeRef<'_>) -> bool {
    node.is(SyntaxKind::Empty)
}

fn is_empty_block(node: NodeRef<'_>) -> bool {
    matches!(node.kind(), NodeKind::Block { statements } if statements.is_empty())
}

impl DeadCodeElimination {
    fn visit_if(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        let NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } = node.kind()
        else {
            return Visit::Descend;
        };
        let then_branch = node.at(*then_branch);
        let else_branch = else_branch.map(|e| node.at(e));

        match cx.resolver().resolve_constant(node.at(*condition)).as_bool() {
            Some(true) => return cx.replace_with_copy(node, then_branch),
            Some(false) => {
                return match else_branch {
                    Some(else_branch) => cx.replace_with_copy(node, else_branch),
                    None => cx.remove(node),
                }
            }
            None => {}
        }

        let then_empty = is_empty_statement(then_branch);
        match else_branch {
            None if then_empty => cx.remove(node),
            Some(e) if then_empty && is_empty_statement(e) => cx.remove(node),
            Some(e) if is_empty_statement(e) || is_empty_block(e) => cx.remove(e),
            _ => Visit::Descend,
        }
    }
}

impl RefactoringRule for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code"
    }

    fn description(&self) -> &'static str {
        "Removes branches, loops and statements that can never have an effect"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::If,
            SyntaxKind::While,
            SyntaxKind::DoWhile,
            SyntaxKind::For,
            SyntaxKind::ForEach,
            SyntaxKind::Try,
            SyntaxKind::Empty,
        ]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        match node.kind() {
            NodeKind::If { .. } => self.visit_if(node, cx),
            NodeKind::While { condition, body } => {
                let never_runs =
                    cx.resolver().resolve_constant(node.at(*condition)).as_bool() == Some(false);
                if never_runs || is_empty_statement(node.at(*body)) {
                    cx.remove(node)
                } else {
                    Visit::Descend
                }
            }
            NodeKind::DoWhile { body, .. }
            | NodeKind::For { body, .. }
            | NodeKind::ForEach { body, .. }
                if is_empty_statement(node.at(*body)) =>
            {
                cx.remove(node)
            }
            NodeKind::Try { body, finally, .. } if is_empty_block(node.at(*body)) => {
                match finally {
                    Some(finally) => cx.replace_with_copy(node, node.at(*finally)),
                    None => cx.remove(node),
                }
            }
            NodeKind::Empty if node.slot().is_some_and(|slot| slot.is_statement_list()) => {
                cx.remove(node)
            }
            _ => Visit::Descend,
        }
    }
}
