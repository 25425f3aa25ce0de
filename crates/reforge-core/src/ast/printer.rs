// Source generation for fragments.
// Copied nodes are reproduced verbatim from the document they were copied
// from; synthetic nodes are printed from their structure, adding
// parentheses wherever a child binds looser than its position allows.

use super::fragment::Fragment;
use super::{precedence, LiteralKind, NodeId, NodeKind, Origin, PrefixOperator, Slot};

/// Types that can produce their source text against a document.
pub trait ToSource {
    fn to_source(&self, document: &str) -> String;
}

/// Minimum binding strength an expression needs to sit in `slot` of
/// `parent` without parentheses. Zero means any expression fits.
pub fn required_precedence(parent: &NodeKind, slot: Slot) -> u8 {
    match (parent, slot) {
        (NodeKind::Infix { operator, .. }, Slot::Left) => operator.precedence(),
        // Java infix operators are left associative.
        (NodeKind::Infix { operator, .. }, Slot::Right) => operator.precedence() + 1,
        (NodeKind::Prefix { .. }, _) | (NodeKind::Cast { .. }, _) => precedence::UNARY,
        (NodeKind::Postfix { .. }, _) => precedence::POSTFIX,
        (NodeKind::InstanceOf { .. }, _) => precedence::RELATIONAL,
        (NodeKind::MethodCall { .. }, Slot::Receiver)
        | (NodeKind::FieldAccess { .. }, Slot::Receiver)
        | (NodeKind::ArrayAccess { .. }, Slot::Array) => precedence::PRIMARY,
        (NodeKind::Conditional { .. }, Slot::Condition) => precedence::CONDITIONAL_OR,
        (NodeKind::Conditional { .. }, _) => precedence::CONDITIONAL,
        (NodeKind::Assignment { .. }, Slot::Target) => precedence::POSTFIX,
        (NodeKind::Assignment { .. }, Slot::Value) => precedence::ASSIGNMENT,
        _ => 0,
    }
}

pub(crate) fn render(fragment: &Fragment, id: NodeId, document: &str) -> String {
    let Some(node) = fragment.node(id) else {
        return String::new();
    };
    match node.origin {
        Origin::Source(range) | Origin::Copied(range) => document
            .get(range.start..range.end)
            .unwrap_or_default()
            .to_string(),
        Origin::Synthetic => Printer { fragment, document }.print(&node.kind),
    }
}

struct Printer<'a> {
    fragment: &'a Fragment,
    document: &'a str,
}

impl Printer<'_> {
    fn text(&self, id: NodeId) -> String {
        render(self.fragment, id, self.document)
    }

    /// Child text, parenthesised when it binds looser than `slot` requires.
    fn child(&self, parent: &NodeKind, slot: Slot, id: NodeId) -> String {
        let text = self.text(id);
        let binds = self
            .fragment
            .node(id)
            .map(|n| n.kind.precedence())
            .unwrap_or(precedence::PRIMARY);
        if binds < required_precedence(parent, slot) {
            format!("({text})")
        } else {
            text
        }
    }

    fn list(&self, ids: &[NodeId], separator: &str) -> String {
        ids.iter()
            .map(|id| self.text(*id))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn local_variable(&self, kind: &NodeKind, terminated: bool) -> String {
        let NodeKind::LocalVariable {
            modifiers,
            ty,
            name,
            initializer,
        } = kind
        else {
            return self.print(kind);
        };
        let mut result = String::new();
        for modifier in modifiers {
            result.push_str(modifier);
            result.push(' ');
        }
        result.push_str(&format!("{ty} {name}"));
        if let Some(init) = initializer {
            result.push_str(&format!(" = {}", self.text(*init)));
        }
        if terminated {
            result.push(';');
        }
        result
    }

    fn for_clause(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|id| match self.fragment.node(*id) {
                Some(node) if matches!(node.origin, Origin::Synthetic) => {
                    self.local_variable(&node.kind, false)
                }
                _ => self.text(*id),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print(&self, kind: &NodeKind) -> String {
        match kind {
            NodeKind::Literal(literal) => match literal.kind {
                LiteralKind::Null => "null".to_string(),
                _ => literal.raw.clone(),
            },
            NodeKind::Name(name) => name.clone(),
            NodeKind::This => "this".to_string(),
            NodeKind::Infix {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                self.child(kind, Slot::Left, *left),
                operator.token(),
                self.child(kind, Slot::Right, *right)
            ),
            NodeKind::Prefix { operator, operand } => {
                let operand_text = self.child(kind, Slot::Operand, *operand);
                // `- -x` must not collapse into a decrement.
                let clash = matches!(operator, PrefixOperator::Minus | PrefixOperator::Plus)
                    && operand_text.starts_with(operator.token());
                if clash {
                    format!("{} {operand_text}", operator.token())
                } else {
                    format!("{}{operand_text}", operator.token())
                }
            }
            NodeKind::Postfix { operator, operand } => format!(
                "{}{}",
                self.child(kind, Slot::Operand, *operand),
                operator.token()
            ),
            NodeKind::Parenthesized { expression } => format!("({})", self.text(*expression)),
            NodeKind::MethodCall {
                receiver,
                name,
                arguments,
            } => {
                let mut result = String::new();
                if let Some(receiver) = receiver {
                    result.push_str(&self.child(kind, Slot::Receiver, *receiver));
                    result.push('.');
                }
                result.push_str(&format!("{name}({})", self.list(arguments, ", ")));
                result
            }
            NodeKind::FieldAccess { receiver, name } => {
                format!("{}.{name}", self.child(kind, Slot::Receiver, *receiver))
            }
            NodeKind::ArrayAccess { array, index } => format!(
                "{}[{}]",
                self.child(kind, Slot::Array, *array),
                self.text(*index)
            ),
            NodeKind::InstanceOf { operand, ty } => {
                format!("{} instanceof {ty}", self.child(kind, Slot::Operand, *operand))
            }
            NodeKind::Cast { ty, operand } => {
                format!("({ty}) {}", self.child(kind, Slot::Operand, *operand))
            }
            NodeKind::Conditional {
                condition,
                then_value,
                else_value,
            } => format!(
                "{} ? {} : {}",
                self.child(kind, Slot::Condition, *condition),
                self.child(kind, Slot::ThenValue, *then_value),
                self.child(kind, Slot::ElseValue, *else_value)
            ),
            NodeKind::Assignment {
                operator,
                target,
                value,
            } => format!(
                "{} {operator} {}",
                self.child(kind, Slot::Target, *target),
                self.child(kind, Slot::Value, *value)
            ),
            NodeKind::New { ty, arguments } => {
                format!("new {ty}({})", self.list(arguments, ", "))
            }
            NodeKind::ExpressionStatement { expression } => format!("{};", self.text(*expression)),
            NodeKind::Empty => ";".to_string(),
            NodeKind::Return { value } => match value {
                Some(value) => format!("return {};", self.text(*value)),
                None => "return;".to_string(),
            },
            NodeKind::Throw { value } => format!("throw {};", self.text(*value)),
            NodeKind::Break { label } => match label {
                Some(label) => format!("break {label};"),
                None => "break;".to_string(),
            },
            NodeKind::Continue { label } => match label {
                Some(label) => format!("continue {label};"),
                None => "continue;".to_string(),
            },
            NodeKind::Block { statements } => {
                if statements.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", self.list(statements, " "))
                }
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut result = format!(
                    "if ({}) {}",
                    self.text(*condition),
                    self.text(*then_branch)
                );
                if let Some(else_branch) = else_branch {
                    result.push_str(&format!(" else {}", self.text(*else_branch)));
                }
                result
            }
            NodeKind::While { condition, body } => {
                format!("while ({}) {}", self.text(*condition), self.text(*body))
            }
            NodeKind::DoWhile { body, condition } => {
                format!("do {} while ({});", self.text(*body), self.text(*condition))
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => format!(
                "for ({}; {}; {}) {}",
                self.for_clause(init),
                condition.map(|c| self.text(c)).unwrap_or_default(),
                self.list(update, ", "),
                self.text(*body)
            ),
            NodeKind::ForEach {
                ty,
                name,
                iterable,
                body,
            } => format!(
                "for ({ty} {name} : {}) {}",
                self.text(*iterable),
                self.text(*body)
            ),
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                let mut result = format!("try {}", self.text(*body));
                for catch in catches {
                    result.push(' ');
                    result.push_str(&self.text(*catch));
                }
                if let Some(finally) = finally {
                    result.push_str(&format!(" finally {}", self.text(*finally)));
                }
                result
            }
            NodeKind::Catch { ty, name, body } => {
                format!("catch ({ty} {name}) {}", self.text(*body))
            }
            NodeKind::LocalVariable { .. } => self.local_variable(kind, true),
            NodeKind::Import {
                path,
                is_static,
                on_demand,
            } => format!(
                "import {}{path}{};",
                if *is_static { "static " } else { "" },
                if *on_demand { ".*" } else { "" }
            ),
            NodeKind::ClassDecl {
                modifiers,
                name,
                members,
            } => {
                let mut result = String::new();
                for modifier in modifiers {
                    result.push_str(modifier);
                    result.push(' ');
                }
                result.push_str(&format!("class {name} {{"));
                for member in members {
                    result.push_str("\n    ");
                    result.push_str(&self.text(*member));
                }
                result.push_str("\n}");
                result
            }
            NodeKind::MethodDecl {
                modifiers,
                return_type,
                name,
                parameters,
                body,
            } => {
                let mut result = String::new();
                for modifier in modifiers {
                    result.push_str(modifier);
                    result.push(' ');
                }
                let parameters = parameters
                    .iter()
                    .map(|p| format!("{} {}", p.ty, p.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                result.push_str(&format!("{return_type} {name}({parameters})"));
                match body {
                    Some(body) => {
                        result.push(' ');
                        result.push_str(&self.text(*body));
                    }
                    None => result.push(';'),
                }
                result
            }
            NodeKind::Unit {
                package,
                imports,
                items,
            } => {
                let mut lines = Vec::new();
                if let Some(package) = package {
                    lines.push(format!("package {package};"));
                }
                lines.extend(imports.iter().map(|i| self.text(*i)));
                lines.extend(items.iter().map(|i| self.text(*i)));
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FragmentBuilder, IdAllocator, InfixOperator, SyntaxKind, SyntaxTree};
    use crate::frontend::{java::JavaFrontend, Frontend};

    fn parse(source: &str) -> SyntaxTree {
        JavaFrontend::new().parse(source).unwrap()
    }

    fn all(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<NodeId> {
        tree.descendants(tree.root_id())
            .into_iter()
            .filter(|id| tree.kind(*id).syntax_kind() == kind)
            .collect()
    }

    #[test]
    fn test_copied_nodes_keep_comments_and_spacing() {
        let tree = parse("foo( a /* keep */ ,b );");
        let call = all(&tree, SyntaxKind::MethodCall)[0];
        let mut ids = IdAllocator::after(&tree);
        let fragment = tree.copy(call, &mut ids);
        assert_eq!(fragment.to_source(tree.source()), "foo( a /* keep */ ,b )");
    }

    #[test]
    fn test_right_operand_of_same_precedence_is_parenthesised() {
        let tree = parse("x = a - b;");
        let names = all(&tree, SyntaxKind::Name);
        let infix = all(&tree, SyntaxKind::Infix)[0];
        let mut ids = IdAllocator::after(&tree);
        let mut builder = FragmentBuilder::new(&tree, &mut ids);
        let left = builder.copy(names[0]);
        let right = builder.copy(infix);
        let root = builder.infix(InfixOperator::Minus, left, right);
        let fragment = builder.finish(root);
        assert_eq!(fragment.to_source(tree.source()), "x - (a - b)");
    }

    #[test]
    fn test_synthetic_call_with_receiver_and_statement() {
        let tree = parse("Assert.assertTrue(a.equals(b));");
        let calls = all(&tree, SyntaxKind::MethodCall);
        let NodeKind::MethodCall { receiver, .. } = tree.kind(calls[0]) else {
            panic!("expected call");
        };
        let NodeKind::MethodCall {
            receiver: inner_receiver,
            arguments,
            ..
        } = tree.kind(calls[1])
        else {
            panic!("expected call");
        };
        let mut ids = IdAllocator::after(&tree);
        let mut builder = FragmentBuilder::new(&tree, &mut ids);
        let receiver = builder.copy(receiver.unwrap());
        let first = builder.copy(inner_receiver.unwrap());
        let second = builder.copy(arguments[0]);
        let call = builder.call(Some(receiver), "assertEquals", vec![first, second]);
        let statement = builder.expression_statement(call);
        let fragment = builder.finish(statement);
        assert_eq!(
            fragment.to_source(tree.source()),
            "Assert.assertEquals(a, b);"
        );
    }

    #[test]
    fn test_required_precedence_for_receivers() {
        let call = NodeKind::MethodCall {
            receiver: Some(NodeId::new(0, 0)),
            name: "m".into(),
            arguments: vec![],
        };
        assert_eq!(
            required_precedence(&call, Slot::Receiver),
            precedence::PRIMARY
        );
        assert_eq!(required_precedence(&call, Slot::Arguments(0)), 0);
    }
}
