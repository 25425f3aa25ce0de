/*!
# Expression Simplification

Local rewrites of expressions into shorter equivalents:

- redundant parentheses are dropped where the operator context allows it;
- `compareTo`/`compare` results tested against a non-zero constant become
  direct relational comparisons;
- comparisons with boolean literals collapse to the operand or its negation;
- `&&`/`||` with a constant left operand collapse;
- a `!= null` guard next to a check that already implies non-null is
  dropped;
- an explicit `this.` receiver is removed.
*/

use crate::ast::printer::required_precedence;
use crate::ast::{InfixOperator, NodeId, NodeKind, NodeRef, SyntaxKind};
use crate::engine::{RefactoringRule, RuleContext, Visit};
use crate::resolver::{Constant, Fact, Resolver};

const COMPARABLE: &str = "java.lang.Comparable";
const COMPARATOR: &str = "java.util.Comparator";
const STRING: &str = "java.lang.String";

pub struct SimplifyExpression;

impl SimplifyExpression {
    fn parentheses(&self, node: NodeRef<'_>, inner: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        let (Some(parent), Some(slot)) = (node.parent(), node.slot()) else {
            return Visit::Descend;
        };
        match inner.kind() {
            NodeKind::Infix { .. }
            | NodeKind::Cast { .. }
            | NodeKind::Assignment { .. }
            | NodeKind::Conditional { .. } => return Visit::Descend,
            NodeKind::InstanceOf { .. } if in_string_concatenation(node, cx.resolver()) => {
                return Visit::Descend
            }
            _ => {}
        }
        if inner.kind().precedence() < required_precedence(parent.kind(), slot) {
            return Visit::Descend;
        }
        // `-(-a)` must not become `--a`.
        if let NodeKind::Prefix { operator, .. } = parent.kind() {
            let sign = operator.token();
            if matches!(sign, "-" | "+") && inner.text().starts_with(sign) {
                return Visit::Descend;
            }
        }
        cx.replace_with_copy(node, inner)
    }

    fn infix(
        &self,
        node: NodeRef<'_>,
        operator: InfixOperator,
        left: NodeRef<'_>,
        right: NodeRef<'_>,
        cx: &mut RuleContext<'_>,
    ) -> Visit {
        match operator {
            InfixOperator::Equals | InfixOperator::NotEquals => {
                let equals = operator == InfixOperator::Equals;
                if let Some((less, greater)) = comparison_operands(left, cx.resolver()) {
                    return self.compare_result(node, equals, less, greater, right, cx);
                }
                let literal_side = match (left.as_boolean_literal(), right.as_boolean_literal()) {
                    (_, Some(value)) => Some((left, value)),
                    (Some(value), None) => Some((right, value)),
                    (None, None) => None,
                };
                match literal_side {
                    Some((operand, value)) if value == equals => cx.replace_with_copy(node, operand),
                    Some((operand, _)) => cx.replace_with(node, |b| b.negate(operand.id())),
                    None => Visit::Descend,
                }
            }
            InfixOperator::ConditionalAnd | InfixOperator::ConditionalOr => {
                let is_or = operator == InfixOperator::ConditionalOr;
                match cx.resolver().resolve_constant(left).as_bool() {
                    // `true || x`, `false && x`
                    Some(value) if value == is_or => cx.replace_with(node, |b| b.boolean(value)),
                    Some(_) => cx.replace_with_copy(node, right),
                    None if !is_or => self.null_guard(node, left, right, cx),
                    None => Visit::Descend,
                }
            }
            _ => Visit::Descend,
        }
    }

    fn compare_result(
        &self,
        node: NodeRef<'_>,
        equals: bool,
        less: NodeId,
        greater: NodeId,
        right: NodeRef<'_>,
        cx: &mut RuleContext<'_>,
    ) -> Visit {
        let Constant::Numeric(value) = cx.resolver().resolve_constant(right) else {
            return Visit::Descend;
        };
        if value == 0.0 {
            return Visit::Descend;
        }
        let operator = match (equals, value < 0.0) {
            (true, true) => InfixOperator::Less,
            (true, false) => InfixOperator::Greater,
            (false, true) => InfixOperator::GreaterEquals,
            (false, false) => InfixOperator::LessEquals,
        };
        cx.replace_with(node, |b| {
            let left = b.copy(less);
            let right = b.copy(greater);
            b.infix(operator, left, right)
        })
    }

    /// `x != null && check(x)` where `check(x)` already fails for null.
    fn null_guard(
        &self,
        node: NodeRef<'_>,
        left: NodeRef<'_>,
        right: NodeRef<'_>,
        cx: &mut RuleContext<'_>,
    ) -> Visit {
        let resolver = cx.resolver();
        if let Some(checked) = non_null_operand(left) {
            if implies_non_null(right, checked, resolver) {
                return cx.replace_with_copy(node, right);
            }
        }
        if let Some(checked) = non_null_operand(right) {
            if implies_non_null(left, checked, resolver) {
                return cx.replace_with_copy(node, left);
            }
        }
        Visit::Descend
    }
}

fn in_string_concatenation(node: NodeRef<'_>, resolver: &dyn Resolver) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        NodeKind::Infix {
            operator: InfixOperator::Plus,
            left,
            right,
        } => [*left, *right].into_iter().any(|side| {
            matches!(
                resolver.static_type_of(parent.at(side)),
                Fact::Known(ty) if ty.qualified_name == STRING
            )
        }),
        _ => false,
    }
}

/// Operands ordered so that `call < 0` means `less < greater`.
fn comparison_operands(call: NodeRef<'_>, resolver: &dyn Resolver) -> Option<(NodeId, NodeId)> {
    let call = call.without_parentheses();
    let NodeKind::MethodCall {
        receiver,
        arguments,
        ..
    } = call.kind()
    else {
        return None;
    };
    let signature = resolver.method_signature_of(call).into_known()?;
    match (signature.owner.as_str(), signature.name.as_str(), arguments.as_slice()) {
        (COMPARABLE, "compareTo", [argument]) | (STRING, "compareToIgnoreCase", [argument]) => {
            Some(((*receiver)?, *argument))
        }
        (COMPARATOR, "compare", [first, second]) => Some((*first, *second)),
        _ => None,
    }
}

/// `x` for `x != null` or `null != x`.
fn non_null_operand(check: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let check = check.without_parentheses();
    let NodeKind::Infix {
        operator: InfixOperator::NotEquals,
        left,
        right,
    } = check.kind()
    else {
        return None;
    };
    let (left, right) = (check.at(*left), check.at(*right));
    match (left.is_null_literal(), right.is_null_literal()) {
        (false, true) => Some(left),
        (true, false) => Some(right),
        _ => None,
    }
}

fn implies_non_null(check: NodeRef<'_>, checked: NodeRef<'_>, resolver: &dyn Resolver) -> bool {
    let tree = check.tree();
    let same = |node: NodeRef<'_>| tree.subtree_matches(node.without_parentheses().id(), checked.id());
    let check = check.without_parentheses();
    match check.kind() {
        NodeKind::InstanceOf { operand, .. } => same(check.at(*operand)),
        NodeKind::MethodCall {
            receiver: Some(receiver),
            name,
            arguments,
        } if (name == "equals" || name == "equalsIgnoreCase") && arguments.len() == 1 => {
            let receiver = check.at(*receiver);
            let constant_receiver = matches!(
                resolver.resolve_constant(receiver),
                Constant::Text(_) | Constant::Numeric(_) | Constant::True | Constant::False
            );
            same(receiver) || (constant_receiver && same(check.at(arguments[0])))
        }
        _ => false,
    }
}

impl RefactoringRule for SimplifyExpression {
    fn name(&self) -> &'static str {
        "simplify-expression"
    }

    fn description(&self) -> &'static str {
        "Rewrites expressions into simpler equivalent forms"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::Parenthesized,
            SyntaxKind::Infix,
            SyntaxKind::MethodCall,
        ]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        match node.kind() {
            NodeKind::Parenthesized { expression } => {
                self.parentheses(node, node.at(*expression), cx)
            }
            NodeKind::Infix {
                operator,
                left,
                right,
            } => self.infix(node, *operator, node.at(*left), node.at(*right), cx),
            NodeKind::MethodCall {
                receiver: Some(receiver),
                ..
            } if node.at(*receiver).is(SyntaxKind::This) => cx.remove(node.at(*receiver)),
            _ => Visit::Descend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Refactorer;
    use crate::frontend::java::JavaFrontend;
    use pretty_assertions::assert_eq;

    fn run_with(frontend: &JavaFrontend, source: &str) -> String {
        Refactorer::new()
            .add_rule(SimplifyExpression)
            .run(frontend, source)
            .unwrap()
            .into_result()
            .unwrap()
    }

    fn run(source: &str) -> String {
        run_with(&JavaFrontend::new(), source)
    }

    #[test]
    fn test_redundant_parentheses() {
        assert_eq!(run("x = (a);"), "x = a;");
        assert_eq!(run("f(((b)));"), "f(b);");
        assert_eq!(run("y = (a.b()).c();"), "y = a.b().c();");
        assert_eq!(run("z = !(ok);"), "z = !ok;");
    }

    #[test]
    fn test_parentheses_kept_for_precedence() {
        for source in [
            "x = (a + b) * c;",
            "x = (int) (a);",
            "x = (a = b);",
            "x = (c ? a : b);",
            "x = !(a instanceof T);",
            "x = \"is: \" + (a instanceof T);",
            "x = -(-a);",
        ] {
            let expected = source.replace("(int) (a)", "(int) a");
            assert_eq!(run(source), expected, "{source}");
        }
    }

    #[test]
    fn test_instanceof_unwrapped_in_logical_context() {
        assert_eq!(run("x = a && (b instanceof T);"), "x = a && b instanceof T;");
    }

    #[test]
    fn test_compare_to_against_constant() {
        let source = "Integer x = 1;\nInteger y = 2;\nboolean a = x.compareTo(y) == -1;\nboolean b = x.compareTo(y) != 1;\nboolean c = (x.compareTo(y)) == 1;\nboolean d = x.compareTo(y) == 0;\n";
        assert_eq!(
            run(source),
            "Integer x = 1;\nInteger y = 2;\nboolean a = x < y;\nboolean b = x <= y;\nboolean c = x > y;\nboolean d = x.compareTo(y) == 0;\n"
        );
    }

    #[test]
    fn test_comparator_and_ignore_case() {
        let frontend = JavaFrontend::new()
            .with_binding("cmp", "java.util.Comparator<String>")
            .with_binding("s", "String");
        assert_eq!(
            run_with(&frontend, "r = cmp.compare(p, q) != -1;"),
            "r = p >= q;"
        );
        assert_eq!(
            run_with(&frontend, "r = s.compareToIgnoreCase(t) == 1;"),
            "r = s > t;"
        );
        // Unknown receiver type: no rewrite.
        assert_eq!(run("r = u.compareTo(v) == -1;"), "r = u.compareTo(v) == -1;");
    }

    #[test]
    fn test_boolean_literal_comparisons() {
        assert_eq!(run("r = done == true;"), "r = done;");
        assert_eq!(run("r = done != true;"), "r = !done;");
        assert_eq!(run("r = false == done;"), "r = !done;");
        assert_eq!(run("r = done != false;"), "r = done;");
        assert_eq!(run("r = (a == b) == false;"), "r = !(a == b);");
        assert_eq!(run("r = !ready == false;"), "r = ready;");
    }

    #[test]
    fn test_constant_left_operand() {
        assert_eq!(run("r = true || x;"), "r = true;");
        assert_eq!(run("r = false || x;"), "r = x;");
        assert_eq!(run("r = true && x;"), "r = x;");
        assert_eq!(run("r = false && x;"), "r = false;");
    }

    #[test]
    fn test_redundant_null_guard() {
        assert_eq!(run("r = a != null && a.equals(b);"), "r = a.equals(b);");
        assert_eq!(run("r = null != a && a instanceof T;"), "r = a instanceof T;");
        assert_eq!(run("r = a instanceof T && a != null;"), "r = a instanceof T;");
        assert_eq!(run("r = a != null && \"k\".equals(a);"), "r = \"k\".equals(a);");
        assert_eq!(
            run("r = a != null && b.equals(a);"),
            "r = a != null && b.equals(a);"
        );
    }

    #[test]
    fn test_this_receiver_is_dropped() {
        assert_eq!(run("this.reset(a);"), "reset(a);");
        assert_eq!(run("x = this.value;"), "x = this.value;");
    }
}
