// TestNG assertion normalization: boolean assertions over comparisons
// become the specific assertion, and `if (cond) fail();` becomes one
// assertion call.

use crate::ast::{FragmentBuilder, InfixOperator, NodeId, NodeKind, NodeRef, PrefixOperator, SyntaxKind};
use crate::engine::{RefactoringRule, RuleContext, Visit};
use crate::resolver::{Fact, MethodSignature, Resolver, TESTNG_ASSERT};

const STRING: &str = "java.lang.String";

pub struct TestNGAssert;

/// Assertion call that states `condition` (or its negation) directly.
struct Assertion<'t> {
    method: &'static str,
    operands: Vec<NodeRef<'t>>,
}

impl<'t> Assertion<'t> {
    fn new(method: &'static str, operands: Vec<NodeRef<'t>>) -> Self {
        Self { method, operands }
    }
}

/// Classifies `condition` as the assertion that fails exactly when
/// `condition != holds`.
fn classify<'t>(condition: NodeRef<'t>, holds: bool, resolver: &dyn Resolver) -> Option<Assertion<'t>> {
    let condition = condition.without_parentheses();
    if let Some(value) = resolver.resolve_constant(condition).as_bool() {
        return (value != holds).then(|| Assertion::new("fail", Vec::new()));
    }
    match condition.kind() {
        NodeKind::Prefix {
            operator: PrefixOperator::Not,
            operand,
        } => classify(condition.at(*operand), !holds, resolver),
        NodeKind::Infix {
            operator: operator @ (InfixOperator::Equals | InfixOperator::NotEquals),
            left,
            right,
        } => {
            let equal = (*operator == InfixOperator::Equals) == holds;
            let (left, right) = (condition.at(*left), condition.at(*right));
            let pick = |yes: &'static str, no: &'static str| if equal { yes } else { no };
            match (left.is_null_literal(), right.is_null_literal()) {
                (true, true) => return None,
                (false, true) => return Some(Assertion::new(pick("assertNull", "assertNotNull"), vec![left])),
                (true, false) => return Some(Assertion::new(pick("assertNull", "assertNotNull"), vec![right])),
                (false, false) => {}
            }
            if resolver.is_primitive(left) || resolver.is_primitive(right) {
                return Some(Assertion::new(pick("assertEquals", "assertNotEquals"), vec![left, right]));
            }
            let known = |node| resolver.static_type_of(node).is_known();
            (known(left) && known(right))
                .then(|| Assertion::new(pick("assertSame", "assertNotSame"), vec![left, right]))
        }
        NodeKind::MethodCall {
            receiver: Some(receiver),
            name,
            arguments,
        } if name == "equals" && arguments.len() == 1 => {
            resolver.method_signature_of(condition).into_known()?;
            let method = if holds { "assertEquals" } else { "assertNotEquals" };
            Some(Assertion::new(
                method,
                vec![condition.at(*receiver), condition.at(arguments[0])],
            ))
        }
        _ => None,
    }
}

/// The `String` message argument, when `signature` is a message overload.
fn message<'t>(call: NodeRef<'t>, signature: &MethodSignature) -> Option<NodeRef<'t>> {
    let NodeKind::MethodCall { arguments, .. } = call.kind() else {
        return None;
    };
    let last = signature.param_types.last()?;
    (last == STRING && arguments.len() == signature.arity())
        .then(|| call.at(arguments[signature.arity() - 1]))
}

fn testng_signature(call: NodeRef<'_>, resolver: &dyn Resolver) -> Option<MethodSignature> {
    match resolver.method_signature_of(call) {
        Fact::Known(signature) if signature.owner == TESTNG_ASSERT => Some(signature),
        _ => None,
    }
}

/// `receiver.method(operands.., message)` with everything copied from `call`.
fn build_call(
    b: &mut FragmentBuilder<'_>,
    call: NodeRef<'_>,
    method: &str,
    operands: &[NodeRef<'_>],
    message: Option<NodeRef<'_>>,
) -> NodeId {
    let receiver = match call.kind() {
        NodeKind::MethodCall {
            receiver: Some(receiver),
            ..
        } => Some(b.copy(*receiver)),
        _ => None,
    };
    let arguments = operands
        .iter()
        .chain(message.as_ref())
        .map(|node| b.copy(node.id()))
        .collect();
    b.call(receiver, method, arguments)
}

impl TestNGAssert {
    fn visit_call(&self, call: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        let NodeKind::MethodCall { name, arguments, .. } = call.kind() else {
            return Visit::Descend;
        };
        let resolver = cx.resolver();
        let Some(signature) = testng_signature(call, resolver) else {
            return Visit::Descend;
        };
        let message = message(call, &signature);

        let assertion = match name.as_str() {
            "assertTrue" | "assertFalse" => {
                classify(call.at(arguments[0]), name == "assertTrue", resolver)
            }
            "assertEquals" | "assertNotEquals" => {
                let equal = name == "assertEquals";
                let method = if equal { "assertNull" } else { "assertNotNull" };
                let (first, second) = (call.at(arguments[0]), call.at(arguments[1]));
                let comparable_arity = signature.arity() == 2 || message.is_some();
                match (first.is_null_literal(), second.is_null_literal()) {
                    (false, true) if comparable_arity => Some(Assertion::new(method, vec![first])),
                    (true, false) if comparable_arity => Some(Assertion::new(method, vec![second])),
                    _ => None,
                }
            }
            _ => None,
        };
        match assertion {
            Some(Assertion { method, operands }) => {
                cx.replace_with(call, |b| build_call(b, call, method, &operands, message))
            }
            None => Visit::Descend,
        }
    }

    fn visit_if(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        let NodeKind::If {
            condition,
            then_branch,
            else_branch: None,
        } = node.kind()
        else {
            return Visit::Descend;
        };
        let statements = node.at(*then_branch).as_statement_list();
        let &[statement] = statements.as_slice() else {
            return Visit::Descend;
        };
        let NodeKind::ExpressionStatement { expression } = statement.kind() else {
            return Visit::Descend;
        };
        let fail = statement.at(*expression);
        let resolver = cx.resolver();
        let is_fail = matches!(fail.kind(), NodeKind::MethodCall { name, .. } if name == "fail");
        let Some(signature) = testng_signature(fail, resolver).filter(|_| is_fail) else {
            return Visit::Descend;
        };
        let message = message(fail, &signature);

        let condition = node.at(*condition);
        let assertion = classify(condition, false, resolver).unwrap_or_else(|| {
            match condition.without_parentheses().kind() {
                NodeKind::Prefix {
                    operator: PrefixOperator::Not,
                    operand,
                } => Assertion::new("assertTrue", vec![condition.at(*operand)]),
                _ => Assertion::new("assertFalse", vec![condition]),
            }
        });
        cx.replace_with(node, |b| {
            let call = build_call(b, fail, assertion.method, &assertion.operands, message);
            b.expression_statement(call)
        })
    }
}

impl RefactoringRule for TestNGAssert {
    fn name(&self) -> &'static str {
        "testng-assert"
    }

    fn description(&self) -> &'static str {
        "Rewrites TestNG boolean assertions and guarded failures into specific assertions"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::MethodCall, SyntaxKind::If]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        match node.kind() {
            NodeKind::MethodCall { .. } => self.visit_call(node, cx),
            NodeKind::If { .. } => self.visit_if(node, cx),
            _ => Visit::Descend,
        }
    }
}
