// Syntax-only resolver for the Java subset.
// Declarations are collected into one flat table per document; a name
// declared with two different types resolves to nothing.

use std::collections::HashMap;

use super::{Constant, Fact, MethodSignature, Resolver, TypeDescriptor, TESTNG_ASSERT};
use crate::ast::{InfixOperator, LiteralKind, NodeKind, NodeRef, PrefixOperator, SyntaxTree};

const OBJECT: &str = "java.lang.Object";
const STRING: &str = "java.lang.String";
const COMPARABLE: &str = "java.lang.Comparable";
const COMPARATOR: &str = "java.util.Comparator";

const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "short", "char", "int", "long", "float", "double",
];

#[derive(Debug, Clone)]
struct StaticImport {
    owner: String,
    member: Option<String>,
}

pub struct SyntacticResolver<'t> {
    tree: &'t SyntaxTree,
    declarations: HashMap<String, Option<String>>,
    imports: HashMap<String, String>,
    static_imports: Vec<StaticImport>,
}

impl<'t> SyntacticResolver<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        let mut resolver = Self {
            tree,
            declarations: HashMap::new(),
            imports: HashMap::new(),
            static_imports: Vec::new(),
        };
        for id in tree.descendants(tree.root_id()) {
            match tree.kind(id) {
                NodeKind::LocalVariable { ty, name, .. }
                | NodeKind::ForEach { ty, name, .. }
                | NodeKind::Catch { ty, name, .. } => resolver.declare(name, ty),
                NodeKind::MethodDecl { parameters, .. } => {
                    for parameter in parameters {
                        resolver.declare(&parameter.name, &parameter.ty);
                    }
                }
                NodeKind::Import {
                    path,
                    is_static: true,
                    on_demand,
                } => {
                    let import = match (on_demand, path.rsplit_once('.')) {
                        (false, Some((owner, member))) => StaticImport {
                            owner: owner.to_string(),
                            member: Some(member.to_string()),
                        },
                        _ => StaticImport {
                            owner: path.clone(),
                            member: None,
                        },
                    };
                    resolver.static_imports.push(import);
                }
                NodeKind::Import {
                    path,
                    is_static: false,
                    on_demand: false,
                } => {
                    let simple = path.rsplit('.').next().unwrap_or(path);
                    resolver.imports.insert(simple.to_string(), path.clone());
                }
                _ => {}
            }
        }
        resolver
    }

    /// Declares `name` with type `ty`, overriding what the document says.
    pub fn with_binding(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.declarations.insert(name.into(), Some(ty.into()));
        self
    }

    /// Assumes `import static <owner>.*;`.
    pub fn with_static_import(mut self, owner: impl Into<String>) -> Self {
        self.static_imports.push(StaticImport {
            owner: owner.into(),
            member: None,
        });
        self
    }

    fn declare(&mut self, name: &str, ty: &str) {
        let ty = ty.trim();
        self.declarations
            .entry(name.to_string())
            .and_modify(|known| {
                if known.as_deref() != Some(ty) {
                    *known = None;
                }
            })
            .or_insert_with(|| Some(ty.to_string()));
    }

    fn declared_type(&self, name: &str) -> Option<&str> {
        self.declarations.get(name).and_then(|ty| ty.as_deref())
    }

    fn describe(&self, ty: &str) -> TypeDescriptor {
        let ty = ty.trim();
        if ty.ends_with("[]") || ty.ends_with("...") {
            return TypeDescriptor::object(ty, &[OBJECT]);
        }
        let base = ty[..ty.find('<').unwrap_or(ty.len())].trim();
        if PRIMITIVE_TYPES.contains(&base) {
            return TypeDescriptor::primitive(base);
        }
        let simple = base.rsplit('.').next().unwrap_or(base);
        let qualified_jdk = |package: &str| base == simple || base == format!("{package}.{simple}");
        match simple {
            "String" if qualified_jdk("java.lang") => {
                TypeDescriptor::object(STRING, &[OBJECT, COMPARABLE, "java.lang.CharSequence"])
            }
            "Integer" | "Long" | "Short" | "Byte" | "Double" | "Float"
                if qualified_jdk("java.lang") =>
            {
                TypeDescriptor::object(
                    format!("java.lang.{simple}"),
                    &[OBJECT, "java.lang.Number", COMPARABLE],
                )
            }
            "Character" | "Boolean" if qualified_jdk("java.lang") => {
                TypeDescriptor::object(format!("java.lang.{simple}"), &[OBJECT, COMPARABLE])
            }
            "BigDecimal" | "BigInteger" if qualified_jdk("java.math") => TypeDescriptor::object(
                format!("java.math.{simple}"),
                &[OBJECT, "java.lang.Number", COMPARABLE],
            ),
            "Object" if qualified_jdk("java.lang") => TypeDescriptor::object(OBJECT, &[]),
            "Comparable" if qualified_jdk("java.lang") => {
                TypeDescriptor::object(COMPARABLE, &[OBJECT])
            }
            "Comparator" if qualified_jdk("java.util") => {
                TypeDescriptor::object(COMPARATOR, &[OBJECT])
            }
            "Date" if qualified_jdk("java.util") => {
                TypeDescriptor::object("java.util.Date", &[OBJECT, COMPARABLE])
            }
            _ => {
                let qualified = if base.contains('.') {
                    base.to_string()
                } else {
                    self.imports
                        .get(base)
                        .cloned()
                        .unwrap_or_else(|| base.to_string())
                };
                TypeDescriptor::object(qualified, &[OBJECT])
            }
        }
    }

    fn unboxed(ty: &TypeDescriptor) -> Option<&'static str> {
        if ty.primitive {
            return PRIMITIVE_TYPES
                .iter()
                .copied()
                .find(|p| *p == ty.qualified_name);
        }
        match ty.qualified_name.as_str() {
            "java.lang.Boolean" => Some("boolean"),
            "java.lang.Byte" => Some("byte"),
            "java.lang.Short" => Some("short"),
            "java.lang.Character" => Some("char"),
            "java.lang.Integer" => Some("int"),
            "java.lang.Long" => Some("long"),
            "java.lang.Float" => Some("float"),
            "java.lang.Double" => Some("double"),
            _ => None,
        }
    }

    /// Binary numeric promotion of two operand types.
    fn promoted(&self, left: NodeRef<'_>, right: NodeRef<'_>) -> Fact<TypeDescriptor> {
        let rank = |p: &str| match p {
            "double" => Some(3),
            "float" => Some(2),
            "long" => Some(1),
            "int" | "short" | "byte" | "char" => Some(0),
            _ => None,
        };
        let operand_rank = |node: NodeRef<'_>| {
            self.static_type_of(node)
                .into_known()
                .and_then(|ty| Self::unboxed(&ty))
                .and_then(rank)
        };
        match (operand_rank(left), operand_rank(right)) {
            (Some(l), Some(r)) => {
                let name = ["int", "long", "float", "double"][l.max(r)];
                Fact::Known(TypeDescriptor::primitive(name))
            }
            _ => Fact::Unknown,
        }
    }

    fn is_string(&self, node: NodeRef<'_>) -> bool {
        matches!(self.static_type_of(node), Fact::Known(ty) if ty.qualified_name == STRING)
    }

    fn is_statically_imported(&self, owner: &str, member: &str) -> bool {
        self.static_imports.iter().any(|import| {
            import.owner == owner && import.member.as_deref().map_or(true, |m| m == member)
        })
    }

    /// Whether `node` is a reference to the class `qualified`.
    fn names_class(&self, node: NodeRef<'_>, qualified: &str) -> bool {
        match node.kind() {
            NodeKind::Name(simple) => {
                self.declared_type(simple).is_none()
                    && qualified.rsplit('.').next() == Some(simple.as_str())
                    && self.imports.get(simple).map(String::as_str) == Some(qualified)
            }
            NodeKind::FieldAccess { .. } => {
                let text: String = node.text().chars().filter(|c| !c.is_whitespace()).collect();
                text == qualified
            }
            _ => false,
        }
    }

    fn testng_signature(&self, name: &str, arguments: &[NodeRef<'_>]) -> Fact<MethodSignature> {
        let message_last = arguments.last().is_some_and(|a| self.is_string(*a));
        let value_type = || match arguments {
            [a, b, ..] => match (self.static_type_of(*a), self.static_type_of(*b)) {
                (Fact::Known(x), Fact::Known(y)) if x.primitive && x == y => x.qualified_name,
                _ => OBJECT.to_string(),
            },
            _ => OBJECT.to_string(),
        };
        let params: Vec<String> = match (name, arguments.len()) {
            ("assertTrue" | "assertFalse", 1) => vec!["boolean".into()],
            ("assertTrue" | "assertFalse", 2) => vec!["boolean".into(), STRING.into()],
            ("assertNull" | "assertNotNull", 1) => vec![OBJECT.into()],
            ("assertNull" | "assertNotNull", 2) => vec![OBJECT.into(), STRING.into()],
            ("assertSame" | "assertNotSame", 2) => vec![OBJECT.into(), OBJECT.into()],
            ("assertSame" | "assertNotSame", 3) => {
                vec![OBJECT.into(), OBJECT.into(), STRING.into()]
            }
            ("assertEquals" | "assertNotEquals", 2) => vec![value_type(), value_type()],
            ("assertEquals" | "assertNotEquals", 3) if message_last => {
                vec![value_type(), value_type(), STRING.into()]
            }
            ("assertEquals" | "assertNotEquals", 3) if self.is_primitive(arguments[2]) => {
                vec!["double".into(), "double".into(), "double".into()]
            }
            ("assertEquals" | "assertNotEquals", 4) => vec![
                "double".into(),
                "double".into(),
                "double".into(),
                STRING.into(),
            ],
            ("fail", 0) => vec![],
            ("fail", 1) => vec![STRING.into()],
            _ => return Fact::Unknown,
        };
        Fact::Known(MethodSignature {
            owner: TESTNG_ASSERT.to_string(),
            name: name.to_string(),
            param_types: params,
        })
    }

    fn receiver_signature(
        &self,
        receiver: NodeRef<'_>,
        name: &str,
        arity: usize,
    ) -> Fact<MethodSignature> {
        let receiver_type = self.static_type_of(receiver).into_known();
        let receiver_is = |qualified: &str| {
            receiver_type
                .as_ref()
                .is_some_and(|ty| !ty.primitive && ty.is_subtype_of(qualified))
        };
        let signature = match (name, arity) {
            ("equals", 1) => {
                let owner = receiver_type
                    .as_ref()
                    .filter(|ty| !ty.primitive)
                    .map(|ty| ty.qualified_name.as_str())
                    .unwrap_or(OBJECT);
                MethodSignature::new(owner, name, &[OBJECT])
            }
            ("equalsIgnoreCase" | "compareToIgnoreCase", 1) if receiver_is(STRING) => {
                MethodSignature::new(STRING, name, &[STRING])
            }
            ("compareTo", 1) if receiver_is(COMPARABLE) => {
                MethodSignature::new(COMPARABLE, name, &[OBJECT])
            }
            ("compare", 2) if receiver_is(COMPARATOR) => {
                MethodSignature::new(COMPARATOR, name, &[OBJECT, OBJECT])
            }
            _ => return Fact::Unknown,
        };
        Fact::Known(signature)
    }
}

fn parse_integer(raw: &str) -> Option<f64> {
    let digits: String = raw
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(value as f64)
}

fn parse_floating(raw: &str) -> Option<f64> {
    raw.trim_end_matches(['f', 'F', 'd', 'D'])
        .replace('_', "")
        .parse::<f64>()
        .ok()
}

fn fold_infix(operator: InfixOperator, left: Constant, right: Constant) -> Constant {
    use InfixOperator::*;
    match (operator, left, right) {
        (ConditionalAnd, l, r) => match (l.as_bool(), r.as_bool()) {
            (Some(l), Some(r)) => Constant::from_bool(l && r),
            _ => Constant::None,
        },
        (ConditionalOr, l, r) => match (l.as_bool(), r.as_bool()) {
            (Some(l), Some(r)) => Constant::from_bool(l || r),
            _ => Constant::None,
        },
        (Equals | NotEquals, l, r) => {
            let equal = match (&l, &r) {
                (Constant::Numeric(a), Constant::Numeric(b)) => Some(a == b),
                (Constant::Null, Constant::Null) => Some(true),
                _ => match (l.as_bool(), r.as_bool()) {
                    (Some(a), Some(b)) => Some(a == b),
                    _ => None,
                },
            };
            match equal {
                Some(equal) => Constant::from_bool(equal == (operator == Equals)),
                None => Constant::None,
            }
        }
        (Plus, Constant::Text(a), Constant::Text(b)) => Constant::Text(a + &b),
        (op, Constant::Numeric(a), Constant::Numeric(b)) => match op {
            Less => Constant::from_bool(a < b),
            Greater => Constant::from_bool(a > b),
            LessEquals => Constant::from_bool(a <= b),
            GreaterEquals => Constant::from_bool(a >= b),
            Plus => Constant::Numeric(a + b),
            Minus => Constant::Numeric(a - b),
            Times => Constant::Numeric(a * b),
            Divide if b != 0.0 => Constant::Numeric(a / b),
            Remainder if b != 0.0 => Constant::Numeric(a % b),
            _ => Constant::None,
        },
        _ => Constant::None,
    }
}

impl Resolver for SyntacticResolver<'_> {
    fn resolve_constant(&self, expression: NodeRef<'_>) -> Constant {
        match expression.kind() {
            NodeKind::Literal(literal) => match literal.kind {
                LiteralKind::Boolean => literal
                    .as_boolean()
                    .map(Constant::from_bool)
                    .unwrap_or(Constant::None),
                LiteralKind::Null => Constant::Null,
                LiteralKind::Integer => parse_integer(&literal.raw)
                    .map(Constant::Numeric)
                    .unwrap_or(Constant::None),
                LiteralKind::Floating => parse_floating(&literal.raw)
                    .map(Constant::Numeric)
                    .unwrap_or(Constant::None),
                LiteralKind::String => {
                    let raw = literal.raw.as_str();
                    Constant::Text(raw[1..raw.len().saturating_sub(1).max(1)].to_string())
                }
                LiteralKind::Char => Constant::None,
            },
            NodeKind::Parenthesized { expression: inner } => {
                self.resolve_constant(expression.at(*inner))
            }
            NodeKind::Prefix { operator, operand } => {
                let value = self.resolve_constant(expression.at(*operand));
                match (operator, value) {
                    (PrefixOperator::Not, value) => value
                        .as_bool()
                        .map(|b| Constant::from_bool(!b))
                        .unwrap_or(Constant::None),
                    (PrefixOperator::Minus, Constant::Numeric(n)) => Constant::Numeric(-n),
                    (PrefixOperator::Plus, Constant::Numeric(n)) => Constant::Numeric(n),
                    _ => Constant::None,
                }
            }
            NodeKind::Infix {
                operator,
                left,
                right,
            } => fold_infix(
                *operator,
                self.resolve_constant(expression.at(*left)),
                self.resolve_constant(expression.at(*right)),
            ),
            _ => Constant::None,
        }
    }

    fn static_type_of(&self, expression: NodeRef<'_>) -> Fact<TypeDescriptor> {
        let boolean = || Fact::Known(TypeDescriptor::primitive("boolean"));
        match expression.kind() {
            NodeKind::Literal(literal) => match literal.kind {
                LiteralKind::Boolean => boolean(),
                LiteralKind::Null => Fact::Unknown,
                LiteralKind::Integer if literal.raw.ends_with(['l', 'L']) => {
                    Fact::Known(TypeDescriptor::primitive("long"))
                }
                LiteralKind::Integer => Fact::Known(TypeDescriptor::primitive("int")),
                LiteralKind::Floating if literal.raw.ends_with(['f', 'F']) => {
                    Fact::Known(TypeDescriptor::primitive("float"))
                }
                LiteralKind::Floating => Fact::Known(TypeDescriptor::primitive("double")),
                LiteralKind::Char => Fact::Known(TypeDescriptor::primitive("char")),
                LiteralKind::String => Fact::Known(self.describe("String")),
            },
            NodeKind::Name(name) => self.declared_type(name).map(|ty| self.describe(ty)).into(),
            NodeKind::Parenthesized { expression: inner } => {
                self.static_type_of(expression.at(*inner))
            }
            NodeKind::Infix {
                operator,
                left,
                right,
            } => {
                use InfixOperator::*;
                let (left, right) = (expression.at(*left), expression.at(*right));
                match operator {
                    ConditionalOr | ConditionalAnd | Equals | NotEquals | Less | Greater
                    | LessEquals | GreaterEquals => boolean(),
                    Plus if self.is_string(left) || self.is_string(right) => {
                        Fact::Known(self.describe("String"))
                    }
                    BitAnd | BitOr | BitXor
                        if matches!(self.static_type_of(left), Fact::Known(t) if t.is_boolean()) =>
                    {
                        boolean()
                    }
                    LeftShift | RightShift | UnsignedRightShift => self.promoted(left, left),
                    _ => self.promoted(left, right),
                }
            }
            NodeKind::Prefix { operator, operand } => match operator {
                PrefixOperator::Not => boolean(),
                _ => self.static_type_of(expression.at(*operand)),
            },
            NodeKind::Postfix { operand, .. } => self.static_type_of(expression.at(*operand)),
            NodeKind::InstanceOf { .. } => boolean(),
            NodeKind::Cast { ty, .. } | NodeKind::New { ty, .. } => Fact::Known(self.describe(ty)),
            NodeKind::Assignment { target, .. } => self.static_type_of(expression.at(*target)),
            NodeKind::Conditional {
                then_value,
                else_value,
                ..
            } => {
                let then_type = self.static_type_of(expression.at(*then_value));
                if then_type == self.static_type_of(expression.at(*else_value)) {
                    then_type
                } else {
                    Fact::Unknown
                }
            }
            NodeKind::MethodCall { name, .. } => match name.as_str() {
                "equals" | "equalsIgnoreCase" | "isEmpty" | "contains" | "startsWith"
                | "endsWith" => boolean(),
                "compareTo" | "compare" | "compareToIgnoreCase" | "hashCode" | "length"
                | "size" => Fact::Known(TypeDescriptor::primitive("int")),
                "toString" => Fact::Known(self.describe("String")),
                _ => Fact::Unknown,
            },
            _ => Fact::Unknown,
        }
    }

    fn method_signature_of(&self, call: NodeRef<'_>) -> Fact<MethodSignature> {
        let NodeKind::MethodCall {
            receiver,
            name,
            arguments,
        } = call.kind()
        else {
            return Fact::Unknown;
        };
        let arguments: Vec<_> = arguments.iter().map(|a| call.at(*a)).collect();
        match receiver {
            None if self.is_statically_imported(TESTNG_ASSERT, name) => {
                self.testng_signature(name, &arguments)
            }
            None => Fact::Unknown,
            Some(receiver) => {
                let receiver = call.at(*receiver);
                if self.names_class(receiver, TESTNG_ASSERT) {
                    self.testng_signature(name, &arguments)
                } else {
                    self.receiver_signature(receiver, name, arguments.len())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeId, SyntaxKind};
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

    fn initializer(tree: &SyntaxTree, name: &str) -> NodeId {
        all(tree, SyntaxKind::LocalVariable)
            .into_iter()
            .find_map(|id| match tree.kind(id) {
                NodeKind::LocalVariable {
                    name: n,
                    initializer: Some(init),
                    ..
                } if n == name => Some(*init),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_constant_folding() {
        let tree = parse(
            "boolean a = !(1 + 2 * 3 == 7); int b = -(10 / 4); boolean c = true && x; String d = \"ab\" + \"cd\";",
        );
        let resolver = SyntacticResolver::new(&tree);
        assert_eq!(
            resolver.resolve_constant(tree.node(initializer(&tree, "a"))),
            Constant::False
        );
        assert_eq!(
            resolver.resolve_constant(tree.node(initializer(&tree, "b"))),
            Constant::Numeric(-2.5)
        );
        assert_eq!(
            resolver.resolve_constant(tree.node(initializer(&tree, "c"))),
            Constant::None
        );
        assert_eq!(
            resolver.resolve_constant(tree.node(initializer(&tree, "d"))),
            Constant::Text("abcd".into())
        );
    }

    #[test]
    fn test_integer_literal_forms() {
        assert_eq!(parse_integer("0x1F"), Some(31.0));
        assert_eq!(parse_integer("017"), Some(15.0));
        assert_eq!(parse_integer("1_000L"), Some(1000.0));
        assert_eq!(parse_integer("0"), Some(0.0));
    }

    #[test]
    fn test_declared_types_and_conflicts() {
        let tree = parse("Integer x = 1; String s = \"\"; int v = 0; double v = 1.0; Object o = x + v;");
        let resolver = SyntacticResolver::new(&tree);
        let x = tree.node(initializer(&tree, "o"));
        let NodeKind::Infix { left, right, .. } = x.kind() else {
            unreachable!()
        };
        let x_type = resolver.static_type_of(x.at(*left)).into_known().unwrap();
        assert_eq!(x_type.qualified_name, "java.lang.Integer");
        assert!(x_type.is_subtype_of(COMPARABLE));
        assert_eq!(resolver.static_type_of(x.at(*right)), Fact::Unknown);
        assert!(!resolver.is_primitive(x.at(*left)));
    }

    #[test]
    fn test_bindings_override_document() {
        let tree = parse("a.compareTo(b);");
        let call = tree.node(all(&tree, SyntaxKind::MethodCall)[0]);
        let plain = SyntacticResolver::new(&tree);
        assert_eq!(plain.method_signature_of(call), Fact::Unknown);
        let bound = SyntacticResolver::new(&tree).with_binding("a", "java.math.BigDecimal");
        let signature = bound.method_signature_of(call).into_known().unwrap();
        assert!(signature.is(COMPARABLE, "compareTo"));
    }

    #[test]
    fn test_equals_falls_back_to_object() {
        let tree = parse("a.equals(b); \"k\".equals(b);");
        let calls = all(&tree, SyntaxKind::MethodCall);
        let resolver = SyntacticResolver::new(&tree);
        let first = resolver.method_signature_of(tree.node(calls[0])).into_known().unwrap();
        assert_eq!(first.owner, OBJECT);
        let second = resolver.method_signature_of(tree.node(calls[1])).into_known().unwrap();
        assert_eq!(second.owner, STRING);
    }

    #[test]
    fn test_testng_calls_need_an_import() {
        let source = "assertTrue(ok); Assert.assertTrue(ok, \"m\"); org.testng.Assert.fail();";
        let tree = parse(source);
        let calls = all(&tree, SyntaxKind::MethodCall);
        let resolver = SyntacticResolver::new(&tree);
        assert!(calls
            .iter()
            .take(2)
            .all(|c| resolver.method_signature_of(tree.node(*c)) == Fact::Unknown));
        let fail = resolver.method_signature_of(tree.node(calls[2])).into_known().unwrap();
        assert!(fail.is(TESTNG_ASSERT, "fail"));

        let imported = format!("import org.testng.Assert;\nimport static org.testng.Assert.assertTrue;\n{source}");
        let tree = parse(&imported);
        let calls = all(&tree, SyntaxKind::MethodCall);
        let resolver = SyntacticResolver::new(&tree);
        let bare = resolver.method_signature_of(tree.node(calls[0])).into_known().unwrap();
        assert_eq!(bare.param_types, vec!["boolean".to_string()]);
        let qualified = resolver.method_signature_of(tree.node(calls[1])).into_known().unwrap();
        assert_eq!(qualified.arity(), 2);
    }

    #[test]
    fn test_assert_equals_message_overload_needs_string() {
        let tree = parse("double d = 0.1; assertEquals(a, b, \"msg\"); assertEquals(1.0, 2.0, d); assertEquals(a, b, c);");
        let calls = all(&tree, SyntaxKind::MethodCall);
        let resolver = SyntacticResolver::new(&tree).with_static_import(TESTNG_ASSERT);
        let message = resolver.method_signature_of(tree.node(calls[0])).into_known().unwrap();
        assert_eq!(message.param_types[2], STRING);
        let delta = resolver.method_signature_of(tree.node(calls[1])).into_known().unwrap();
        assert_eq!(delta.param_types, vec!["double", "double", "double"]);
        assert_eq!(resolver.method_signature_of(tree.node(calls[2])), Fact::Unknown);
    }
}
